//! Local build artifacts for lambda-builder.
//!
//! # Pipeline stages covered here
//!
//! ```text
//! lambda-builder build
//!   1. Detect + config   ── lambda-builder-core
//!   2. Build container   ── lambda-builder-docker
//!   3. Extract           ── BuildContext::extract() → scratch dir
//!   4. Handler           ── lambda-builder-core
//!   5. Procfile          ── procfile::write_if_needed() (working dir + scratch dir)
//!   6. Dockerfile        ── DockerfileGenerator::render() → temp file
//!   7. Image build       ── lambda-builder-docker
//! ```
//!
//! Scratch directories and temporary Dockerfiles are RAII handles from
//! `tempfile`; dropping them removes the files, so early returns never
//! leave them behind.

pub mod dockerfile;
pub mod extract;
pub mod procfile;

pub use dockerfile::DockerfileGenerator;
pub use extract::BuildContext;
pub use procfile::ProcfileOutcome;
