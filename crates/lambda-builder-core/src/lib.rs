//! Core types and configuration for lambda-builder.
//!
//! This crate defines the language builders ([`Builder`]), marker-file
//! detection ([`detect()`]), configuration resolution from invocation
//! options and `lambda.yml` ([`Config`]), handler resolution, and shared
//! error types.

pub mod builder;
pub mod config;
pub mod detect;
pub mod error;
pub mod handler;

pub use builder::Builder;
pub use config::{BuildOptions, Config, PROJECT_OVERRIDE_FILE, ProjectOverride};
pub use detect::detect;
pub use error::{Error, Result};
pub use handler::resolve_handler;
