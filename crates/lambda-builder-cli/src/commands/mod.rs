mod build;
mod build_pipeline;
mod detect;

pub use build::{BuildArgs, build};
pub use detect::detect;
