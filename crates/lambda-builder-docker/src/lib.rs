pub mod client;
pub mod docker;
pub mod executor;

pub use client::{BuildContainerError, DockerClient, ImageBuildError};
pub use docker::DockerError;
pub use executor::{DockerExecutor, ExecOutput, RealExecutor};
