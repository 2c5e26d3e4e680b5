use std::io::Write;

use lambda_builder_core::Config;
use tempfile::NamedTempFile;

/// Directory the build output is copied into inside the runtime image.
pub const TASK_DIR: &str = "/var/task";

/// Generates the runtime image Dockerfile for an extracted build.
pub struct DockerfileGenerator<'a> {
    handler: &'a str,
    config: &'a Config,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(handler: &'a str, config: &'a Config) -> Self {
        Self { handler, config }
    }

    pub fn render(&self) -> String {
        let mut out = format!("FROM {}\n", self.config.run_image);

        if let Some(port) = self.config.port {
            out.push_str(&format!("ENV DOCKER_LAMBDA_API_PORT={port}\n"));
            out.push_str(&format!("ENV DOCKER_LAMBDA_RUNTIME_PORT={port}\n"));
        }

        for env in &self.config.image_env {
            out.push_str(&format!("ENV {env}\n"));
        }

        if !self.handler.is_empty() {
            // JSON exec form; serde_json escapes quotes and backslashes.
            let cmd = serde_json::Value::from(vec![self.handler]);
            out.push_str(&format!("CMD {cmd}\n"));
        }

        out.push_str(&format!("COPY . {TASK_DIR}\n"));
        out
    }
}

/// Write a rendered Dockerfile to a temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp(content: &str) -> Result<NamedTempFile, DockerfileError> {
    let mut file = tempfile::Builder::new()
        .prefix("lambda-builder")
        .suffix(".Dockerfile")
        .tempfile()
        .map_err(|e| DockerfileError::Create { source: e })?;

    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| DockerfileError::Write {
            path: file.path().to_path_buf(),
            source: e,
        })?;

    tracing::debug!(path = %file.path().display(), "temporary Dockerfile written");
    Ok(file)
}

#[derive(Debug, thiserror::Error)]
pub enum DockerfileError {
    #[error("failed to create temporary Dockerfile")]
    Create { source: std::io::Error },

    #[error("failed to write temporary Dockerfile at {path}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
