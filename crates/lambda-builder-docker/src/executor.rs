use std::path::Path;
use std::process::{ExitStatus, Stdio};

use crate::docker::{DockerError, subcommand};

/// Exit code and (when captured) output of a docker invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Process exit code; `-1` when terminated by a signal
    pub exit_code: i32,
    /// Combined stdout and stderr; empty when output was streamed
    pub output: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over docker CLI execution for testability.
///
/// A non-zero exit is reported through [`ExecOutput::exit_code`], not as an
/// error; errors mean the process could not be run at all.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a docker command, streaming output to the terminal.
    async fn exec_streaming(&self, args: &[String], cwd: &Path)
    -> Result<ExecOutput, DockerError>;

    /// Execute a docker command and capture its output.
    async fn exec_captured(&self, args: &[String], cwd: &Path) -> Result<ExecOutput, DockerError>;
}

/// Real docker CLI executor.
pub struct RealExecutor;

impl DockerExecutor for RealExecutor {
    async fn exec_streaming(
        &self,
        args: &[String],
        cwd: &Path,
    ) -> Result<ExecOutput, DockerError> {
        let status = tokio::process::Command::new("docker")
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| launch_error(args, e))?;

        Ok(ExecOutput {
            exit_code: exit_code(status),
            output: String::new(),
        })
    }

    async fn exec_captured(&self, args: &[String], cwd: &Path) -> Result<ExecOutput, DockerError> {
        let output = tokio::process::Command::new("docker")
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| launch_error(args, e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ExecOutput {
            exit_code: exit_code(output.status),
            output: combined,
        })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn launch_error(args: &[String], source: std::io::Error) -> DockerError {
    match source.kind() {
        std::io::ErrorKind::NotFound => DockerError::NotFound { source },
        _ => DockerError::Launch {
            command: subcommand(args),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_error_omits_build_env_values() {
        let args: Vec<String> = [
            "container",
            "run",
            "--env",
            "API_TOKEN=s3cr3t",
            "image",
            "/bin/bash",
            "-c",
            "make",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        let err = launch_error(&args, std::io::Error::other("permission denied"));
        let message = err.to_string();
        assert_eq!(message, "failed to launch docker container run");
        assert!(!format!("{err:?}").contains("s3cr3t"));
    }

    #[test]
    fn missing_binary_is_not_found() {
        let err = launch_error(&[], std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, DockerError::NotFound { .. }));
    }
}
