use std::path::{Path, PathBuf};

use lambda_builder_core::Config;

use crate::docker::{DockerError, subcommand};
use crate::executor::{DockerExecutor, ExecOutput, RealExecutor};

/// Mount point of the working directory inside the build container.
pub const CONTAINER_TASK_DIR: &str = "/tmp/task";

/// Label attached to every build container, for discovery and cleanup.
pub const EXECUTOR_LABEL: &str = "com.dokku.lambda-builder/executor=true";

/// Environment assignment telling build scripts to produce `lambda.zip`.
pub const BUILD_ZIP_ENV: &str = "LAMBDA_BUILD_ZIP=1";

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Build container ──

    /// Run `script` in a disposable build container with the working
    /// directory mounted at `/tmp/task`.
    ///
    /// No retry is attempted: build scripts may have side effects.
    pub async fn run_build_container(
        &self,
        script: &str,
        config: &Config,
    ) -> Result<(), BuildContainerError> {
        let args = build_container_args(script, config)
            .map_err(BuildContainerError::InvalidPath)?;

        tracing::info!(
            image = %config.build_image,
            container = %container_name(&config.identifier),
            "running build container"
        );

        let result = self
            .exec(&args, &config.working_directory, config.quiet)
            .await
            .map_err(|e| BuildContainerError::Launch { source: e })?;

        if result.success() {
            Ok(())
        } else {
            Err(BuildContainerError::Failed {
                exit_code: result.exit_code,
                output: result.output,
            })
        }
    }

    // ── Image build ──

    /// Build the runtime image from `context_dir` with the given Dockerfile,
    /// tagged [`Config::image_tag`] and labelled with `config.image_labels`.
    pub async fn build_image(
        &self,
        context_dir: &Path,
        dockerfile: &Path,
        config: &Config,
    ) -> Result<(), ImageBuildError> {
        let args = image_build_args(context_dir, dockerfile, config)
            .map_err(ImageBuildError::InvalidPath)?;

        tracing::info!(tag = %config.image_tag(), "building image");

        let result = self
            .exec(&args, &config.working_directory, config.quiet)
            .await
            .map_err(|e| ImageBuildError::Launch { source: e })?;

        if result.success() {
            Ok(())
        } else {
            Err(ImageBuildError::Failed {
                exit_code: result.exit_code,
                output: result.output,
            })
        }
    }

    async fn exec(
        &self,
        args: &[String],
        cwd: &Path,
        quiet: bool,
    ) -> Result<ExecOutput, DockerError> {
        tracing::debug!(command = %subcommand(args), quiet, "executing docker");
        if quiet {
            self.executor.exec_captured(args, cwd).await
        } else {
            self.executor.exec_streaming(args, cwd).await
        }
    }
}

/// Name of the build container for a build identifier.
pub fn container_name(identifier: &str) -> String {
    format!("lambda-builder-executor-{identifier}")
}

/// Arguments for `docker container run` executing a build script.
///
/// Fails with the offending path if the working directory is not valid UTF-8.
pub fn build_container_args(script: &str, config: &Config) -> Result<Vec<String>, PathBuf> {
    let working_dir = path_str(&config.working_directory)?;

    let mut argv = args([
        "container",
        "run",
        "--rm",
        "--env",
        BUILD_ZIP_ENV,
        "--label",
        EXECUTOR_LABEL,
        "--name",
        &container_name(&config.identifier),
        "--volume",
        &format!("{working_dir}:{CONTAINER_TASK_DIR}"),
    ]);

    for env in &config.build_env {
        argv.push("--env".to_owned());
        argv.push(env.clone());
    }

    argv.extend(args([config.build_image.as_str(), "/bin/bash", "-c", script]));
    Ok(argv)
}

/// Arguments for `docker image build` of the runtime image.
///
/// Fails with the offending path if either path is not valid UTF-8.
pub fn image_build_args(
    context_dir: &Path,
    dockerfile: &Path,
    config: &Config,
) -> Result<Vec<String>, PathBuf> {
    let dockerfile = path_str(dockerfile)?;
    let context_dir = path_str(context_dir)?;

    let mut argv = args([
        "image",
        "build",
        "--file",
        dockerfile,
        "--progress",
        "plain",
        "--tag",
        &config.image_tag(),
    ]);

    for label in &config.image_labels {
        argv.push("--label".to_owned());
        argv.push(label.clone());
    }

    argv.push(context_dir.to_owned());
    Ok(argv)
}

fn path_str(path: &Path) -> Result<&str, PathBuf> {
    path.to_str().ok_or_else(|| path.to_path_buf())
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum BuildContainerError {
    #[error("working directory path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("failed to launch build container")]
    Launch { source: DockerError },

    #[error("build container exited with code {exit_code}{}", format_output(output))]
    Failed { exit_code: i32, output: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageBuildError {
    #[error("image build path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("failed to launch image build")]
    Launch { source: DockerError },

    #[error("image build exited with code {exit_code}{}", format_output(output))]
    Failed { exit_code: i32, output: String },
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}
