use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lambda_builder_core::{Builder, Config};
use lambda_builder_docker::client::{
    BuildContainerError, DockerClient, ImageBuildError, build_container_args, image_build_args,
};
use lambda_builder_docker::docker::DockerError;
use lambda_builder_docker::executor::{DockerExecutor, ExecOutput};
use mockall::mock;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec_streaming(&self, args: &[String], cwd: &Path) -> Result<ExecOutput, DockerError>;
        async fn exec_captured(&self, args: &[String], cwd: &Path) -> Result<ExecOutput, DockerError>;
    }
}

fn config() -> Config {
    Config {
        working_directory: PathBuf::from("/srv/apps/hello"),
        identifier: "abc123".to_owned(),
        builder: Builder::Go,
        build_image: "lambci/lambda:build-go1.x".to_owned(),
        run_image: "lambci/lambda:go1.x".to_owned(),
        generate_run_image: false,
        handler: None,
        handler_map: BTreeMap::new(),
        build_env: Vec::new(),
        image_env: Vec::new(),
        image_labels: Vec::new(),
        image_tag: None,
        port: None,
        quiet: false,
        write_procfile: false,
    }
}

fn exited(code: i32) -> Result<ExecOutput, DockerError> {
    Ok(ExecOutput {
        exit_code: code,
        output: String::new(),
    })
}

// ── Argument construction ──

#[test]
fn build_container_args_exact() {
    let config = Config {
        build_env: vec!["GOFLAGS=-mod=vendor".to_owned(), "CGO_ENABLED=0".to_owned()],
        ..config()
    };
    let args = build_container_args("echo hi", &config).unwrap();

    assert_eq!(
        args,
        vec![
            "container",
            "run",
            "--rm",
            "--env",
            "LAMBDA_BUILD_ZIP=1",
            "--label",
            "com.dokku.lambda-builder/executor=true",
            "--name",
            "lambda-builder-executor-abc123",
            "--volume",
            "/srv/apps/hello:/tmp/task",
            "--env",
            "GOFLAGS=-mod=vendor",
            "--env",
            "CGO_ENABLED=0",
            "lambci/lambda:build-go1.x",
            "/bin/bash",
            "-c",
            "echo hi",
        ]
    );
}

#[test]
fn image_build_args_exact() {
    let config = Config {
        image_labels: vec!["com.example/app=hello".to_owned(), "team=infra".to_owned()],
        ..config()
    };
    let args = image_build_args(
        Path::new("/tmp/lambda-builder-ctx"),
        Path::new("/tmp/lambda-builder.Dockerfile"),
        &config,
    )
    .unwrap();

    assert_eq!(
        args,
        vec![
            "image",
            "build",
            "--file",
            "/tmp/lambda-builder.Dockerfile",
            "--progress",
            "plain",
            "--tag",
            "lambda-builder/hello:latest",
            "--label",
            "com.example/app=hello",
            "--label",
            "team=infra",
            "/tmp/lambda-builder-ctx",
        ]
    );
}

#[test]
fn image_build_args_use_explicit_tag() {
    let config = Config {
        image_tag: Some("registry.local/hello:v2".to_owned()),
        ..config()
    };
    let args = image_build_args(Path::new("/ctx"), Path::new("/Dockerfile"), &config).unwrap();
    assert!(args.windows(2).any(|w| w == ["--tag", "registry.local/hello:v2"]));
}

// ── Build container ──

#[tokio::test]
async fn build_container_streams_by_default() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|args, cwd| {
            args.first().map(String::as_str) == Some("container")
                && cwd == Path::new("/srv/apps/hello")
        })
        .times(1)
        .returning(|_, _| exited(0));
    mock.expect_exec_captured().never();

    let client = DockerClient::with_executor(mock);
    client
        .run_build_container("make", &config())
        .await
        .unwrap();
}

#[tokio::test]
async fn build_container_quiet_captures_output() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().never();
    mock.expect_exec_captured()
        .times(1)
        .returning(|_, _| exited(0));

    let config = Config {
        quiet: true,
        ..config()
    };
    let client = DockerClient::with_executor(mock);
    client.run_build_container("make", &config).await.unwrap();
}

#[tokio::test]
async fn build_container_nonzero_exit_carries_code() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_captured().returning(|_, _| {
        Ok(ExecOutput {
            exit_code: 137,
            output: "go: module not found\n".to_owned(),
        })
    });

    let config = Config {
        quiet: true,
        ..config()
    };
    let client = DockerClient::with_executor(mock);
    let err = client
        .run_build_container("make", &config)
        .await
        .unwrap_err();

    match &err {
        BuildContainerError::Failed { exit_code, output } => {
            assert_eq!(*exit_code, 137);
            assert!(output.contains("module not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("137"), "got: {message}");
    assert!(message.contains("go: module not found"), "got: {message}");
}

#[tokio::test]
async fn build_container_launch_failure() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|_, _| {
        Err(DockerError::NotFound {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let client = DockerClient::with_executor(mock);
    let err = client
        .run_build_container("make", &config())
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            BuildContainerError::Launch {
                source: DockerError::NotFound { .. }
            }
        ),
        "got: {err:?}"
    );
}

// ── Image build ──

#[tokio::test]
async fn image_build_success() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|args, _| args.starts_with(&["image".to_owned(), "build".to_owned()]))
        .times(1)
        .returning(|_, _| exited(0));

    let client = DockerClient::with_executor(mock);
    client
        .build_image(Path::new("/ctx"), Path::new("/Dockerfile"), &config())
        .await
        .unwrap();
}

#[tokio::test]
async fn image_build_nonzero_exit() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|_, _| exited(1));

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_image(Path::new("/ctx"), Path::new("/Dockerfile"), &config())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ImageBuildError::Failed { exit_code: 1, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn image_build_launch_failure() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|args, _| {
        Err(DockerError::Launch {
            command: args[..2].join(" "),
            source: std::io::Error::other("permission denied"),
        })
    });

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_image(Path::new("/ctx"), Path::new("/Dockerfile"), &config())
        .await
        .unwrap_err();

    assert!(matches!(err, ImageBuildError::Launch { .. }), "got: {err:?}");
}
