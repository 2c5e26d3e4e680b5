use lambda_builder_build::dockerfile::{self, DockerfileError, DockerfileGenerator};
use lambda_builder_build::extract::{self, BuildContext, ExtractError};
use lambda_builder_build::procfile::{self, ProcfileError, ProcfileOutcome};
use lambda_builder_core::{Builder, Config, resolve_handler};
use lambda_builder_docker::{BuildContainerError, DockerClient, DockerExecutor, ImageBuildError};

/// Result of a successful build pipeline run.
#[derive(Debug)]
pub(crate) struct BuildOutcome {
    pub builder: Builder,
    /// Resolved handler; empty when none was found
    pub handler: String,
    pub procfile: ProcfileOutcome,
    /// Tag of the runtime image, when one was built
    pub image_tag: Option<String>,
}

/// The stage a build failed in, wrapping its cause.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    #[error("build stage failed")]
    Build(#[from] BuildContainerError),

    #[error("extraction stage failed")]
    Extract(#[from] ExtractError),

    #[error("Procfile stage failed")]
    Procfile(#[from] ProcfileError),

    #[error("Dockerfile stage failed")]
    Dockerfile(#[from] DockerfileError),

    #[error("image build stage failed")]
    Image(#[from] ImageBuildError),
}

/// Run the build pipeline: build container → extract → handler → Procfile → image.
///
/// The scratch build context and temporary Dockerfile are dropped before
/// this returns, whether it succeeds or fails.
pub(crate) async fn run<E: DockerExecutor>(
    client: &DockerClient<E>,
    config: &Config,
) -> Result<BuildOutcome, PipelineError> {
    let builder = config.builder;
    println!("=====> Building app with {builder} builder");
    println!("       Build image: {}", config.build_image);

    // Only an archive produced by this run may be extracted.
    extract::clear_archive(&config.working_directory)?;

    client
        .run_build_container(builder.build_script(), config)
        .await?;

    println!("-----> Extracting lambda.zip into build context dir");
    let context = BuildContext::extract(&config.working_directory)?;

    let handler = resolve_handler(context.path(), builder, config);

    let targets = [config.working_directory.as_path(), context.path()];
    let procfile = procfile::write_if_needed(&handler, &targets, config)?;
    match &procfile {
        ProcfileOutcome::Written(paths) => {
            println!("=====> Writing Procfile from handler: {handler}");
            for path in paths {
                println!("       Wrote {}", path.display());
            }
        }
        ProcfileOutcome::NoHandler => {
            println!(" !     Unable to detect handler in build directory");
        }
        ProcfileOutcome::Disabled | ProcfileOutcome::AlreadyExists => {}
    }

    let image_tag = if config.generate_run_image {
        let tag = config.image_tag();
        println!("=====> Building image");
        println!("       Generating temporary Dockerfile");
        let content = DockerfileGenerator::new(&handler, config).render();
        let dockerfile = dockerfile::write_temp(&content)?;

        println!("       Executing build of {tag}");
        client
            .build_image(context.path(), dockerfile.path(), config)
            .await?;
        Some(tag)
    } else {
        None
    };

    tracing::info!(builder = %builder, handler = %handler, "build complete");

    Ok(BuildOutcome {
        builder,
        handler,
        procfile,
        image_tag,
    })
}
