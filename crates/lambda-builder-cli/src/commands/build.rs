use lambda_builder_build::ProcfileOutcome;
use lambda_builder_core::{BuildOptions, Config};
use lambda_builder_docker::DockerClient;
use std::path::PathBuf;

use super::build_pipeline;

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Application directory
    #[arg(long, short = 'w', default_value = ".")]
    working_directory: PathBuf,
    /// Unique build identifier (defaults to a random UUID)
    #[arg(long)]
    identifier: Option<String>,
    /// Builder to use instead of detecting one
    #[arg(long)]
    builder: Option<String>,
    /// Image used to run the build script
    #[arg(long)]
    build_image: Option<String>,
    /// Base image for the generated runtime image
    #[arg(long)]
    run_image: Option<String>,
    /// Build a runtime image from the build output
    #[arg(long)]
    generate_image: bool,
    /// Handler to use instead of detecting one
    #[arg(long)]
    handler: Option<String>,
    /// Extra handler convention in FILE=HANDLER format (repeatable)
    #[arg(long = "handler-map", value_parser = parse_key_value)]
    handler_map: Vec<(String, String)>,
    /// Build-time environment variable in KEY=VALUE format (repeatable)
    #[arg(long = "build-env")]
    build_env: Vec<String>,
    /// Runtime image environment variable in KEY=VALUE format (repeatable)
    #[arg(long = "image-env")]
    image_env: Vec<String>,
    /// Label for the runtime image (repeatable)
    #[arg(long = "label")]
    labels: Vec<String>,
    /// Tag for the runtime image (default: lambda-builder/<dir>:latest)
    #[arg(long, short = 't')]
    tag: Option<String>,
    /// Port exposed by the runtime image
    #[arg(long)]
    port: Option<u16>,
    /// Suppress build container and image build output
    #[arg(long, short = 'q')]
    quiet: bool,
    /// Write a Procfile from the detected handler
    #[arg(long)]
    write_procfile: bool,
}

impl From<BuildArgs> for BuildOptions {
    fn from(args: BuildArgs) -> Self {
        Self {
            working_directory: args.working_directory,
            identifier: args.identifier,
            builder: args.builder,
            build_image: args.build_image,
            run_image: args.run_image,
            generate_run_image: args.generate_image,
            handler: args.handler,
            handler_map: args.handler_map,
            build_env: args.build_env,
            image_env: args.image_env,
            image_labels: args.labels,
            image_tag: args.tag,
            port: args.port,
            quiet: args.quiet,
            write_procfile: args.write_procfile,
        }
    }
}

/// Execute the full build pipeline.
pub async fn build(args: BuildArgs) -> anyhow::Result<()> {
    let config = Config::resolve(args.into())?;
    let client = DockerClient::new();

    let outcome = build_pipeline::run(&client, &config).await?;

    println!();
    println!(
        "Built {} with the {} builder",
        config.working_directory.display(),
        outcome.builder
    );
    if outcome.handler.is_empty() {
        println!("Handler: (not detected)");
    } else {
        println!("Handler: {}", outcome.handler);
    }
    if let ProcfileOutcome::Written(paths) = &outcome.procfile {
        println!("Procfile: {} written", paths.len());
    }
    if let Some(tag) = &outcome.image_tag {
        println!("Image: {tag}");
    }

    Ok(())
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected FILE=HANDLER, got {s:?}")),
    }
}
