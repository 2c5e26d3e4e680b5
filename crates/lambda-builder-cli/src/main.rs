mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lambda-builder",
    about = "Build serverless functions in Docker and package them as runtime images"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the application in the working directory
    Build(commands::BuildArgs),
    /// Show which builder and images would be used
    Detect {
        /// Application directory
        #[arg(long, short = 'w', default_value = ".")]
        working_directory: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => commands::build(args).await?,
        Commands::Detect { working_directory } => commands::detect(&working_directory)?,
    }

    Ok(())
}
