#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found — install: https://docs.docker.com/get-docker/")]
    NotFound { source: std::io::Error },

    /// `command` holds the docker subcommand only; build env values stay out.
    #[error("failed to launch docker {command}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
}

/// The docker subcommand of an argument list, e.g. `container run`.
pub(crate) fn subcommand(args: &[String]) -> String {
    args.iter()
        .take(2)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
