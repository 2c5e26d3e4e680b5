use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid working directory {path}: {reason}")]
    WorkingDirectory { path: PathBuf, reason: &'static str },

    #[error("failed to read working directory {path}")]
    WorkingDirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Builder selection ──
    #[error("unknown builder '{name}'; available builders: {}", known.join(", "))]
    UnknownBuilder { name: String, known: Vec<String> },

    #[error(
        "no builder detected in {dir} — add a manifest (go.mod, package.json, requirements.txt, ...) \
         or set `builder` in lambda.yml"
    )]
    NoBuilderDetected { dir: PathBuf },
}
