use std::path::{Path, PathBuf};

use lambda_builder_core::Config;

pub const PROCFILE: &str = "Procfile";

/// What [`write_if_needed`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcfileOutcome {
    /// Procfile writing is not enabled
    Disabled,
    /// The working directory already has a Procfile
    AlreadyExists,
    /// No handler was resolved
    NoHandler,
    /// Written to these paths, in target order
    Written(Vec<PathBuf>),
}

/// The Procfile line for a handler.
pub fn render(handler: &str) -> String {
    format!("web: {handler}\n")
}

/// Write `web: <handler>` to every target directory.
///
/// Nothing is written unless `config.write_procfile` is set, the working
/// directory has no Procfile, and `handler` is non-empty. Targets that
/// already hold a Procfile are left untouched. A failed write leaves earlier
/// targets in place.
pub fn write_if_needed(
    handler: &str,
    targets: &[&Path],
    config: &Config,
) -> Result<ProcfileOutcome, ProcfileError> {
    if !config.write_procfile {
        return Ok(ProcfileOutcome::Disabled);
    }
    if config.working_directory.join(PROCFILE).exists() {
        return Ok(ProcfileOutcome::AlreadyExists);
    }
    if handler.is_empty() {
        return Ok(ProcfileOutcome::NoHandler);
    }

    let content = render(handler);
    let mut written = Vec::with_capacity(targets.len());
    for target in targets {
        let path = target.join(PROCFILE);
        if path.exists() {
            tracing::debug!(path = %path.display(), "Procfile already present; skipping");
            continue;
        }

        std::fs::write(&path, &content).map_err(|e| ProcfileError::Write {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), handler, "Procfile written");
        written.push(path);
    }

    Ok(ProcfileOutcome::Written(written))
}

#[derive(Debug, thiserror::Error)]
pub enum ProcfileError {
    #[error("failed to write Procfile at {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
