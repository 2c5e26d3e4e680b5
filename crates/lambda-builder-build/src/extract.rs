use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Archive the build script leaves in the working directory.
pub const ARCHIVE_FILE: &str = "lambda.zip";

/// Scratch directory holding the extracted build output.
///
/// The directory is removed when the context is dropped, on every exit path.
#[derive(Debug)]
pub struct BuildContext {
    dir: TempDir,
}

impl BuildContext {
    /// Extract `<working_dir>/lambda.zip` into a fresh scratch directory.
    pub fn extract(working_dir: &Path) -> Result<Self, ExtractError> {
        let archive = working_dir.join(ARCHIVE_FILE);
        if !archive.is_file() {
            return Err(ExtractError::Missing { path: archive });
        }

        let dir = tempfile::Builder::new()
            .prefix("lambda-builder")
            .tempdir()
            .map_err(|e| ExtractError::ScratchDir { source: e })?;

        extract_zip(&archive, dir.path())?;
        tracing::debug!(
            archive = %archive.display(),
            dest = %dir.path().display(),
            "archive extracted"
        );

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Remove a `lambda.zip` left in `working_dir` by an earlier build.
///
/// An absent archive is not an error.
pub fn clear_archive(working_dir: &Path) -> Result<(), ExtractError> {
    let archive = working_dir.join(ARCHIVE_FILE);
    match std::fs::remove_file(&archive) {
        Ok(()) => {
            tracing::debug!(archive = %archive.display(), "removed stale archive");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExtractError::Clear {
            path: archive,
            source: e,
        }),
    }
}

/// Unpack every entry of a zip archive into `dest`.
///
/// Entries whose names would escape `dest` are rejected.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive_path).map_err(|e| ExtractError::Open {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::Corrupt {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ExtractError::Corrupt {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ExtractError::UnsafeEntry {
                name: entry.name().to_owned(),
            })?;
        let dest_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path).map_err(|e| ExtractError::Write {
                path: dest_path.clone(),
                source: e,
            })?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExtractError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut outfile = File::create(&dest_path).map_err(|e| ExtractError::Write {
            path: dest_path.clone(),
            source: e,
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| ExtractError::Write {
            path: dest_path.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&dest_path, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| ExtractError::Write {
                        path: dest_path.clone(),
                        source: e,
                    })?;
            }
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("archive not found at {path} — the build script did not produce it")]
    Missing { path: PathBuf },

    #[error("failed to remove stale archive {path}")]
    Clear {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open archive {path}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("archive {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("archive entry {name:?} escapes the extraction directory")]
    UnsafeEntry { name: String },

    #[error("failed to create scratch directory")]
    ScratchDir { source: std::io::Error },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
