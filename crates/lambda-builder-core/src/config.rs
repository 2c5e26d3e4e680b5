use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Builder;

/// Per-project override document, read from the working directory.
pub const PROJECT_OVERRIDE_FILE: &str = "lambda.yml";

/// lambda.yml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectOverride {
    /// Builder name, skipping marker detection
    pub builder: Option<String>,
    /// Image used to run the build script
    pub build_image: Option<String>,
    /// Base image of the generated runtime image
    pub run_image: Option<String>,
}

impl ProjectOverride {
    /// Load from lambda.yml in the given directory, or return defaults if not found.
    ///
    /// This is a pure read and may be called any number of times.
    pub fn load(working_dir: &Path) -> crate::Result<Self> {
        let path = working_dir.join(PROJECT_OVERRIDE_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| crate::Error::ConfigLoad {
            path: path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| crate::Error::ConfigParse { path, source: e })
    }
}

/// Options supplied for a single invocation, before resolution.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub working_directory: PathBuf,
    /// Unique build identifier; generated when `None`
    pub identifier: Option<String>,
    pub builder: Option<String>,
    pub build_image: Option<String>,
    pub run_image: Option<String>,
    pub generate_run_image: bool,
    pub handler: Option<String>,
    /// Extra `(file name, handler)` conventions, layered over the builder's
    pub handler_map: Vec<(String, String)>,
    pub build_env: Vec<String>,
    pub image_env: Vec<String>,
    pub image_labels: Vec<String>,
    pub image_tag: Option<String>,
    pub port: Option<u16>,
    pub quiet: bool,
    pub write_procfile: bool,
}

/// Fully resolved build configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical path of the application being built
    pub working_directory: PathBuf,
    /// Unique per build; names the build container
    pub identifier: String,
    pub builder: Builder,
    pub build_image: String,
    pub run_image: String,
    pub generate_run_image: bool,
    /// Explicit handler, bypassing detection
    pub handler: Option<String>,
    /// Handler conventions for the selected builder (file name → handler)
    pub handler_map: BTreeMap<String, String>,
    /// `KEY=VALUE` entries for the build container
    pub build_env: Vec<String>,
    /// `KEY=VALUE` entries baked into the runtime image
    pub image_env: Vec<String>,
    pub image_labels: Vec<String>,
    /// Explicit tag; see [`Config::image_tag`]
    pub image_tag: Option<String>,
    /// `None` leaves the port environment variables out of the image
    pub port: Option<u16>,
    /// Suppress streaming of container output
    pub quiet: bool,
    pub write_procfile: bool,
}

impl Config {
    /// Resolve invocation options into a complete configuration.
    ///
    /// Precedence for builder, build image and run image:
    /// 1. explicit option
    /// 2. lambda.yml
    /// 3. the selected builder's default
    ///
    /// # Errors
    ///
    /// - [`Error::WorkingDirectory`](crate::Error::WorkingDirectory) if the directory is missing or empty
    /// - [`Error::ConfigLoad`](crate::Error::ConfigLoad) / [`Error::ConfigParse`](crate::Error::ConfigParse) for a bad lambda.yml
    /// - [`Error::UnknownBuilder`](crate::Error::UnknownBuilder) / [`Error::NoBuilderDetected`](crate::Error::NoBuilderDetected) from detection
    pub fn resolve(options: BuildOptions) -> crate::Result<Self> {
        let working_directory = validate_working_directory(&options.working_directory)?;
        let project = ProjectOverride::load(&working_directory)?;

        let builder_name = non_empty(options.builder).or(non_empty(project.builder));
        let builder = crate::detect::detect(&working_directory, builder_name.as_deref())?;

        let build_image = non_empty(options.build_image)
            .or(non_empty(project.build_image))
            .unwrap_or_else(|| builder.default_build_image().to_owned());
        let run_image = non_empty(options.run_image)
            .or(non_empty(project.run_image))
            .unwrap_or_else(|| builder.default_run_image().to_owned());

        let mut handler_map: BTreeMap<String, String> = builder
            .handler_map()
            .iter()
            .map(|(file, handler)| ((*file).to_owned(), (*handler).to_owned()))
            .collect();
        handler_map.extend(options.handler_map);

        let identifier = non_empty(options.identifier)
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        tracing::debug!(
            builder = %builder,
            build_image = %build_image,
            run_image = %run_image,
            identifier = %identifier,
            "config resolved"
        );

        Ok(Self {
            working_directory,
            identifier,
            builder,
            build_image,
            run_image,
            generate_run_image: options.generate_run_image,
            handler: non_empty(options.handler),
            handler_map,
            build_env: options.build_env,
            image_env: options.image_env,
            image_labels: options.image_labels,
            image_tag: non_empty(options.image_tag),
            port: options.port,
            quiet: options.quiet,
            write_procfile: options.write_procfile,
        })
    }

    /// The image tag, defaulting to `lambda-builder/<dir name>:latest`.
    pub fn image_tag(&self) -> String {
        if let Some(tag) = &self.image_tag {
            return tag.clone();
        }

        let app_name = self
            .working_directory
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        format!("lambda-builder/{app_name}:latest")
    }
}

/// Trim surrounding whitespace; blank values count as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Canonicalize the working directory and require it to hold at least one entry.
fn validate_working_directory(path: &Path) -> crate::Result<PathBuf> {
    if !path.is_dir() {
        return Err(crate::Error::WorkingDirectory {
            path: path.to_path_buf(),
            reason: "not a directory",
        });
    }

    let canonical = path
        .canonicalize()
        .map_err(|e| crate::Error::WorkingDirectoryRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut entries =
        std::fs::read_dir(&canonical).map_err(|e| crate::Error::WorkingDirectoryRead {
            path: canonical.clone(),
            source: e,
        })?;
    if entries.next().is_none() {
        return Err(crate::Error::WorkingDirectory {
            path: canonical,
            reason: "directory is empty",
        });
    }

    Ok(canonical)
}
