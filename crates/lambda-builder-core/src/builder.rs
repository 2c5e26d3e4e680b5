//! Language builders.
//!
//! The set of supported ecosystems is closed: every builder is a variant of
//! [`Builder`], and all per-language behaviour (marker detection, default
//! images, build script, handler heuristics) is dispatched through it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A language builder.
///
/// Variants are declared in detection priority order; [`Builder::ALL`]
/// preserves that order.
///
/// # Examples
///
/// ```
/// use lambda_builder_core::Builder;
///
/// let builder: Builder = "python".parse().unwrap();
/// assert_eq!(builder, Builder::Python);
/// assert_eq!(builder.name(), "python");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builder {
    Dotnet,
    Go,
    Nodejs,
    Python,
    Ruby,
}

impl Builder {
    /// All builders, in detection priority order.
    pub const ALL: [Builder; 5] = [
        Builder::Dotnet,
        Builder::Go,
        Builder::Nodejs,
        Builder::Python,
        Builder::Ruby,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builder::Dotnet => "dotnet",
            Builder::Go => "go",
            Builder::Nodejs => "nodejs",
            Builder::Python => "python",
            Builder::Ruby => "ruby",
        }
    }

    /// Marker files whose presence in the working directory selects this
    /// builder. A leading `*` matches by extension.
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Builder::Dotnet => &["*.csproj"],
            Builder::Go => &["go.mod"],
            Builder::Nodejs => &["package.json"],
            Builder::Python => &["requirements.txt", "poetry.lock", "Pipfile.lock"],
            Builder::Ruby => &["Gemfile.lock"],
        }
    }

    /// Whether any of this builder's markers exists in `dir`.
    pub fn detect(self, dir: &Path) -> bool {
        self.markers().iter().any(|marker| match marker.strip_prefix('*') {
            Some(extension) => has_file_with_suffix(dir, extension),
            None => dir.join(marker).is_file(),
        })
    }

    pub fn default_build_image(self) -> &'static str {
        match self {
            Builder::Dotnet => "mlupin/docker-lambda:dotnet6-build",
            Builder::Go => "lambci/lambda:build-go1.x",
            Builder::Nodejs => "mlupin/docker-lambda:nodejs14.x-build",
            Builder::Python => "mlupin/docker-lambda:python3.9-build",
            Builder::Ruby => "mlupin/docker-lambda:ruby2.7-build",
        }
    }

    pub fn default_run_image(self) -> &'static str {
        match self {
            Builder::Dotnet => "mlupin/docker-lambda:dotnet6",
            Builder::Go => "lambci/lambda:go1.x",
            Builder::Nodejs => "mlupin/docker-lambda:nodejs14.x",
            Builder::Python => "mlupin/docker-lambda:python3.9",
            Builder::Ruby => "mlupin/docker-lambda:ruby2.7",
        }
    }

    /// Bash script executed inside the build container from `/tmp/task`.
    ///
    /// Every script writes `/tmp/task/lambda.zip` when `LAMBDA_BUILD_ZIP=1`.
    pub fn build_script(self) -> &'static str {
        match self {
            Builder::Dotnet => include_str!("../scripts/dotnet.sh"),
            Builder::Go => include_str!("../scripts/go.sh"),
            Builder::Nodejs => include_str!("../scripts/nodejs.sh"),
            Builder::Python => include_str!("../scripts/python.sh"),
            Builder::Ruby => include_str!("../scripts/ruby.sh"),
        }
    }

    /// Default handler conventions as `(file name, handler)` pairs.
    pub fn handler_map(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Builder::Dotnet => &[],
            Builder::Go => &[("bootstrap", "bootstrap")],
            Builder::Nodejs => &[
                ("app.js", "app.handler"),
                ("function.js", "function.handler"),
                ("handler.js", "handler.handler"),
                ("index.js", "index.handler"),
            ],
            Builder::Python => &[
                ("app.py", "app.handler"),
                ("function.py", "function.handler"),
                ("handler.py", "handler.handler"),
                ("lambda_function.py", "lambda_function.lambda_handler"),
                ("main.py", "main.handler"),
            ],
            Builder::Ruby => &[
                ("app.rb", "app.handler"),
                ("function.rb", "function.handler"),
                ("handler.rb", "handler.handler"),
                ("lambda_function.rb", "lambda_function.lambda_handler"),
            ],
        }
    }

    /// Builder-specific handler heuristic over the extracted build output.
    ///
    /// Runs before the generic file-name conventions in
    /// [`crate::handler::resolve_handler`]. Returns `None` when the
    /// heuristic has nothing to say.
    pub fn detect_handler(self, build_dir: &Path) -> Option<String> {
        match self {
            Builder::Dotnet => dotnet_handler(build_dir),
            Builder::Go => {
                is_executable_file(&build_dir.join("bootstrap")).then(|| "bootstrap".to_owned())
            }
            Builder::Nodejs => nodejs_main_handler(build_dir),
            Builder::Python | Builder::Ruby => None,
        }
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Builder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Builder::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| crate::Error::UnknownBuilder {
                name: s.to_owned(),
                known: Builder::ALL.iter().map(|b| b.name().to_owned()).collect(),
            })
    }
}

/// Sorted file names in `dir`. Unreadable directories yield an empty list.
fn file_names(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "failed to read directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .collect();
    names.sort();
    names
}

fn has_file_with_suffix(dir: &Path, suffix: &str) -> bool {
    file_names(dir).iter().any(|name| name.ends_with(suffix))
}

/// `<Assembly>.runtimeconfig.json` → `<Assembly>::<Assembly>.Function::FunctionHandler`
fn dotnet_handler(build_dir: &Path) -> Option<String> {
    file_names(build_dir).iter().find_map(|name| {
        let assembly = name.strip_suffix(".runtimeconfig.json")?;
        if assembly.is_empty() {
            return None;
        }
        Some(format!("{assembly}::{assembly}.Function::FunctionHandler"))
    })
}

/// `package.json` `"main": "src/index.js"` → `src/index.handler`
fn nodejs_main_handler(build_dir: &Path) -> Option<String> {
    let manifest = build_dir.join("package.json");
    if !manifest.is_file() {
        return None;
    }

    let content = match std::fs::read_to_string(&manifest) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %manifest.display(), error = %e, "failed to read package.json");
            return None;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %manifest.display(), error = %e, "failed to parse package.json");
            return None;
        }
    };

    let main = value.get("main")?.as_str()?;
    let main = main.strip_prefix("./").unwrap_or(main);
    if !build_dir.join(main).is_file() {
        tracing::debug!(main, "package.json main does not exist in build output");
        return None;
    }

    let module = main
        .strip_suffix(".js")
        .or_else(|| main.strip_suffix(".mjs"))
        .or_else(|| main.strip_suffix(".cjs"))
        .unwrap_or(main);
    Some(format!("{module}.handler"))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
