use std::path::Path;

use crate::Builder;

/// Select the builder for `working_dir`.
///
/// An explicit builder name skips detection entirely. Otherwise builders are
/// tried in [`Builder::ALL`] order and the first whose marker is present wins.
///
/// # Errors
///
/// - [`Error::UnknownBuilder`](crate::Error::UnknownBuilder) if `explicit` names no builder
/// - [`Error::NoBuilderDetected`](crate::Error::NoBuilderDetected) if no marker matches
pub fn detect(working_dir: &Path, explicit: Option<&str>) -> crate::Result<Builder> {
    if let Some(name) = explicit {
        let builder: Builder = name.trim().parse()?;
        tracing::debug!(builder = %builder, "builder selected explicitly");
        return Ok(builder);
    }

    let builder = Builder::ALL
        .into_iter()
        .find(|b| b.detect(working_dir))
        .ok_or_else(|| crate::Error::NoBuilderDetected {
            dir: working_dir.to_path_buf(),
        })?;

    tracing::debug!(
        builder = %builder,
        dir = %working_dir.display(),
        "builder detected from marker files"
    );
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// First marker of each builder, as a concrete file name.
    fn marker_file(builder: Builder) -> &'static str {
        match builder {
            Builder::Dotnet => "Function.csproj",
            other => other.markers()[0],
        }
    }

    #[test]
    fn priority_order_breaks_ties() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Gemfile.lock"), "").unwrap();
        std::fs::write(tmp.path().join("go.mod"), "module x").unwrap();

        assert_eq!(detect(tmp.path(), None).unwrap(), Builder::Go);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn builder() -> impl Strategy<Value = Builder> {
            proptest::sample::select(Builder::ALL.to_vec())
        }

        fn builders() -> impl Strategy<Value = Vec<Builder>> {
            proptest::sample::subsequence(Builder::ALL.to_vec(), 0..=Builder::ALL.len())
        }

        proptest! {
            #[test]
            fn explicit_override_beats_any_markers(chosen in builder(), present in builders()) {
                let tmp = TempDir::new().unwrap();
                for b in &present {
                    std::fs::write(tmp.path().join(marker_file(*b)), "").unwrap();
                }

                let selected = detect(tmp.path(), Some(chosen.name())).unwrap();
                prop_assert_eq!(selected, chosen);
            }

            #[test]
            fn detection_picks_highest_priority_marker(present in builders()) {
                let tmp = TempDir::new().unwrap();
                for b in &present {
                    std::fs::write(tmp.path().join(marker_file(*b)), "").unwrap();
                }

                let result = detect(tmp.path(), None);
                match present.first() {
                    Some(expected) => prop_assert_eq!(result.unwrap(), *expected),
                    None => prop_assert!(
                        matches!(result, Err(crate::Error::NoBuilderDetected { .. })),
                        "expected NoBuilderDetected, got {:?}",
                        result
                    ),
                }
            }
        }
    }
}
