use std::path::Path;

use crate::{Builder, Config};

/// Resolve the handler for the extracted build output.
///
/// An explicit `config.handler` always wins. Otherwise the builder's own
/// heuristic runs, followed by the `handler_map` conventions in file-name
/// order. An empty string means no handler could be determined.
pub fn resolve_handler(build_dir: &Path, builder: Builder, config: &Config) -> String {
    if let Some(handler) = &config.handler {
        tracing::debug!(handler = %handler, "using explicit handler");
        return handler.clone();
    }

    if let Some(handler) = builder.detect_handler(build_dir) {
        tracing::debug!(handler = %handler, builder = %builder, "handler detected by builder");
        return handler;
    }

    let convention = config
        .handler_map
        .iter()
        .find(|(file, _)| build_dir.join(file).is_file());

    match convention {
        Some((file, handler)) => {
            tracing::debug!(file = %file, handler = %handler, "handler matched convention");
            handler.clone()
        }
        None => {
            tracing::debug!(dir = %build_dir.display(), "no handler found in build output");
            String::new()
        }
    }
}
