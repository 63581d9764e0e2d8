//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use flowgraph_config::{Patch, duplicate_connections, validate_patch};

/// Load a patch file and reject it if it does not validate.
///
/// Repeated connections are legal and only logged.
pub fn load_patch(path: &Path) -> anyhow::Result<Patch> {
    let patch = Patch::load(path).map_err(|e| anyhow::anyhow!("{}", e))?;
    validate_patch(&patch)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

    for (sink, source, count) in duplicate_connections(&patch) {
        tracing::warn!("{source} → {sink} declared {count} times; it will be summed {count} times");
    }
    Ok(patch)
}
