use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DashboardError;
use crate::view::DashboardView;

/// Name of the index file rewritten by every export.
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Writes one JSON artifact per panel into `dir`, named after the panel's
/// topic, followed by a manifest listing those files.
///
/// Existing artifacts with the same names are overwritten. Returns the paths
/// written, manifest last.
pub fn export(view: &DashboardView, dir: &Path) -> Result<Vec<PathBuf>, DashboardError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(view.panels.len() + 1);
    for panel in &view.panels {
        let path = dir.join(format!("{}.json", panel.topic().artifact_stem()));
        fs::write(&path, serde_json::to_vec_pretty(panel)?)?;
        tracing::debug!(path = %path.display(), "Wrote panel artifact.");
        written.push(path);
    }

    let manifest: String = written
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| format!("{}\n", name.to_string_lossy()))
        .collect();
    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, manifest)?;
    written.push(manifest_path);

    tracing::info!(dir = %dir.display(), files = written.len(), "Exported dashboard artifacts.");
    Ok(written)
}
