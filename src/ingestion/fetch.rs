//! Fetch functions - collect the report files delivered for this run

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Every `.csv` file directly inside `dir`, sorted by name.
/// An unreadable directory is fatal for the run.
pub fn list_report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list attachments folder {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();

    info!("Found {} report files in {:?}", files.len(), dir);
    Ok(files)
}
