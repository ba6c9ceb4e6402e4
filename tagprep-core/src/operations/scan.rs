use crate::output::ScanResult;
use crate::scanner::{default_image_extensions, scan_directory};
use anyhow::{Context, Result};
use std::path::Path;

/// Scan operation - returns structured data. Read-only, so no lock is
/// taken.
pub fn scan_operation(dir: &Path, image_extensions: Option<Vec<String>>) -> Result<ScanResult> {
    let extensions = image_extensions.unwrap_or_else(default_image_extensions);
    let report = scan_directory(dir, &extensions)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    Ok(ScanResult {
        directory: dir.to_path_buf(),
        pairs: report.pairs.len(),
        orphans: report.orphans.len(),
        conflicts: report.conflicts.len(),
        skipped: report.skipped.len(),
        report,
    })
}
