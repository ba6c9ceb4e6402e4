use crate::lock::LockFile;
use crate::output::RenameOpResult;
use crate::rename::{apply_plan, plan_renames};
use crate::scanner::{default_image_extensions, scan_directory};
use anyhow::{Context, Result};
use std::path::Path;

/// Rename operation - scans, plans and applies the dense renumbering in
/// one step, holding the directory lock throughout. Orphans and conflict
/// groups are left untouched.
pub fn rename_operation(
    dir: &Path,
    image_extensions: Option<Vec<String>>,
    start_index: usize,
) -> Result<RenameOpResult> {
    let _lock = LockFile::acquire(dir).context("Failed to acquire dataset directory lock")?;

    let extensions = image_extensions.unwrap_or_else(default_image_extensions);
    let report = scan_directory(dir, &extensions)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let plan = plan_renames(&report.pairs, dir, start_index);
    let rename_report = apply_plan(&plan);

    Ok(RenameOpResult {
        directory: dir.to_path_buf(),
        start_index,
        pairs: plan.entries.len(),
        renamed_files: rename_report.renamed.len(),
        renames: rename_report.renamed,
        errors: rename_report.errors,
        conflict: rename_report.conflict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rename_operation_renumbers_pairs() {
        let temp = TempDir::new().unwrap();
        for name in ["b.jpg", "b.txt", "a.jpg", "a.txt", "loose.png"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        let result = rename_operation(temp.path(), None, 1).unwrap();
        assert_eq!(result.pairs, 2);
        assert_eq!(result.renamed_files, 4);
        assert!(result.conflict.is_none());

        assert!(temp.path().join("1.jpg").exists());
        assert!(temp.path().join("2.txt").exists());
        // The orphan stays put.
        assert!(temp.path().join("loose.png").exists());
    }

    #[test]
    fn test_rename_operation_surfaces_conflicts() {
        let temp = TempDir::new().unwrap();
        for name in ["photo.jpg", "photo.txt", "1.jpg"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        let result = rename_operation(temp.path(), None, 1).unwrap();
        assert!(result.conflict.is_some());
        assert!(temp.path().join("photo.jpg").exists());
    }
}
