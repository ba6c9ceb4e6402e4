use crate::edit::{edit_directory, EditRequest};
use crate::lock::LockFile;
use crate::output::EditResult;
use anyhow::{Context, Result};
use std::path::Path;

/// Bulk edit operation - returns structured data. Holds the directory lock
/// while tag files are rewritten.
pub fn edit_operation(dir: &Path, request: &EditRequest, delimiter: char) -> Result<EditResult> {
    let _lock = LockFile::acquire(dir).context("Failed to acquire dataset directory lock")?;

    let outcomes = edit_directory(dir, request, delimiter)
        .with_context(|| format!("Failed to edit tags in {}", dir.display()))?;

    let files_changed = outcomes.iter().filter(|o| o.changed).count();
    let files_failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    Ok(EditResult {
        directory: dir.to_path_buf(),
        files_processed: outcomes.len(),
        files_changed,
        files_failed,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_edit_operation_reports_changed_counts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.txt"), "a, b\n").unwrap();
        fs::write(temp.path().join("2.txt"), "c\n").unwrap();

        let request = EditRequest {
            remove: vec!["a".to_string()],
            ..Default::default()
        };
        let result = edit_operation(temp.path(), &request, ',').unwrap();
        assert_eq!(result.files_processed, 2);
        assert_eq!(result.files_changed, 1);
        assert_eq!(result.files_failed, 0);
    }

    #[test]
    fn test_edit_operation_invalid_pattern_fails_before_mutation() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.txt"), "a, b\n").unwrap();

        let request = EditRequest {
            remove_containing: vec![String::new()],
            ..Default::default()
        };
        assert!(edit_operation(temp.path(), &request, ',').is_err());
        assert_eq!(fs::read_to_string(temp.path().join("1.txt")).unwrap(), "a, b\n");
    }

    #[test]
    fn test_edit_operation_releases_lock() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.txt"), "a\n").unwrap();

        let request = EditRequest::default();
        edit_operation(temp.path(), &request, ',').unwrap();
        // A second operation can acquire the lock again.
        edit_operation(temp.path(), &request, ',').unwrap();
    }
}
