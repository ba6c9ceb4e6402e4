use crate::output::RunResult;
use crate::pipeline::{run_full_pipeline, PipelineOptions};
use anyhow::Result;
use std::path::Path;

/// Full pipeline operation - returns structured data. The pipeline locks
/// the directory itself and holds the lock for the whole run.
pub fn run_operation(dir: &Path, options: &PipelineOptions) -> Result<RunResult> {
    let summary = run_full_pipeline(dir, options)?;
    Ok(RunResult {
        directory: dir.to_path_buf(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_operation_processes_dataset() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("cat.jpg"), b"img").unwrap();
        fs::write(temp.path().join("cat.txt"), "1girl, solo").unwrap();

        let result = run_operation(temp.path(), &PipelineOptions::default()).unwrap();
        assert!(result.summary.is_success());
        assert_eq!(result.summary.pairs, 1);
        assert!(temp.path().join("1.jpg").exists());
        assert_eq!(
            fs::read_to_string(temp.path().join("1.txt")).unwrap(),
            "1girl, solo\n"
        );
    }
}
