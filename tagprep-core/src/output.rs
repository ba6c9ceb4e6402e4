use crate::edit::EditOutcome;
use crate::pipeline::PipelineSummary;
use crate::rename::RenamedFile;
use crate::scanner::ScanReport;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Result of a scan operation
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub directory: PathBuf,
    pub pairs: usize,
    pub orphans: usize,
    pub conflicts: usize,
    pub skipped: usize,
    pub report: ScanReport,
}

/// Result of a bulk edit operation
#[derive(Debug, Serialize, Deserialize)]
pub struct EditResult {
    pub directory: PathBuf,
    pub files_processed: usize,
    pub files_changed: usize,
    pub files_failed: usize,
    pub outcomes: Vec<EditOutcome>,
}

/// Result of a rename operation
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameOpResult {
    pub directory: PathBuf,
    pub start_index: usize,
    pub pairs: usize,
    pub renamed_files: usize,
    pub renames: Vec<RenamedFile>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<PathBuf>,
}

/// Result of a full pipeline run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub directory: PathBuf,
    pub summary: PipelineSummary,
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for ScanResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "scan",
            "directory": self.directory,
            "summary": {
                "pairs": self.pairs,
                "orphans": self.orphans,
                "conflicts": self.conflicts,
                "skipped": self.skipped,
            },
            "report": self.report,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(output, "Scanned {}", self.directory.display()).unwrap();
        writeln!(
            output,
            "Pairs: {}, orphans: {}, conflicts: {}, skipped: {}",
            self.pairs, self.orphans, self.conflicts, self.skipped
        )
        .unwrap();

        for orphan in &self.report.orphans {
            writeln!(output, "  orphan: {}", orphan.path.display()).unwrap();
        }
        for conflict in &self.report.conflicts {
            let names: Vec<String> = conflict
                .entries
                .iter()
                .filter_map(|e| e.path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
            writeln!(output, "  conflict '{}': {}", conflict.base_name, names.join(", ")).unwrap();
        }

        output
    }
}

impl OutputFormatter for EditResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.files_failed == 0,
            "operation": "edit",
            "directory": self.directory,
            "summary": {
                "files_processed": self.files_processed,
                "files_changed": self.files_changed,
                "files_failed": self.files_failed,
            },
            "outcomes": self.outcomes,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Edited tags in {}: {} files processed, {} changed",
            self.directory.display(),
            self.files_processed,
            self.files_changed
        )
        .unwrap();

        for outcome in &self.outcomes {
            if let Some(ref error) = outcome.error {
                writeln!(output, "  failed: {}: {}", outcome.path.display(), error).unwrap();
            }
        }

        output
    }
}

impl OutputFormatter for RenameOpResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.conflict.is_none() && self.errors.is_empty(),
            "operation": "rename",
            "directory": self.directory,
            "summary": {
                "pairs": self.pairs,
                "start_index": self.start_index,
                "renamed_files": self.renamed_files,
            },
            "renames": self.renames,
            "errors": self.errors,
            "conflict": self.conflict,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Renamed {} files across {} pairs (starting at {})",
            self.renamed_files, self.pairs, self.start_index
        )
        .unwrap();

        for error in &self.errors {
            writeln!(output, "  error: {}", error).unwrap();
        }
        if let Some(ref conflict) = self.conflict {
            writeln!(
                output,
                "  conflict: target already exists: {}",
                conflict.display()
            )
            .unwrap();
        }

        output
    }
}

impl OutputFormatter for RunResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.summary.is_success(),
            "operation": "run",
            "directory": self.directory,
            "summary": self.summary,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        let s = &self.summary;

        if s.is_success() {
            writeln!(output, "Pipeline finished for {}", self.directory.display()).unwrap();
        } else {
            writeln!(
                output,
                "Pipeline failed for {}: {}",
                self.directory.display(),
                s.failure.as_deref().unwrap_or("unknown failure")
            )
            .unwrap();
        }

        writeln!(
            output,
            "Pairs: {}, orphans: {}, conflicts: {}, quarantined: {}",
            s.pairs, s.orphans, s.conflicts, s.quarantined
        )
        .unwrap();
        writeln!(
            output,
            "Edited: {}, normalized: {}, renamed: {}",
            s.edited_files, s.normalized_files, s.renamed_files
        )
        .unwrap();

        for error in &s.errors {
            writeln!(output, "  error: {}", error).unwrap();
        }

        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "name": self.name,
            "version": self.version,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
