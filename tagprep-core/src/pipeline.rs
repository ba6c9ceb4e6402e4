use crate::edit::{edit_directory, EditRequest};
use crate::error::PipelineError;
use crate::lock::LockFile;
use crate::rename::{apply_plan, plan_renames};
use crate::scanner::{default_image_extensions, scan_directory, FileEntry, Pair};
use crate::tags::{TagSet, DEFAULT_DELIMITER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Folder orphaned files are moved into when quarantining is enabled.
pub const QUARANTINE_DIR: &str = "unpaired";

/// Stages of one pipeline run. `Failed` is terminal and reachable from any
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Scanning,
    Pairing,
    Quarantining,
    Editing,
    Normalizing,
    Renaming,
    Done,
    Failed,
}

/// Options for a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Tag delimiter inside tag files.
    pub delimiter: char,
    /// Match exact deletes case-insensitively.
    pub case_insensitive: bool,
    /// First index of the dense rename sequence.
    pub start_index: usize,
    /// Recognized image extensions (without dots, lowercase).
    pub image_extensions: Vec<String>,
    /// Move orphaned files into the quarantine folder.
    pub quarantine_orphans: bool,
    /// Apply the stylistic tag pass (separator replacement, paren
    /// escaping) on top of canonicalization.
    pub standardize: bool,
    /// Bulk edits to run before renaming, in order.
    pub edits: Vec<EditRequest>,
    /// Append timestamped progress lines to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            case_insensitive: false,
            start_index: 1,
            image_extensions: default_image_extensions(),
            quarantine_orphans: true,
            standardize: true,
            edits: Vec::new(),
            log_file: None,
        }
    }
}

/// Structured outcome of a full run. Per-item problems land in `errors`;
/// `failure` is set only when the run ends in `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub stage: PipelineStage,
    pub pairs: usize,
    pub orphans: usize,
    pub conflicts: usize,
    pub quarantined: usize,
    pub edited_files: usize,
    pub normalized_files: usize,
    pub renamed_files: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PipelineSummary {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Scanning,
            pairs: 0,
            orphans: 0,
            conflicts: 0,
            quarantined: 0,
            edited_files: 0,
            normalized_files: 0,
            renamed_files: 0,
            errors: Vec::new(),
            failure: None,
        }
    }

    fn fail(mut self, reason: String) -> Self {
        self.stage = PipelineStage::Failed;
        self.failure = Some(reason);
        self
    }

    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Done
    }
}

/// Timestamped run log, appended to when `log_file` is set.
struct RunLog {
    file: Option<File>,
}

impl RunLog {
    fn open(path: Option<&Path>) -> Result<Self> {
        let file = if let Some(path) = path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        } else {
            None
        };
        Ok(Self { file })
    }

    fn log(&mut self, message: &str) {
        if let Some(ref mut file) = self.file {
            let _ = writeln!(
                file,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                message
            );
            let _ = file.flush();
        }
    }
}

/// Run the whole pipeline against one dataset directory:
/// scan -> pair -> quarantine -> edit -> normalize -> rename.
///
/// The directory lock is held for the full run. Only a missing directory,
/// an empty pair set, or an unresolved rename conflict fail the run;
/// everything else is reported per item.
pub fn run_full_pipeline(dir: &Path, options: &PipelineOptions) -> Result<PipelineSummary> {
    let mut summary = PipelineSummary::new();

    if !dir.is_dir() {
        return Ok(summary.fail(PipelineError::DirectoryNotFound(dir.to_path_buf()).to_string()));
    }

    let _lock = LockFile::acquire(dir).context("Failed to acquire dataset directory lock")?;
    let mut log = RunLog::open(options.log_file.as_deref())?;
    log.log(&format!("run started: {}", dir.display()));

    // Scan + pair.
    let report = match scan_directory(dir, &options.image_extensions) {
        Ok(report) => report,
        Err(e) => return Ok(summary.fail(e.to_string())),
    };
    summary.stage = PipelineStage::Pairing;
    summary.pairs = report.pairs.len();
    summary.orphans = report.orphans.len();
    summary.conflicts = report.conflicts.len();
    log.log(&format!(
        "scan: {} pairs, {} orphans, {} conflicts, {} skipped",
        report.pairs.len(),
        report.orphans.len(),
        report.conflicts.len(),
        report.skipped.len()
    ));

    if report.pairs.is_empty() {
        log.log("no pairs found, failing run");
        return Ok(summary.fail("no image/tag pairs found in directory".to_string()));
    }

    // Quarantine orphans. Conflict groups stay in place; resolving them is
    // the caller's call.
    if options.quarantine_orphans && !report.orphans.is_empty() {
        summary.stage = PipelineStage::Quarantining;
        let (moved, errors) = quarantine_orphans(dir, &report.orphans);
        summary.quarantined = moved;
        summary.errors.extend(errors);
        log.log(&format!("quarantined {} orphaned files", moved));
    }

    // Bulk edits, in order.
    for request in &options.edits {
        summary.stage = PipelineStage::Editing;
        let mut request = request.clone();
        request.case_insensitive = request.case_insensitive || options.case_insensitive;
        match edit_directory(dir, &request, options.delimiter) {
            Ok(outcomes) => {
                for outcome in outcomes {
                    if let Some(error) = outcome.error {
                        summary.errors.push(format!("{}: {}", outcome.path.display(), error));
                    } else if outcome.changed {
                        summary.edited_files += 1;
                    }
                }
            },
            // An invalid request skips only itself; later stages still run.
            Err(e) => summary.errors.push(e.to_string()),
        }
    }
    if !options.edits.is_empty() {
        log.log(&format!("edited {} tag files", summary.edited_files));
    }

    // Rewrite tag files in canonical form; optionally apply the stylistic
    // pass on top.
    summary.stage = PipelineStage::Normalizing;
    let (normalized, errors) = normalize_pair_tags(&report.pairs, options);
    summary.normalized_files = normalized;
    summary.errors.extend(errors);
    log.log(&format!("normalized {} tag files", normalized));

    // Rename into the dense sequence.
    summary.stage = PipelineStage::Renaming;
    let plan = plan_renames(&report.pairs, dir, options.start_index);
    let rename_report = apply_plan(&plan);
    summary.renamed_files = rename_report.renamed.len();
    summary.errors.extend(rename_report.errors.clone());
    log.log(&format!("renamed {} files", summary.renamed_files));

    if let Some(target) = rename_report.conflict {
        let reason = PipelineError::RenameConflict(target).to_string();
        log.log(&format!("run failed: {}", reason));
        return Ok(summary.fail(reason));
    }

    summary.stage = PipelineStage::Done;
    log.log("run finished");
    Ok(summary)
}

/// Move orphaned files into `<dir>/unpaired/`, suffixing `_1`, `_2`, ... on
/// name collisions inside the quarantine folder.
pub fn quarantine_orphans(dir: &Path, orphans: &[FileEntry]) -> (usize, Vec<String>) {
    let quarantine = dir.join(QUARANTINE_DIR);
    if let Err(e) = fs::create_dir_all(&quarantine) {
        return (0, vec![format!("failed to create quarantine folder: {e}")]);
    }

    let mut moved = 0;
    let mut errors = Vec::new();
    for orphan in orphans {
        let Some(file_name) = orphan.path.file_name() else {
            continue;
        };
        let mut dest = quarantine.join(file_name);
        let mut counter = 1;
        while dest.exists() {
            let suffixed = if orphan.extension.is_empty() {
                format!("{}_{}", orphan.base_name, counter)
            } else {
                format!("{}_{}.{}", orphan.base_name, counter, orphan.extension)
            };
            dest = quarantine.join(suffixed);
            counter += 1;
        }
        match fs::rename(&orphan.path, &dest) {
            Ok(()) => moved += 1,
            Err(e) => errors.push(format!(
                "failed to quarantine {}: {}",
                orphan.path.display(),
                e
            )),
        }
    }
    (moved, errors)
}

/// Rewrite each pair's tag file in canonical form, applying the stylistic
/// pass when configured. Returns the rewrite count and per-file errors.
fn normalize_pair_tags(pairs: &[Pair], options: &PipelineOptions) -> (usize, Vec<String>) {
    let mut rewritten = 0;
    let mut errors = Vec::new();

    for pair in pairs {
        let path = &pair.tag.path;
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                errors.push(format!("failed to read {}: {}", path.display(), e));
                continue;
            },
        };

        let mut set = TagSet::parse(&raw, options.delimiter);
        if options.standardize {
            set = set.standardized();
        }
        let canonical = set.serialize(options.delimiter);
        if canonical == raw {
            continue;
        }
        match fs::write(path, canonical) {
            Ok(()) => rewritten += 1,
            Err(e) => errors.push(format!("failed to write {}: {}", path.display(), e)),
        }
    }

    (rewritten, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::classify;
    use std::fs;
    use tempfile::TempDir;

    fn entry(dir: &Path, name: &str) -> FileEntry {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        classify(&path, &default_image_extensions())
    }

    #[test]
    fn test_quarantine_moves_orphans() {
        let temp = TempDir::new().unwrap();
        let orphans = vec![entry(temp.path(), "lost.jpg"), entry(temp.path(), "lost.png")];

        let (moved, errors) = quarantine_orphans(temp.path(), &orphans);
        assert_eq!(moved, 2);
        assert!(errors.is_empty());
        assert!(temp.path().join(QUARANTINE_DIR).join("lost.jpg").exists());
        assert!(!temp.path().join("lost.jpg").exists());
    }

    #[test]
    fn test_quarantine_suffixes_on_collision() {
        let temp = TempDir::new().unwrap();
        let quarantine = temp.path().join(QUARANTINE_DIR);
        fs::create_dir_all(&quarantine).unwrap();
        fs::write(quarantine.join("lost.jpg"), b"earlier").unwrap();

        let orphans = vec![entry(temp.path(), "lost.jpg")];
        let (moved, errors) = quarantine_orphans(temp.path(), &orphans);
        assert_eq!(moved, 1);
        assert!(errors.is_empty());
        assert!(quarantine.join("lost_1.jpg").exists());
    }

    #[test]
    fn test_missing_directory_fails_the_run() {
        let summary =
            run_full_pipeline(Path::new("/no/such/dataset"), &PipelineOptions::default()).unwrap();
        assert_eq!(summary.stage, PipelineStage::Failed);
        assert!(summary.failure.unwrap().contains("directory not found"));
    }

    #[test]
    fn test_empty_pair_set_fails_the_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("only.jpg"), b"x").unwrap();

        let options = PipelineOptions {
            quarantine_orphans: false,
            ..Default::default()
        };
        let summary = run_full_pipeline(temp.path(), &options).unwrap();
        assert_eq!(summary.stage, PipelineStage::Failed);
        assert_eq!(summary.orphans, 1);
        // The orphan was not touched.
        assert!(temp.path().join("only.jpg").exists());
    }

    #[test]
    fn test_full_run_is_idempotent() {
        let temp = TempDir::new().unwrap();
        for (name, content) in [
            ("b.jpg", &b"img"[..]),
            ("a.png", b"img"),
        ] {
            fs::write(temp.path().join(name), content).unwrap();
        }
        fs::write(temp.path().join("b.txt"), "1girl, solo\n").unwrap();
        fs::write(temp.path().join("a.txt"), "scenery\n").unwrap();

        let options = PipelineOptions::default();
        let first = run_full_pipeline(temp.path(), &options).unwrap();
        assert!(first.is_success(), "failure: {:?}", first.failure);
        assert_eq!(first.pairs, 2);
        assert_eq!(first.renamed_files, 4);

        let second = run_full_pipeline(temp.path(), &options).unwrap();
        assert!(second.is_success());
        assert_eq!(second.renamed_files, 0);
        assert_eq!(second.normalized_files, 0);
    }
}
