use crate::error::{PipelineError, Result};
use crate::scanner::{classify, FileKind};
use crate::tags::TagSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A bulk tag mutation, applied as exact deletes, then fuzzy deletes, then
/// appends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditRequest {
    /// Tags to delete by exact match.
    pub remove: Vec<String>,
    /// Delete every tag containing one of these substrings
    /// (case-insensitive).
    pub remove_containing: Vec<String>,
    /// Tags to append when not already present.
    pub append: Vec<String>,
    /// Match exact deletes case-insensitively.
    pub case_insensitive: bool,
}

impl EditRequest {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.remove_containing.is_empty() && self.append.is_empty()
    }

    /// Reject empty fuzzy patterns before anything is mutated; an empty
    /// substring would match and delete every tag.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.remove_containing {
            if pattern.trim().is_empty() {
                return Err(PipelineError::InvalidPattern(
                    "empty substring pattern would delete every tag".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply this request to one tag set, returning a new set. The input is
    /// never mutated; the caller decides whether to persist the result.
    pub fn apply(&self, set: &TagSet) -> Result<TagSet> {
        self.validate()?;
        let removed = remove_exact(set, &self.remove, self.case_insensitive);
        let filtered = remove_containing(&removed, &self.remove_containing)?;
        Ok(append(&filtered, &self.append))
    }
}

/// Remove every tag equal to one of `tags`. Survivor order is preserved.
pub fn remove_exact(set: &TagSet, tags: &[String], case_insensitive: bool) -> TagSet {
    let matches = |tag: &str| {
        if case_insensitive {
            tags.iter().any(|t| t.to_lowercase() == tag.to_lowercase())
        } else {
            tags.iter().any(|t| t == tag)
        }
    };
    TagSet {
        tags: set.tags.iter().filter(|t| !matches(t)).cloned().collect(),
    }
}

/// Remove every tag containing one of `patterns` as a case-insensitive
/// substring.
pub fn remove_containing(set: &TagSet, patterns: &[String]) -> Result<TagSet> {
    let mut lowered = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        if pattern.trim().is_empty() {
            return Err(PipelineError::InvalidPattern(
                "empty substring pattern would delete every tag".to_string(),
            ));
        }
        lowered.push(pattern.to_lowercase());
    }

    let tags = set
        .tags
        .iter()
        .filter(|tag| {
            let haystack = tag.to_lowercase();
            !lowered.iter().any(|p| haystack.contains(p))
        })
        .cloned()
        .collect();

    Ok(TagSet { tags })
}

/// Append each tag not already present, in the order given. Present tags
/// are skipped silently; existing tags keep their positions.
pub fn append(set: &TagSet, tags: &[String]) -> TagSet {
    let mut out = set.clone();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.contains(tag) {
            continue;
        }
        out.tags.push(tag.to_string());
    }
    out
}

/// One file's outcome from a batch edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutcome {
    pub path: PathBuf,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditOutcome {
    fn failed(path: PathBuf, error: String) -> Self {
        Self {
            path,
            before: Vec::new(),
            after: Vec::new(),
            changed: false,
            error: Some(error),
        }
    }
}

/// Apply one request to every tag file in `dir`. Directory and pattern
/// validation happen before any file is touched; after that, a single
/// unreadable or unwritable file contributes an error outcome and the
/// batch continues.
pub fn edit_directory(dir: &Path, request: &EditRequest, delimiter: char) -> Result<Vec<EditOutcome>> {
    if !dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
    }
    request.validate()?;

    let mut outcomes = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if classify(entry.path(), &[]).kind != FileKind::Tag {
            continue;
        }
        outcomes.push(edit_file(entry.path(), request, delimiter));
    }

    Ok(outcomes)
}

fn edit_file(path: &Path, request: &EditRequest, delimiter: char) -> EditOutcome {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            let parse = PipelineError::Parse {
                path: path.to_path_buf(),
                reason: "not valid UTF-8".to_string(),
            };
            return EditOutcome::failed(path.to_path_buf(), parse.to_string());
        },
        Err(e) => {
            return EditOutcome::failed(path.to_path_buf(), format!("failed to read: {e}"));
        },
    };

    let before = TagSet::parse(&raw, delimiter);
    let after = match request.apply(&before) {
        Ok(after) => after,
        // Patterns were validated up front; an error here is still reported
        // per-file rather than aborting the batch.
        Err(e) => return EditOutcome::failed(path.to_path_buf(), e.to_string()),
    };

    let changed = before != after;
    if changed {
        if let Err(e) = fs::write(path, after.serialize(delimiter)) {
            return EditOutcome::failed(path.to_path_buf(), format!("failed to write: {e}"));
        }
    }

    EditOutcome {
        path: path.to_path_buf(),
        before: before.tags,
        after: after.tags,
        changed,
        error: None,
    }
}
