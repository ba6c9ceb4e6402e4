use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image extensions recognized when no explicit list is configured.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Tag files always carry this extension.
pub const TAG_EXTENSION: &str = "txt";

/// File classification, decided purely by extension membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Tag,
    Other,
}

/// A single scanned file. Re-derived on every scan; nothing is persisted
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    /// File name without its extension, the pairing key.
    pub base_name: String,
    /// Extension without the dot, lowercased.
    pub extension: String,
    pub kind: FileKind,
}

/// One image file and one tag file sharing a base name in the same
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub base_name: String,
    pub image: FileEntry,
    pub tag: FileEntry,
}

/// A base name carrying two or more files of the same kind (e.g. `1.jpg`
/// and `1.jpeg`). No pair is formed; the whole group is surfaced so the
/// caller can resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub base_name: String,
    pub entries: Vec<FileEntry>,
}

/// Result of a directory scan. Every regular file in the directory lands in
/// exactly one of `pairs` (as one half), `orphans`, `conflicts`, or
/// `skipped`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub pairs: Vec<Pair>,
    pub orphans: Vec<FileEntry>,
    pub conflicts: Vec<Conflict>,
    /// Files that are neither images nor tag files.
    pub skipped: Vec<FileEntry>,
}

impl ScanReport {
    /// Total number of files accounted for by this report.
    pub fn total_files(&self) -> usize {
        self.pairs.len() * 2
            + self.orphans.len()
            + self.conflicts.iter().map(|c| c.entries.len()).sum::<usize>()
            + self.skipped.len()
    }
}

/// Classify a file by its extension. Extension matching is ASCII
/// case-insensitive; the pairing key (base name) is matched exactly.
pub fn classify(path: &Path, image_extensions: &[String]) -> FileEntry {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let kind = if extension == TAG_EXTENSION {
        FileKind::Tag
    } else if image_extensions.iter().any(|e| *e == extension) {
        FileKind::Image
    } else {
        FileKind::Other
    };

    FileEntry {
        path: path.to_path_buf(),
        base_name,
        extension,
        kind,
    }
}

/// Scan a dataset directory and group its files into pairs, orphans and
/// conflicts. Read-only; subdirectories (quarantine folder, `.tagprep/`)
/// are ignored.
pub fn scan_directory(dir: &Path, image_extensions: &[String]) -> Result<ScanReport> {
    if !dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
    }

    // BTreeMap keeps group iteration deterministic across platforms.
    let mut groups: BTreeMap<String, Vec<FileEntry>> = BTreeMap::new();
    let mut report = ScanReport::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file = classify(entry.path(), image_extensions);
        match file.kind {
            FileKind::Other => report.skipped.push(file),
            FileKind::Image | FileKind::Tag => {
                groups.entry(file.base_name.clone()).or_default().push(file);
            },
        }
    }

    for (base_name, entries) in groups {
        let images: Vec<&FileEntry> = entries.iter().filter(|e| e.kind == FileKind::Image).collect();
        let tags: Vec<&FileEntry> = entries.iter().filter(|e| e.kind == FileKind::Tag).collect();

        if images.len() > 1 || tags.len() > 1 {
            report.conflicts.push(Conflict { base_name, entries });
        } else {
            match (images.first(), tags.first()) {
                (Some(image), Some(tag)) => report.pairs.push(Pair {
                    base_name,
                    image: (*image).clone(),
                    tag: (*tag).clone(),
                }),
                _ => report.orphans.extend(entries),
            }
        }
    }

    Ok(report)
}

/// The default image extension list as owned strings, for option plumbing.
pub fn default_image_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn scan(dir: &Path) -> ScanReport {
        scan_directory(dir, &default_image_extensions()).unwrap()
    }

    #[test]
    fn test_missing_directory_fails() {
        let result = scan_directory(Path::new("/no/such/dataset"), &default_image_extensions());
        assert!(matches!(result, Err(PipelineError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_pairs_and_orphans() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "catA.jpg");
        touch(temp.path(), "catA.txt");
        touch(temp.path(), "catB.png");
        touch(temp.path(), "catB.txt");
        touch(temp.path(), "catC.jpg"); // image orphan
        touch(temp.path(), "catD.txt"); // tag orphan

        let report = scan(temp.path());
        assert_eq!(report.pairs.len(), 2);
        assert_eq!(report.orphans.len(), 2);
        assert!(report.conflicts.is_empty());

        let bases: Vec<&str> = report.pairs.iter().map(|p| p.base_name.as_str()).collect();
        assert_eq!(bases, vec!["catA", "catB"]);
    }

    #[test]
    fn test_same_kind_collision_is_a_conflict() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "1.jpg");
        touch(temp.path(), "1.jpeg");
        touch(temp.path(), "1.txt");

        let report = scan(temp.path());
        assert!(report.pairs.is_empty());
        assert!(report.orphans.is_empty());
        assert_eq!(report.conflicts.len(), 1);
        // The tag file travels with its conflicted base name.
        assert_eq!(report.conflicts[0].entries.len(), 3);
    }

    #[test]
    fn test_other_files_are_skipped_not_dropped() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "a.txt");
        touch(temp.path(), "notes.json");
        touch(temp.path(), "README");

        let report = scan(temp.path());
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.total_files(), 4);
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "shot.JPG");
        touch(temp.path(), "shot.txt");

        let report = scan(temp.path());
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].image.extension, "jpg");
    }

    #[test]
    fn test_base_name_matching_is_exact() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Cat.jpg");
        touch(temp.path(), "cat.txt");

        let report = scan(temp.path());
        assert!(report.pairs.is_empty());
        assert_eq!(report.orphans.len(), 2);
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "a.txt");
        fs::create_dir(temp.path().join("unpaired")).unwrap();
        touch(&temp.path().join("unpaired"), "old.jpg");

        let report = scan(temp.path());
        assert_eq!(report.total_files(), 2);
    }

    #[test]
    fn test_completeness_over_a_mixed_directory() {
        let temp = TempDir::new().unwrap();
        let names = [
            "a.jpg", "a.txt", "b.png", "b.txt", "c.webp", "d.txt", "e.jpg", "e.jpeg", "e.txt",
            "meta.json",
        ];
        for name in names {
            touch(temp.path(), name);
        }

        let report = scan(temp.path());
        assert_eq!(report.total_files(), names.len());
        assert_eq!(report.pairs.len(), 2); // a, b
        assert_eq!(report.orphans.len(), 2); // c.webp, d.txt
        assert_eq!(report.conflicts.len(), 1); // e.*
        assert_eq!(report.skipped.len(), 1); // meta.json
    }
}
