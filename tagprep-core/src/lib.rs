#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod edit;
pub mod error;
pub mod lock;
pub mod operations;
pub mod output;
pub mod pipeline;
pub mod rename;
pub mod scanner;
pub mod tags;

pub use config::Config;
pub use edit::{append, edit_directory, remove_containing, remove_exact, EditOutcome, EditRequest};
pub use error::PipelineError;
pub use lock::LockFile;
pub use operations::{edit_operation, rename_operation, run_operation, scan_operation};
pub use output::{
    EditResult, OutputFormat, OutputFormatter, RenameOpResult, RunResult, ScanResult,
    VersionResult,
};
pub use pipeline::{
    quarantine_orphans, run_full_pipeline, PipelineOptions, PipelineStage, PipelineSummary,
    QUARANTINE_DIR,
};
pub use rename::{apply_plan, plan_renames, PlannedRename, RenamePlan, RenameReport, RenamedFile};
pub use scanner::{
    classify, default_image_extensions, scan_directory, Conflict, FileEntry, FileKind, Pair,
    ScanReport, DEFAULT_IMAGE_EXTENSIONS, TAG_EXTENSION,
};
pub use tags::{normalize, TagSet, DEFAULT_DELIMITER};
