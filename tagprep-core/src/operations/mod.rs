//! High-level operations that correspond to CLI commands
//!
//! These modules contain the core business logic for each tagprep
//! operation, separated from CLI concerns like argument parsing and output
//! formatting.

pub mod edit;
pub mod rename;
pub mod run;
pub mod scan;

// Re-export the main operation functions for easy access
pub use edit::edit_operation;
pub use rename::rename_operation;
pub use run::run_operation;
pub use scan::scan_operation;
