use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormatArg;

/// Pairing, tag cleanup and sequential renaming for image/tag datasets
#[derive(Parser, Debug)]
#[command(name = "tagprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,
}

/// Common tag edit arguments shared by `edit` and `run`
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Tags to delete by exact match (repeatable)
    #[arg(long = "remove", value_name = "TAG")]
    pub remove: Vec<String>,

    /// Delete every tag containing this substring, case-insensitive
    /// (repeatable)
    #[arg(long = "remove-containing", value_name = "SUBSTRING")]
    pub remove_containing: Vec<String>,

    /// Tags to append when not already present (repeatable)
    #[arg(long = "add", value_name = "TAG")]
    pub add: Vec<String>,

    /// Match exact deletes case-insensitively
    #[arg(long)]
    pub ignore_case: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a dataset directory and report pairs, orphans and conflicts
    Scan {
        /// Dataset directory
        dir: PathBuf,

        /// Recognized image extensions, comma separated, without dots
        #[arg(long, value_delimiter = ',', value_name = "EXT")]
        extensions: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormatArg,
    },

    /// Bulk-edit tag files: delete, fuzzy-delete and append tags
    Edit {
        /// Dataset directory
        dir: PathBuf,

        #[command(flatten)]
        edits: EditArgs,

        /// Tag delimiter inside tag files
        #[arg(long, value_name = "CHAR")]
        delimiter: Option<char>,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormatArg,
    },

    /// Renumber image/tag pairs into a dense sequence
    Rename {
        /// Dataset directory
        dir: PathBuf,

        /// First index of the sequence
        #[arg(long, value_name = "N")]
        start_index: Option<usize>,

        /// Recognized image extensions, comma separated, without dots
        #[arg(long, value_delimiter = ',', value_name = "EXT")]
        extensions: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormatArg,
    },

    /// Run the full pipeline: quarantine, edit, normalize, rename
    Run {
        /// Dataset directory
        dir: PathBuf,

        #[command(flatten)]
        edits: EditArgs,

        /// First index of the sequence
        #[arg(long, value_name = "N")]
        start_index: Option<usize>,

        /// Recognized image extensions, comma separated, without dots
        #[arg(long, value_delimiter = ',', value_name = "EXT")]
        extensions: Vec<String>,

        /// Tag delimiter inside tag files
        #[arg(long, value_name = "CHAR")]
        delimiter: Option<char>,

        /// Leave orphaned files in place instead of moving them to the
        /// quarantine folder
        #[arg(long)]
        no_quarantine: bool,

        /// Skip the stylistic tag pass (separator replacement, paren
        /// escaping)
        #[arg(long)]
        no_standardize: bool,

        /// Append timestamped progress lines to this file
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormatArg,
    },

    /// Print version information
    Version {
        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormatArg,
    },
}
