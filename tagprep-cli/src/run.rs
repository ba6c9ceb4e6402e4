use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tagprep_core::{run_operation, EditRequest, OutputFormatter, PipelineOptions};

use crate::cli::args::EditArgs;
use crate::cli::OutputFormatArg;

#[allow(clippy::too_many_arguments)]
pub fn handle_run(
    dir: &Path,
    edits: EditArgs,
    start_index: usize,
    extensions: Option<Vec<String>>,
    delimiter: char,
    no_quarantine: bool,
    no_standardize: bool,
    case_insensitive: bool,
    log_file: Option<PathBuf>,
    output: OutputFormatArg,
) -> Result<()> {
    let request = EditRequest {
        remove: edits.remove,
        remove_containing: edits.remove_containing,
        append: edits.add,
        case_insensitive: edits.ignore_case,
    };
    let edit_stages = if request.is_empty() {
        Vec::new()
    } else {
        vec![request]
    };

    let options = PipelineOptions {
        delimiter,
        case_insensitive,
        start_index,
        image_extensions: extensions.unwrap_or_else(tagprep_core::default_image_extensions),
        quarantine_orphans: !no_quarantine,
        standardize: !no_standardize,
        edits: edit_stages,
        log_file,
    };

    let result = run_operation(dir, &options)?;
    print!("{}", result.format(output.into()));

    if !result.summary.is_success() {
        let reason = result
            .summary
            .failure
            .clone()
            .unwrap_or_else(|| "pipeline failed".to_string());
        return Err(anyhow!(reason));
    }
    Ok(())
}
