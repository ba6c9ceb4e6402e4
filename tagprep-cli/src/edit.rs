use anyhow::{anyhow, Result};
use std::path::Path;
use tagprep_core::{edit_operation, EditRequest, OutputFormatter};

use crate::cli::args::EditArgs;
use crate::cli::OutputFormatArg;

pub fn handle_edit(
    dir: &Path,
    args: EditArgs,
    delimiter: char,
    case_insensitive: bool,
    output: OutputFormatArg,
) -> Result<()> {
    let request = EditRequest {
        remove: args.remove,
        remove_containing: args.remove_containing,
        append: args.add,
        case_insensitive: args.ignore_case || case_insensitive,
    };

    let result = edit_operation(dir, &request, delimiter)?;
    print!("{}", result.format(output.into()));

    if result.files_failed > 0 {
        return Err(anyhow!("{} tag file(s) failed to update", result.files_failed));
    }
    Ok(())
}
