use anyhow::{anyhow, Result};
use std::path::Path;
use tagprep_core::{rename_operation, OutputFormatter};

use crate::cli::OutputFormatArg;

pub fn handle_rename(
    dir: &Path,
    extensions: Option<Vec<String>>,
    start_index: usize,
    output: OutputFormatArg,
) -> Result<()> {
    let result = rename_operation(dir, extensions, start_index)?;
    print!("{}", result.format(output.into()));

    if let Some(ref conflict) = result.conflict {
        return Err(anyhow!("rename conflict: {} already exists", conflict.display()));
    }
    if !result.errors.is_empty() {
        return Err(anyhow!("{} pair(s) failed to rename", result.errors.len()));
    }
    Ok(())
}
