use anyhow::Result;
use std::path::Path;
use tagprep_core::{scan_operation, OutputFormatter};

use crate::cli::OutputFormatArg;

pub fn handle_scan(
    dir: &Path,
    extensions: Option<Vec<String>>,
    output: OutputFormatArg,
) -> Result<()> {
    let result = scan_operation(dir, extensions)?;
    print!("{}", result.format(output.into()));
    Ok(())
}
