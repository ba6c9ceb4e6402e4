use anyhow::{Context, Result};
use clap::Parser;
use tagprep_core::{Config, OutputFormatter, VersionResult};
use std::process;

mod cli;
mod edit;
mod rename;
mod run;
mod scan;

use cli::{Cli, Commands, OutputFormatArg};

fn main() {
    let cli = Cli::parse();

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        if let Err(e) = std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
        {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }

    // Load config to get defaults
    let config = Config::load().unwrap_or_default();

    let result = match cli.command {
        Commands::Scan {
            dir,
            extensions,
            output,
        } => scan::handle_scan(&dir, resolve_extensions(extensions, &config), output),

        Commands::Edit {
            dir,
            edits,
            delimiter,
            output,
        } => edit::handle_edit(
            &dir,
            edits,
            delimiter.unwrap_or(config.defaults.delimiter),
            config.defaults.case_insensitive,
            output,
        ),

        Commands::Rename {
            dir,
            start_index,
            extensions,
            output,
        } => rename::handle_rename(
            &dir,
            resolve_extensions(extensions, &config),
            start_index.unwrap_or(config.defaults.start_index),
            output,
        ),

        Commands::Run {
            dir,
            edits,
            start_index,
            extensions,
            delimiter,
            no_quarantine,
            no_standardize,
            log_file,
            output,
        } => run::handle_run(
            &dir,
            edits,
            start_index.unwrap_or(config.defaults.start_index),
            resolve_extensions(extensions, &config),
            delimiter.unwrap_or(config.defaults.delimiter),
            no_quarantine || !config.defaults.quarantine_orphans,
            no_standardize || !config.defaults.standardize,
            config.defaults.case_insensitive,
            log_file,
            output,
        ),

        Commands::Version { output } => handle_version(output),
    };

    match result {
        Ok(()) => {},
        Err(e) => {
            // The alternate format prints the whole context chain.
            let message = format!("{e:#}");
            eprintln!("Error: {message}");

            // Failed operation results exit 1; bad arguments or a bad
            // environment exit 2.
            let exit_code = if message.contains("not found") || message.contains("invalid") {
                2
            } else {
                1
            };

            process::exit(exit_code);
        },
    }
}

/// Extensions from the command line win over config; an empty list means
/// "use the built-in defaults".
fn resolve_extensions(args: Vec<String>, config: &Config) -> Option<Vec<String>> {
    if args.is_empty() {
        Some(config.defaults.image_extensions.clone())
    } else {
        Some(args)
    }
}

fn handle_version(output: OutputFormatArg) -> Result<()> {
    let version_result = VersionResult {
        name: "tagprep".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
    Ok(())
}
