use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::LspyCommand;
use crate::logging;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "lspy")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: LspyCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let _guard = logging::init_tracing(&cli.args.global);

    let exit = cli.command.execute(&cli.args)?;
    if let Some(message) = exit.message() {
        if !cli.args.global.quiet {
            eprintln!("{message}");
        }
    }
    Ok(exit.code())
}
