mod extra_paths;
mod install;
mod resolve;
mod settings;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Subcommand;
use lspy_python::WorkspaceFolder;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum LspyCommand {
    /// Print the Python interpreter the language server would use
    Resolve(self::resolve::Resolve),
    /// Print the settings that would be forwarded to the language server
    Settings(self::settings::PrintSettings),
    /// Print the editor package directories exposed as extra analysis paths
    ExtraPaths(self::extra_paths::ExtraPaths),
    /// Copy bundled resources into plugin storage
    Install(self::install::Install),
}

impl Command for LspyCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            LspyCommand::Resolve(cmd) => cmd.execute(args),
            LspyCommand::Settings(cmd) => cmd.execute(args),
            LspyCommand::ExtraPaths(cmd) => cmd.execute(args),
            LspyCommand::Install(cmd) => cmd.execute(args),
        }
    }
}

/// Workspace folders from the command line, or the current directory.
/// Relative paths are made absolute against the current directory.
fn workspace_folders(paths: &[Utf8PathBuf]) -> Result<Vec<WorkspaceFolder>> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| anyhow::anyhow!("Current directory is not UTF-8: {}", path.display()))?;

    if paths.is_empty() {
        return Ok(vec![WorkspaceFolder::from_path(cwd)]);
    }

    Ok(paths
        .iter()
        .map(|path| WorkspaceFolder::from_path(lspy_python::system::normalize_path(&cwd.join(path))))
        .collect())
}

/// Plugin settings for the first workspace folder.
fn load_settings(folders: &[WorkspaceFolder]) -> Result<lspy_conf::Settings> {
    let Some(first) = folders.first() else {
        return Ok(lspy_conf::Settings::default());
    };
    lspy_conf::Settings::new(&first.path).context("Failed to load settings")
}
