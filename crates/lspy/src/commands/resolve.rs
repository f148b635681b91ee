use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use crate::args::Args;
use crate::commands::load_settings;
use crate::commands::workspace_folders;
use crate::commands::Command;
use crate::exit::Exit;
use crate::plugin::PyrightPlugin;

#[derive(Debug, Parser)]
pub struct Resolve {
    /// Workspace folders, first one first. Defaults to the current directory.
    #[arg(long = "folder")]
    folders: Vec<Utf8PathBuf>,

    /// Interpreter override; skips all discovery.
    #[arg(long)]
    python_path: Option<String>,

    /// Exit with an error instead of falling back to the bare interpreter name.
    #[arg(long)]
    no_fallback: bool,

    /// Only look for a `venv` folder walking up from each workspace folder.
    #[arg(long)]
    walk_only: bool,
}

impl Command for Resolve {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let folders = workspace_folders(&self.folders)?;
        let settings = load_settings(&folders)?;
        let mut server = settings.server_settings().clone();
        if let Some(python_path) = &self.python_path {
            server.set_python_path(python_path.as_str());
        }

        let plugin = PyrightPlugin::new(args.host.to_host(), &settings);

        if self.walk_only || self.no_fallback {
            let resolver = plugin.resolver();
            let resolved = if self.walk_only {
                resolver.resolve_virtualenv(&server, &folders)
            } else {
                resolver.resolve_python_path(&server, &folders)
            };
            return Ok(match resolved {
                Some(path) => {
                    println!("{path}");
                    Exit::success()
                }
                None if self.no_fallback => {
                    Exit::error().with_message("No Python interpreter found.")
                }
                None => {
                    println!("{}", resolver.platform().python_exe());
                    Exit::success()
                }
            });
        }

        if let Some(message) = plugin.on_pre_start(&folders, &mut server) {
            return Ok(Exit::error().with_message(message));
        }
        if let Some(path) = server.python_path() {
            println!("{path}");
        }
        Ok(Exit::success())
    }
}
