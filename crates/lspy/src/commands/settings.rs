use anyhow::Context;
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
pub struct PrintSettings {
    /// Workspace folders, first one first. Defaults to the current directory.
    #[arg(long = "folder")]
    folders: Vec<Utf8PathBuf>,
}

impl Command for PrintSettings {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let folders = workspace_folders(&self.folders)?;
        let settings = load_settings(&folders)?;
        let plugin = PyrightPlugin::new(args.host.to_host(), &settings);

        let mut server = settings.into_server_settings();
        if let Some(message) = plugin.on_pre_start(&folders, &mut server) {
            return Ok(Exit::error().with_message(message));
        }
        plugin.on_settings_changed(&mut server);

        let json = serde_json::to_string_pretty(&server).context("Failed to serialize settings")?;
        println!("{json}");
        Ok(Exit::success())
    }
}
