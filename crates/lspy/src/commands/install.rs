use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::host::Host;
use crate::plugin::PyrightPlugin;

#[derive(Debug, Parser)]
pub struct Install;

impl Command for Install {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let plugin = PyrightPlugin::new(args.host.to_host(), &lspy_conf::Settings::default());
        plugin.install_or_update().with_context(|| {
            format!(
                "Failed to copy resources from {}",
                plugin.host().package_path().join("resources")
            )
        })?;
        Ok(Exit::success())
    }
}
