use anyhow::Result;
use clap::Parser;
use lspy_python::PythonVersion;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::plugin::PyrightPlugin;

#[derive(Debug, Parser)]
pub struct ExtraPaths {
    /// Python version the analysis should target.
    #[arg(long, default_value = "3.8")]
    target: PythonVersion,
}

impl Command for ExtraPaths {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let plugin = PyrightPlugin::new(args.host.to_host(), &lspy_conf::Settings::default());
        for path in plugin.find_package_dependency_dirs(self.target) {
            println!("{path}");
        }
        Ok(Exit::success())
    }
}
