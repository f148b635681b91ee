use camino::Utf8PathBuf;
use clap::Parser;
use lspy_python::Platform;
use lspy_python::PythonVersion;

use crate::host::ProcessHost;

#[derive(Parser)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use verbose output.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Also write logs to a daily-rotated file in the cache directory.
    #[arg(global = true, long)]
    pub log_file: bool,
}

/// Stand-ins for what the editor would report about itself.
#[derive(Parser, Debug, Clone)]
pub struct HostArgs {
    /// Version of the editor's embedded Python.
    #[arg(global = true, long, default_value = "3.8")]
    pub host_python: PythonVersion,

    /// Module search path of the editor's Python. Defaults to `PYTHONPATH`.
    #[arg(global = true, long = "sys-path")]
    pub sys_path: Vec<Utf8PathBuf>,

    /// Directory the editor installs plugins into.
    #[arg(global = true, long)]
    pub packages_path: Option<Utf8PathBuf>,

    /// Writable plugin storage directory.
    #[arg(global = true, long)]
    pub storage_path: Option<Utf8PathBuf>,
}

impl HostArgs {
    #[must_use]
    pub fn to_host(&self) -> ProcessHost {
        let data_dir = ProcessHost::default_data_dir();
        let packages_path = self
            .packages_path
            .clone()
            .unwrap_or_else(|| data_dir.join("Packages"));
        let package_storage = self
            .storage_path
            .clone()
            .unwrap_or_else(|| data_dir.join("Package Storage").join("LSP-pyright"));
        let sys_path = if self.sys_path.is_empty() {
            ProcessHost::sys_path_from_env()
        } else {
            self.sys_path.clone()
        };

        ProcessHost {
            platform: Platform::current(),
            home_dir: ProcessHost::home_from_env(),
            python_version: self.host_python,
            sys_path,
            package_path: packages_path.join("LSP-pyright"),
            packages_path,
            package_storage,
        }
    }
}
