//! What the plugin needs from the editor hosting it.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use lspy_python::Platform;
use lspy_python::PythonVersion;

pub trait Host {
    fn platform(&self) -> Platform;

    /// The user's home directory; upward venv searches never pass it.
    fn home_dir(&self) -> Option<Utf8PathBuf>;

    /// Version of the interpreter embedded in the editor.
    fn python_version(&self) -> PythonVersion;

    /// The embedded interpreter's module search path.
    fn sys_path(&self) -> Vec<Utf8PathBuf>;

    /// Root directory under which the editor installs plugins.
    fn packages_path(&self) -> Utf8PathBuf;

    /// This plugin's installed package directory.
    fn package_path(&self) -> Utf8PathBuf;

    /// Writable per-plugin storage.
    fn package_storage(&self) -> Utf8PathBuf;

    /// Bundled type stubs for the editor's scripting API.
    fn typings_dir(&self) -> Utf8PathBuf {
        self.package_storage()
            .join("resources")
            .join("typings")
            .join("sublime_text")
    }
}

/// A [`Host`] assembled from command-line flags and the environment.
#[derive(Debug, Clone)]
pub struct ProcessHost {
    pub platform: Platform,
    pub home_dir: Option<Utf8PathBuf>,
    pub python_version: PythonVersion,
    pub sys_path: Vec<Utf8PathBuf>,
    pub packages_path: Utf8PathBuf,
    pub package_path: Utf8PathBuf,
    pub package_storage: Utf8PathBuf,
}

impl ProcessHost {
    /// `PYTHONPATH` split with the platform's separator.
    #[must_use]
    pub fn sys_path_from_env() -> Vec<Utf8PathBuf> {
        std::env::var_os("PYTHONPATH")
            .map(|value| {
                std::env::split_paths(&value)
                    .filter_map(|path| Utf8PathBuf::from_path_buf(path).ok())
                    .filter(|path| !path.as_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn home_from_env() -> Option<Utf8PathBuf> {
        directories::BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok())
    }

    /// Default root for packages and storage when none is given.
    #[must_use]
    pub fn default_data_dir() -> Utf8PathBuf {
        lspy_conf::project_dirs()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf()).ok())
            .unwrap_or_else(|| Utf8Path::new(".").join("lspy"))
    }
}

impl Host for ProcessHost {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn home_dir(&self) -> Option<Utf8PathBuf> {
        self.home_dir.clone()
    }

    fn python_version(&self) -> PythonVersion {
        self.python_version
    }

    fn sys_path(&self) -> Vec<Utf8PathBuf> {
        self.sys_path.clone()
    }

    fn packages_path(&self) -> Utf8PathBuf {
        self.packages_path.clone()
    }

    fn package_path(&self) -> Utf8PathBuf {
        self.package_path.clone()
    }

    fn package_storage(&self) -> Utf8PathBuf {
        self.package_storage.clone()
    }
}
