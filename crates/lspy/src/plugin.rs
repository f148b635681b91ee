//! Lifecycle hooks called by the language-server client framework.

use std::fs;
use std::io;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use lspy_conf::DevEnvironment;
use lspy_conf::ServerSettings;
use lspy_conf::Settings;
use lspy_python::compose_dependency_paths;
use lspy_python::OsFileSystem;
use lspy_python::PythonVersion;
use lspy_python::Resolver;
use lspy_python::WorkspaceFolder;
use walkdir::WalkDir;

use crate::host::Host;

pub struct PyrightPlugin<H> {
    host: H,
    resolver: Resolver,
    deprecated_dev_environment: Option<DevEnvironment>,
}

impl<H: Host> PyrightPlugin<H> {
    pub const NAME: &'static str = "LSP-pyright";

    /// A plugin using real processes and the real filesystem.
    pub fn new(host: H, settings: &Settings) -> Self {
        let resolver = Resolver::system(host.platform(), host.home_dir().as_deref());
        Self::with_resolver(host, resolver, settings.deprecated_dev_environment().cloned())
    }

    pub fn with_resolver(
        host: H,
        resolver: Resolver,
        deprecated_dev_environment: Option<DevEnvironment>,
    ) -> Self {
        Self {
            host,
            resolver,
            deprecated_dev_environment,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Called before the server starts. Writes the interpreter to use into
    /// `python.pythonPath`. Returning `Some` would abort startup with that
    /// message; resolution never does.
    pub fn on_pre_start(
        &self,
        workspace_folders: &[WorkspaceFolder],
        settings: &mut ServerSettings,
    ) -> Option<String> {
        let python_path = self
            .resolver
            .resolve_python_path(settings, workspace_folders)
            .map_or_else(
                || self.host.platform().python_exe().to_string(),
                Utf8PathBuf::into_string,
            );
        tracing::info!("{}: Using python path \"{}\"", Self::NAME, python_path);
        settings.set_python_path(python_path);
        None
    }

    /// Called whenever the merged settings change.
    pub fn on_settings_changed(&self, settings: &mut ServerSettings) {
        let Some(target) = self
            .dev_environment(settings)
            .and_then(|env| self.target_version(&env))
        else {
            return;
        };

        let paths = self.find_package_dependency_dirs(target);
        settings.extend_extra_paths(paths.into_iter().map(Utf8PathBuf::into_string));
    }

    /// Called before the first start and whenever the plugin is upgraded.
    pub fn install_or_update(&self) -> io::Result<()> {
        let src = self.host.package_path().join("resources");
        let dest = self.host.package_storage().join("resources");
        tracing::debug!("Copying {} to {}", src, dest);
        copy_tree(&src, &dest)
    }

    /// The deprecated top-level setting wins over `pyright.dev_environment`.
    fn dev_environment(&self, settings: &ServerSettings) -> Option<DevEnvironment> {
        if let Some(env) = &self.deprecated_dev_environment {
            tracing::warn!(
                "[{}] \"dev_environment\" setting has been deprecated and will be removed in the future. \
                 Please use \"pyright.dev_environment\", which is under \"settings\" instead.",
                Self::NAME
            );
            return Some(env.clone());
        }
        settings.dev_environment().cloned()
    }

    fn target_version(&self, env: &DevEnvironment) -> Option<PythonVersion> {
        match env {
            DevEnvironment::SublimeText => Some(self.host.python_version()),
            DevEnvironment::SublimeText33 => Some(PythonVersion::PY33),
            DevEnvironment::SublimeText38 => Some(PythonVersion::PY38),
            DevEnvironment::Other(_) => None,
        }
    }

    /// Existing directories holding the editor's bundled packages, laid out
    /// for `target`.
    #[must_use]
    pub fn find_package_dependency_dirs(&self, target: PythonVersion) -> Vec<Utf8PathBuf> {
        compose_dependency_paths(
            &self.host.sys_path(),
            target,
            &self.host.packages_path(),
            &self.host.typings_dir(),
            &OsFileSystem,
        )
    }
}

/// Recursively copy `src` into `dest`, overwriting files that already exist.
/// Symlinks are followed, so linked directories are copied as directories.
fn copy_tree(src: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        let target = dest.as_std_path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
