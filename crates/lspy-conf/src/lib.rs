pub mod server;

use std::fs;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::server::AnalysisSettings;
pub use crate::server::DevEnvironment;
pub use crate::server::PyrightSettings;
pub use crate::server::PythonSettings;
pub use crate::server::ServerSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
}

#[must_use]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lspy")
}

/// Path of the user-level configuration file.
#[must_use]
pub fn user_config_file() -> Option<Utf8PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("lspy.toml"))
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

/// Plugin settings.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Deprecated top-level spelling of `settings.pyright.dev_environment`.
    dev_environment: Option<DevEnvironment>,
    /// Settings forwarded to the language server.
    settings: ServerSettings,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        Self::load_from_paths(project_root, user_config_file().as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let full_toml_value: toml::Value = toml::from_str(&content)?;

            let lspy_table = ["tool", "lspy"]
                .iter()
                .try_fold(&full_toml_value, |current_val, &key| current_val.get(key))
                .and_then(toml::Value::as_table);

            if let Some(table) = lspy_table {
                let lspy_toml_string = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&lspy_toml_string, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            File::from(project_root.join(".lspy.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("lspy.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }

    #[must_use]
    pub fn deprecated_dev_environment(&self) -> Option<&DevEnvironment> {
        self.dev_environment.as_ref()
    }

    #[must_use]
    pub fn server_settings(&self) -> &ServerSettings {
        &self.settings
    }

    #[must_use]
    pub fn into_server_settings(self) -> ServerSettings {
        self.settings
    }
}
