//! Settings forwarded to the language server.
//!
//! Only the handful of keys the plugin reads or writes are typed. Everything
//! else is kept in pass-through maps so the server receives exactly what the
//! user configured.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// The server-facing settings object.
///
/// Example configuration:
/// ```toml
/// [settings.python]
/// pythonPath = "/usr/bin/python3"
///
/// [settings.python.analysis]
/// extraPaths = ["./vendor"]
/// typeCheckingMode = "strict"
///
/// [settings.pyright]
/// dev_environment = "sublime_text_38"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(skip_serializing_if = "PythonSettings::is_empty")]
    pub python: PythonSettings,
    #[serde(skip_serializing_if = "PyrightSettings::is_empty")]
    pub pyright: PyrightSettings,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The `python.*` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonSettings {
    /// Interpreter override. Written back with the resolved interpreter
    /// before the server starts.
    #[serde(rename = "pythonPath", skip_serializing_if = "Option::is_none")]
    pub python_path: Option<String>,
    #[serde(skip_serializing_if = "AnalysisSettings::is_empty")]
    pub analysis: AnalysisSettings,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The `python.analysis.*` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    #[serde(rename = "extraPaths", skip_serializing_if = "Vec::is_empty")]
    pub extra_paths: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The `pyright.*` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyrightSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_environment: Option<DevEnvironment>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Development environment mode.
///
/// The `sublime_text*` variants make the plugin expose the editor's own
/// package dependencies to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevEnvironment {
    #[serde(rename = "sublime_text")]
    SublimeText,
    #[serde(rename = "sublime_text_33")]
    SublimeText33,
    #[serde(rename = "sublime_text_38")]
    SublimeText38,
    /// Any value we don't know about; kept so it round-trips to the server.
    #[serde(untagged)]
    Other(String),
}

impl PythonSettings {
    fn is_empty(&self) -> bool {
        self.python_path.is_none() && self.analysis.is_empty() && self.other.is_empty()
    }
}

impl AnalysisSettings {
    fn is_empty(&self) -> bool {
        self.extra_paths.is_empty() && self.other.is_empty()
    }
}

impl PyrightSettings {
    fn is_empty(&self) -> bool {
        self.dev_environment.is_none() && self.other.is_empty()
    }
}

impl ServerSettings {
    /// Non-empty interpreter override, if any.
    #[must_use]
    pub fn python_path(&self) -> Option<&str> {
        self.python
            .python_path
            .as_deref()
            .filter(|path| !path.is_empty())
    }

    pub fn set_python_path(&mut self, path: impl Into<String>) {
        self.python.python_path = Some(path.into());
    }

    #[must_use]
    pub fn dev_environment(&self) -> Option<&DevEnvironment> {
        self.pyright.dev_environment.as_ref()
    }

    #[must_use]
    pub fn extra_paths(&self) -> &[String] {
        &self.python.analysis.extra_paths
    }

    pub fn extend_extra_paths(&mut self, paths: impl IntoIterator<Item = String>) {
        self.python.analysis.extra_paths.extend(paths);
    }
}
