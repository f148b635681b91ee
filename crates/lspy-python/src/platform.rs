use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use camino::Utf8PathBuf;

/// Operating system family, as far as venv layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Bare interpreter name, resolved through `PATH` by whoever runs it.
    #[must_use]
    pub const fn python_exe(self) -> &'static str {
        match self {
            Platform::Posix => "python",
            Platform::Windows => "python.exe",
        }
    }

    /// Interpreter binary inside an environment root.
    #[must_use]
    pub fn interpreter_in(self, root: &Utf8Path) -> Utf8PathBuf {
        match self {
            Platform::Posix => root.join("bin").join(self.python_exe()),
            Platform::Windows => root.join("Scripts").join(self.python_exe()),
        }
    }
}

/// A `major.minor` Python version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    pub const PY33: Self = Self::new(3, 3);
    pub const PY38: Self = Self::new(3, 8);

    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid Python version `{0}`, expected MAJOR.MINOR")]
pub struct ParseVersionError(String);

impl FromStr for PythonVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| ParseVersionError(s.to_string()))?;
        let major = major.parse().map_err(|_| ParseVersionError(s.to_string()))?;
        let minor = minor.parse().map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Self::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpreter_in_posix() {
        assert_eq!(
            Platform::Posix.interpreter_in(Utf8Path::new("/proj/.venv")),
            Utf8PathBuf::from("/proj/.venv/bin/python")
        );
    }

    #[test]
    fn test_interpreter_in_windows() {
        let path = Platform::Windows.interpreter_in(Utf8Path::new("proj"));
        assert_eq!(path.file_name(), Some("python.exe"));
        assert_eq!(
            path.parent().and_then(Utf8Path::file_name),
            Some("Scripts")
        );
    }

    #[test]
    fn test_parse_version() {
        assert_eq!("3.8".parse::<PythonVersion>().unwrap(), PythonVersion::PY38);
        assert_eq!(
            "3.11".parse::<PythonVersion>().unwrap(),
            PythonVersion::new(3, 11)
        );
        assert!("3".parse::<PythonVersion>().is_err());
        assert!("three.eight".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_display_version() {
        assert_eq!(PythonVersion::PY33.to_string(), "3.3");
    }
}
