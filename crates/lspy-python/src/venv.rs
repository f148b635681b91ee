use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::platform::Platform;
use crate::system::FileSystem;

/// Marker file present in every PEP 405 virtual environment root.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Subfolder names checked before any other child of a workspace folder.
pub const CONVENTIONAL_VENV_DIRS: &[&str] = &["venv", ".venv"];

/// Folder name looked for in each ancestor during an upward walk.
pub const WALK_VENV_DIR: &str = "venv";

/// A dependency manager that knows where a project's interpreter lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenvRule {
    /// File in the workspace folder that signals the tool is in use.
    pub marker: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub post_process: PostProcess,
}

/// What to do with the tool's trimmed stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// The output is already an interpreter path.
    None,
    /// The output is an environment root; the interpreter binary inside it
    /// must exist as a file.
    InterpreterFromEnvRoot,
}

/// Checked in order; the first rule whose marker exists and whose command
/// yields a path wins.
pub const VENV_RULES: &[VenvRule] = &[
    VenvRule {
        marker: "Pipfile",
        program: "pipenv",
        args: &["--py"],
        post_process: PostProcess::None,
    },
    VenvRule {
        marker: "poetry.lock",
        program: "poetry",
        args: &["env", "info", "-p"],
        post_process: PostProcess::InterpreterFromEnvRoot,
    },
    VenvRule {
        marker: ".python-version",
        program: "pyenv",
        args: &["which", "python"],
        post_process: PostProcess::None,
    },
];

impl PostProcess {
    pub fn apply(
        self,
        output: &str,
        fs: &dyn FileSystem,
        platform: Platform,
    ) -> Option<Utf8PathBuf> {
        match self {
            PostProcess::None => Some(Utf8PathBuf::from(output)),
            PostProcess::InterpreterFromEnvRoot => {
                interpreter_from_env_root(Utf8Path::new(output), fs, platform)
            }
        }
    }
}

/// The interpreter binary under `root`, if it is a file.
pub fn interpreter_from_env_root(
    root: &Utf8Path,
    fs: &dyn FileSystem,
    platform: Platform,
) -> Option<Utf8PathBuf> {
    let binary = platform.interpreter_in(root);
    fs.is_file(&binary).then_some(binary)
}

/// The interpreter of the virtual environment rooted at `root`.
///
/// `root` counts as a venv only when it holds [`PYVENV_CFG`] and the
/// platform's interpreter binary.
pub fn interpreter_in_venv(
    root: &Utf8Path,
    fs: &dyn FileSystem,
    platform: Platform,
) -> Option<Utf8PathBuf> {
    if !fs.is_file(&root.join(PYVENV_CFG)) {
        return None;
    }
    interpreter_from_env_root(root, fs, platform)
}
