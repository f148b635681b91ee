//! Python interpreter resolution for a set of workspace folders.

use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use lspy_conf::ServerSettings;

use crate::command::display_command;
use crate::command::CommandError;
use crate::command::CommandRunner;
use crate::command::SystemCommandRunner;
use crate::platform::Platform;
use crate::roots::ProjectRoots;
use crate::system::normalize_path;
use crate::system::FileSystem;
use crate::system::OsFileSystem;
use crate::venv::interpreter_in_venv;
use crate::venv::CONVENTIONAL_VENV_DIRS;
use crate::venv::VENV_RULES;
use crate::venv::WALK_VENV_DIR;

/// One root of the open project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub name: String,
    pub path: Utf8PathBuf,
}

impl WorkspaceFolder {
    /// A folder named after the last component of `path`.
    #[must_use]
    pub fn from_path(path: Utf8PathBuf) -> Self {
        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        Self { name, path }
    }
}

/// Finds the interpreter a project should be analyzed with.
///
/// Owns the project-root cache, so a resolver should live as long as the
/// session it serves.
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    roots: ProjectRoots,
}

impl Resolver {
    #[must_use]
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        platform: Platform,
        home: Option<&Utf8Path>,
    ) -> Self {
        let roots = ProjectRoots::new(fs.clone(), home);
        Self {
            fs,
            runner,
            platform,
            roots,
        }
    }

    /// A resolver backed by the real filesystem and real child processes.
    #[must_use]
    pub fn system(platform: Platform, home: Option<&Utf8Path>) -> Self {
        Self::new(
            Arc::new(OsFileSystem),
            Arc::new(SystemCommandRunner),
            platform,
            home,
        )
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn roots(&self) -> &ProjectRoots {
        &self.roots
    }

    /// Resolve the interpreter for `folders`.
    ///
    /// In priority order:
    /// 1. a non-empty `python.pythonPath` setting, verbatim
    /// 2. the first dependency manager in [`VENV_RULES`] whose marker file
    ///    is in the first folder and whose command reports a path
    /// 3. `venv`, `.venv`, then any other child of the first folder that is
    ///    a virtual environment
    /// 4. a `venv` folder found walking up from each folder
    ///
    /// `None` means the caller should fall back to the bare interpreter name.
    pub fn resolve_python_path(
        &self,
        settings: &ServerSettings,
        folders: &[WorkspaceFolder],
    ) -> Option<Utf8PathBuf> {
        if let Some(python_path) = settings.python_path() {
            return Some(Utf8PathBuf::from(python_path));
        }

        let first = folders.first()?;
        let folder = normalize_path(&first.path);

        if let Some(path) = self.resolve_from_tools(&folder) {
            return Some(path);
        }

        if let Some(path) = self.resolve_from_subfolders(&folder) {
            return Some(path);
        }

        self.find_venv_in_folders(folders)
    }

    /// Explicit setting, else the first folder whose upward walk finds a
    /// `venv`.
    pub fn resolve_virtualenv(
        &self,
        settings: &ServerSettings,
        folders: &[WorkspaceFolder],
    ) -> Option<Utf8PathBuf> {
        if let Some(python_path) = settings.python_path() {
            return Some(Utf8PathBuf::from(python_path));
        }
        self.find_venv_in_folders(folders)
    }

    fn find_venv_in_folders(&self, folders: &[WorkspaceFolder]) -> Option<Utf8PathBuf> {
        folders
            .iter()
            .find_map(|folder| self.find_conventional_venv(&normalize_path(&folder.path)))
    }

    fn resolve_from_tools(&self, folder: &Utf8Path) -> Option<Utf8PathBuf> {
        for rule in VENV_RULES {
            if !self.fs.is_file(&folder.join(rule.marker)) {
                continue;
            }

            match self.runner.run(rule.program, rule.args, folder) {
                Ok(stdout) => {
                    let output = stdout.trim();
                    if output.is_empty() {
                        tracing::warn!(
                            "{} detected but `{}` printed nothing",
                            rule.marker,
                            display_command(rule.program, rule.args)
                        );
                        continue;
                    }
                    if let Some(path) = rule.post_process.apply(output, &*self.fs, self.platform) {
                        tracing::debug!("Resolved {} via {}", path, rule.program);
                        return Some(path);
                    }
                    tracing::warn!(
                        "{} detected but no interpreter found under {}",
                        rule.marker,
                        output
                    );
                }
                Err(CommandError::NotFound { program }) => {
                    tracing::warn!("{} detected but {} not found", rule.marker, program);
                }
                Err(CommandError::Failed { command, .. }) => {
                    tracing::warn!(
                        "{} detected but {} exited with non-zero exit status",
                        rule.marker,
                        command
                    );
                }
                Err(err) => {
                    tracing::warn!("{} detected but {}", rule.marker, err);
                }
            }
        }
        None
    }

    fn resolve_from_subfolders(&self, folder: &Utf8Path) -> Option<Utf8PathBuf> {
        for name in CONVENTIONAL_VENV_DIRS {
            if let Some(binary) = interpreter_in_venv(&folder.join(name), &*self.fs, self.platform)
            {
                return Some(binary);
            }
        }

        let Ok(children) = self.fs.read_directory(folder) else {
            return None;
        };

        children
            .iter()
            .filter(|child| {
                child
                    .file_name()
                    .is_none_or(|name| !CONVENTIONAL_VENV_DIRS.contains(&name))
            })
            .find_map(|child| interpreter_in_venv(child, &*self.fs, self.platform))
    }

    /// Walk up from `start` looking for `<dir>/venv/<interpreter>`.
    ///
    /// The first ancestor holding one wins. The walk stops without a result
    /// at a project root, at the home directory, or at the filesystem root.
    /// `start` should be normalized.
    pub fn find_conventional_venv(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        if !self.fs.exists(start) {
            return None;
        }

        let mut dir = start.to_owned();
        loop {
            let candidate = self.platform.interpreter_in(&dir.join(WALK_VENV_DIR));
            if self.fs.exists(&candidate) {
                return Some(candidate);
            }
            if self.roots.is_project_root(&dir) {
                return None;
            }

            let parent = dir.parent()?;
            if parent.as_str().len() >= dir.as_str().len() || Some(parent) == self.roots.home() {
                return None;
            }
            dir = parent.to_owned();
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("platform", &self.platform)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use tempfile::tempdir;
    use tempfile::TempDir;

    use super::*;
    use crate::venv::PYVENV_CFG;

    /// Records every invocation and replays canned results per program.
    #[derive(Default)]
    struct FakeRunner {
        responses: Vec<(&'static str, Result<String, &'static str>)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn with(mut self, program: &'static str, response: Result<&str, &'static str>) -> Self {
            self.responses
                .push((program, response.map(ToString::to_string)));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[&str],
            _cwd: &Utf8Path,
        ) -> Result<String, CommandError> {
            self.calls
                .lock()
                .unwrap()
                .push(display_command(program, args));
            match self.responses.iter().find(|(name, _)| *name == program) {
                Some((_, Ok(stdout))) => Ok(stdout.clone()),
                Some((_, Err("failed"))) => Err(CommandError::Failed {
                    command: display_command(program, args),
                    status: failed_status(),
                    stderr: String::new(),
                }),
                _ => Err(CommandError::NotFound {
                    program: program.to_string(),
                }),
            }
        }
    }

    #[cfg(unix)]
    fn failed_status() -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(1 << 8)
    }

    #[cfg(windows)]
    fn failed_status() -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(1)
    }

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Fixture {
        /// A temp tree whose top directory is treated as the home directory,
        /// so upward walks never leave it.
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
            Self { _dir: dir, root }
        }

        fn project(&self, name: &str) -> Utf8PathBuf {
            let path = self.root.join(name);
            fs::create_dir_all(&path).unwrap();
            path
        }

        fn resolver(&self, runner: Arc<dyn CommandRunner>) -> Resolver {
            Resolver::new(
                Arc::new(OsFileSystem),
                runner,
                Platform::current(),
                Some(&self.root),
            )
        }
    }

    fn touch(path: &Utf8Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn create_venv(root: &Utf8Path) -> Utf8PathBuf {
        let binary = Platform::current().interpreter_in(root);
        touch(&binary);
        touch(&root.join(PYVENV_CFG));
        binary
    }

    fn folders(paths: &[&Utf8PathBuf]) -> Vec<WorkspaceFolder> {
        paths
            .iter()
            .map(|path| WorkspaceFolder::from_path((*path).clone()))
            .collect()
    }

    fn settings_with_python_path(path: &str) -> ServerSettings {
        let mut settings = ServerSettings::default();
        settings.set_python_path(path);
        settings
    }

    mod explicit_setting {
        use super::*;

        #[test]
        fn test_explicit_python_path_wins() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            create_venv(&project.join("venv"));
            touch(&project.join("poetry.lock"));
            let runner = Arc::new(FakeRunner::default().with("poetry", Ok("/elsewhere")));
            let resolver = fixture.resolver(runner.clone());

            let resolved = resolver.resolve_python_path(
                &settings_with_python_path("/usr/bin/python3"),
                &folders(&[&project]),
            );

            assert_eq!(resolved, Some(Utf8PathBuf::from("/usr/bin/python3")));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn test_explicit_python_path_is_not_validated() {
            let fixture = Fixture::new();
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));
            let resolved =
                resolver.resolve_python_path(&settings_with_python_path("/does/not/exist"), &[]);
            assert_eq!(resolved, Some(Utf8PathBuf::from("/does/not/exist")));
        }

        #[test]
        fn test_empty_python_path_is_ignored() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            let binary = create_venv(&project.join(".venv"));
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&settings_with_python_path(""), &folders(&[&project]));
            assert_eq!(resolved, Some(binary));
        }
    }

    mod tools {
        use super::*;

        #[test]
        fn test_no_folders_spawns_nothing() {
            let fixture = Fixture::new();
            let runner = Arc::new(FakeRunner::default());
            let resolver = fixture.resolver(runner.clone());

            assert_eq!(
                resolver.resolve_python_path(&ServerSettings::default(), &[]),
                None
            );
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn test_pipenv_output_is_trimmed() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("Pipfile"));
            let runner =
                Arc::new(FakeRunner::default().with("pipenv", Ok("  /venvs/app/bin/python\n")));
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(Utf8PathBuf::from("/venvs/app/bin/python")));
            assert_eq!(runner.calls(), ["pipenv --py"]);
        }

        #[test]
        fn test_poetry_env_root_is_post_processed() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("poetry.lock"));
            let env_root = fixture.root.join("cache/poetry-env");
            let binary = Platform::current().interpreter_in(&env_root);
            touch(&binary);
            let runner = Arc::new(FakeRunner::default().with("poetry", Ok(env_root.as_str())));
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(binary));
            assert_eq!(runner.calls(), ["poetry env info -p"]);
        }

        #[test]
        fn test_missing_tool_falls_through_to_next_rule() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("poetry.lock"));
            touch(&project.join(".python-version"));
            let runner = Arc::new(FakeRunner::default().with("pyenv", Ok("/pyenv/shims/python")));
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(Utf8PathBuf::from("/pyenv/shims/python")));
            assert_eq!(runner.calls(), ["poetry env info -p", "pyenv which python"]);
        }

        #[test]
        fn test_missing_tool_without_other_markers_falls_through_to_venv() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("poetry.lock"));
            let binary = create_venv(&project.join(".venv"));
            let runner = Arc::new(FakeRunner::default());
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(binary));
            assert_eq!(runner.calls(), ["poetry env info -p"]);
        }

        #[test]
        fn test_failed_tool_falls_through() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("Pipfile"));
            touch(&project.join(".python-version"));
            let runner = Arc::new(
                FakeRunner::default()
                    .with("pipenv", Err("failed"))
                    .with("pyenv", Ok("/pyenv/python")),
            );
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(Utf8PathBuf::from("/pyenv/python")));
        }

        #[test]
        fn test_post_process_miss_tries_next_rule() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("poetry.lock"));
            touch(&project.join(".python-version"));
            let runner = Arc::new(
                FakeRunner::default()
                    .with("poetry", Ok("/no/such/env"))
                    .with("pyenv", Ok("/pyenv/python")),
            );
            let resolver = fixture.resolver(runner.clone());

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(Utf8PathBuf::from("/pyenv/python")));
        }

        #[test]
        fn test_empty_output_tries_next_rule() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join("Pipfile"));
            let binary = create_venv(&project.join("venv"));
            let runner = Arc::new(FakeRunner::default().with("pipenv", Ok("\n")));
            let resolver = fixture.resolver(runner);

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));

            assert_eq!(resolved, Some(binary));
        }

        #[test]
        fn test_marker_directory_is_ignored() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            fs::create_dir_all(project.join("Pipfile")).unwrap();
            let runner = Arc::new(FakeRunner::default());
            let resolver = fixture.resolver(runner.clone());

            resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn test_only_first_folder_is_consulted() {
            let fixture = Fixture::new();
            let first = fixture.project("first");
            let second = fixture.project("second");
            touch(&second.join("Pipfile"));
            let runner = Arc::new(FakeRunner::default().with("pipenv", Ok("/second/python")));
            let resolver = fixture.resolver(runner.clone());

            resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&first, &second]));
            assert!(runner.calls().is_empty());
        }
    }

    mod subfolders {
        use super::*;

        #[test]
        fn test_dot_venv() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            let binary = create_venv(&project.join(".venv"));
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert_eq!(resolved, Some(binary));
        }

        #[test]
        fn test_venv_before_dot_venv() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            let binary = create_venv(&project.join("venv"));
            create_venv(&project.join(".venv"));
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert_eq!(resolved, Some(binary));
        }

        #[test]
        fn test_arbitrary_child_venv() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            fs::create_dir_all(project.join("src")).unwrap();
            let binary = create_venv(&project.join("env-3.12"));
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert_eq!(resolved, Some(binary));
        }

        #[test]
        fn test_child_without_cfg_is_skipped() {
            let fixture = Fixture::new();
            let project = fixture.project("app");
            touch(&project.join(".git"));
            touch(&Platform::current().interpreter_in(&project.join("env")));
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert_eq!(resolved, None);
        }
    }

    mod upward_walk {
        use super::*;

        #[test]
        fn test_finds_venv_in_ancestor() {
            let fixture = Fixture::new();
            let project = fixture.project("repo");
            let binary = Platform::current().interpreter_in(&project.join("venv"));
            touch(&binary);
            let nested = fixture.project("repo/packages/core");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            assert_eq!(resolver.find_conventional_venv(&nested), Some(binary));
        }

        #[test]
        fn test_nearest_venv_wins() {
            let fixture = Fixture::new();
            let outer = Platform::current().interpreter_in(&fixture.root.join("repo/venv"));
            let inner = Platform::current().interpreter_in(&fixture.root.join("repo/pkg/venv"));
            touch(&outer);
            touch(&inner);
            let nested = fixture.project("repo/pkg/src");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            assert_eq!(resolver.find_conventional_venv(&nested), Some(inner));
        }

        #[test]
        fn test_stops_at_project_root() {
            let fixture = Fixture::new();
            touch(&Platform::current().interpreter_in(&fixture.root.join("outer/venv")));
            let project = fixture.project("outer/project");
            touch(&project.join("setup.py"));
            let nested = fixture.project("outer/project/src");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            assert_eq!(resolver.find_conventional_venv(&nested), None);
        }

        #[test]
        fn test_terminates_below_home() {
            let fixture = Fixture::new();
            let nested = fixture.project("a/b/c/d/e/f/g");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            assert_eq!(resolver.find_conventional_venv(&nested), None);
        }

        #[test]
        fn test_home_venv_is_not_considered() {
            let fixture = Fixture::new();
            touch(&Platform::current().interpreter_in(&fixture.root.join("venv")));
            let nested = fixture.project("a/b");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            assert_eq!(resolver.find_conventional_venv(&nested), None);
        }

        #[test]
        fn test_missing_start() {
            let fixture = Fixture::new();
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));
            assert_eq!(
                resolver.find_conventional_venv(&fixture.root.join("missing")),
                None
            );
        }

        #[test]
        fn test_used_as_last_resort() {
            let fixture = Fixture::new();
            let binary = Platform::current().interpreter_in(&fixture.root.join("mono/venv"));
            touch(&binary);
            let project = fixture.project("mono/services/api");
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_python_path(&ServerSettings::default(), &folders(&[&project]));
            assert_eq!(resolved, Some(binary));
        }

        #[test]
        fn test_resolve_virtualenv_checks_every_folder() {
            let fixture = Fixture::new();
            let first = fixture.project("first");
            touch(&first.join(".git"));
            let second = fixture.project("second");
            let binary = Platform::current().interpreter_in(&second.join("venv"));
            touch(&binary);
            let resolver = fixture.resolver(Arc::new(FakeRunner::default()));

            let resolved =
                resolver.resolve_virtualenv(&ServerSettings::default(), &folders(&[&first, &second]));
            assert_eq!(resolved, Some(binary));
        }
    }
}
