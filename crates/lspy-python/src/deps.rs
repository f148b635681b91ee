//! Analysis search paths for plugins written against the editor's own API.

use std::sync::LazyLock;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use regex::Regex;

use crate::platform::PythonVersion;
use crate::system::FileSystem;

/// Matches the version tag in interpreter directories such as `python3.8`,
/// `python33.zip`, or `Lib/Python38`.
static VERSIONED_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(python3\.?)[38]").expect("version pattern is valid")
});

/// Compose the extra search paths that let the server see the editor's
/// bundled packages for `target`.
///
/// - version-tagged interpreter directories are rewritten for `target`
/// - `packages_path` is moved to the end of the list
/// - `typings_dir` is put in front
/// - entries that are not existing directories are dropped
pub fn compose_dependency_paths(
    sys_path: &[Utf8PathBuf],
    target: PythonVersion,
    packages_path: &Utf8Path,
    typings_dir: &Utf8Path,
    fs: &dyn FileSystem,
) -> Vec<Utf8PathBuf> {
    let minor = if target == PythonVersion::PY38 { "8" } else { "3" };
    let replacement = format!("${{1}}{minor}");

    let mut paths: Vec<Utf8PathBuf> = sys_path
        .iter()
        .map(|path| Utf8PathBuf::from(VERSIONED_DIR.replace_all(path.as_str(), &replacement).as_ref()))
        .filter(|path| path != packages_path)
        .collect();

    paths.push(packages_path.to_owned());
    paths.insert(0, typings_dir.to_owned());

    paths.retain(|path| fs.is_directory(path));
    paths
}
