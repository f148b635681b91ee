use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::system::normalize_path;
use crate::system::FileSystem;

/// Names whose presence as a direct child marks a directory as a project root.
pub const ROOT_MARKERS: &[&str] = &[
    ".git",
    "poetry.lock",
    "setup.py",
    "dev-requirements.txt",
    "requirements-dev.txt",
    "requirements.txt",
    "test-requirements.txt",
];

/// Decides where upward directory walks stop.
///
/// A directory is a project root when it is the user's home directory or
/// contains one of [`ROOT_MARKERS`]. Answers are memoized per path for the
/// lifetime of the detector: the filesystem is assumed not to gain or lose
/// markers during a session, so an entry is never changed once written.
pub struct ProjectRoots {
    fs: Arc<dyn FileSystem>,
    home: Option<Utf8PathBuf>,
    cache: DashMap<Utf8PathBuf, bool, FxBuildHasher>,
}

impl ProjectRoots {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, home: Option<&Utf8Path>) -> Self {
        Self {
            fs,
            home: home.map(normalize_path),
            cache: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// The normalized home directory, if known.
    #[must_use]
    pub fn home(&self) -> Option<&Utf8Path> {
        self.home.as_deref()
    }

    /// `path` must already be normalized; it is used verbatim as cache key.
    pub fn is_project_root(&self, path: &Utf8Path) -> bool {
        if let Some(cached) = self.cache.get(path) {
            return *cached;
        }

        let is_root = self.detect(path);
        self.cache.insert(path.to_owned(), is_root);
        is_root
    }

    fn detect(&self, path: &Utf8Path) -> bool {
        if self.home.as_deref() == Some(path) {
            return true;
        }
        ROOT_MARKERS
            .iter()
            .any(|marker| self.fs.exists(&path.join(marker)))
    }
}

impl std::fmt::Debug for ProjectRoots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRoots")
            .field("home", &self.home)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
