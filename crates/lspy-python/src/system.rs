//! File system abstraction following Ruff's pattern
//!
//! Resolution only ever asks existence questions and lists directories, so
//! the trait is narrow. Every check fails closed: permission errors and
//! missing paths both read as "not there".

use std::io;

use camino::Utf8Path;
use camino::Utf8PathBuf;

pub trait FileSystem: Send + Sync {
    /// Check if a path exists (following symlinks)
    fn exists(&self, path: &Utf8Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Utf8Path) -> bool;

    /// Check if a path is a directory
    fn is_directory(&self, path: &Utf8Path) -> bool;

    /// List directory contents. Entries that are not valid UTF-8 are skipped.
    fn read_directory(&self, path: &Utf8Path) -> io::Result<Vec<Utf8PathBuf>>;
}

/// Standard file system implementation that uses `std::fs`
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn is_directory(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }

    fn read_directory(&self, path: &Utf8Path) -> io::Result<Vec<Utf8PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            if let Ok(path) = Utf8PathBuf::from_path_buf(entry?.path()) {
                entries.push(path);
            }
        }
        Ok(entries)
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not resolved.
#[must_use]
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    use camino::Utf8Component;

    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if normalized.file_name().is_some() {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
            _ => normalized.push(component),
        }
    }
    if normalized.as_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
