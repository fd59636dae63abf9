//! PATH value parsing and path identity.
//!
//! Every comparison between PATH entries goes through [`path_key`], so a
//! directory written as `C:/Python311/`, `c:\python311` or via a symlink is
//! the same entry wherever it appears.

use crate::error::{Error, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Separator between entries of a PATH value.
pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Name of the PATH variable as the platform spells it.
pub const PATH_VAR: &str = if cfg!(windows) { "Path" } else { "PATH" };

const CASE_INSENSITIVE: bool = cfg!(any(windows, target_os = "macos"));

/// Make `path` absolute, drop `.`/`..` and trailing separators, and resolve
/// symlinks when the path exists.
pub fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    match dunce::canonicalize(&absolute) {
        Ok(canonical) => canonical,
        Err(_) => lexical_clean(&absolute),
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Comparison key for a path: resolved, one separator style, case-folded
/// where the filesystem is case-insensitive.
pub fn path_key(path: &Path) -> String {
    let resolved = resolve(path);
    let key = resolved.to_string_lossy();
    let key = if cfg!(windows) {
        key.replace('/', "\\")
    } else {
        key.into_owned()
    };

    if CASE_INSENSITIVE {
        key.to_lowercase()
    } else {
        key
    }
}

pub fn paths_equal(p1: &Path, p2: &Path) -> bool {
    path_key(p1) == path_key(p2)
}

/// Ordered entries of a PATH value, kept verbatim apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntries {
    entries: Vec<String>,
    sep: char,
}

impl PathEntries {
    /// Split a PATH value into non-empty, trimmed entries.
    pub fn parse(value: &str, sep: char) -> Self {
        let entries = value
            .split(sep)
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries, sep }
    }

    /// Entries of the current process PATH.
    pub fn from_process() -> Self {
        let value = env::var_os(PATH_VAR)
            .or_else(|| env::var_os("PATH"))
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse(&value, PATH_SEPARATOR)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| path_key(Path::new(e))).collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = path_key(path);
        self.entries.iter().any(|e| path_key(Path::new(e)) == key)
    }

    /// Put all of `front` ahead of the existing entries, in order.
    pub fn prepend_all<I, S>(mut self, front: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged: Vec<String> = front.into_iter().map(Into::into).collect();
        merged.append(&mut self.entries);
        self.entries = merged;
        self
    }

    /// For each key, drop the first entry that has it. Later entries with
    /// the same key stay, so a directory listed twice loses one copy.
    /// Returns how many went.
    pub fn remove_first_each<'a, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self.keys();
        let mut removed = 0;
        for key in keys {
            if let Some(i) = current.iter().position(|k| k == key) {
                current.remove(i);
                self.entries.remove(i);
                removed += 1;
            }
        }
        removed
    }

    /// Join the entries back into a PATH value.
    pub fn build(&self) -> Result<String> {
        if let Some(bad) = self.entries.iter().find(|e| e.contains(self.sep)) {
            return Err(Error::InvalidPathEntry {
                entry: bad.clone(),
                sep: self.sep,
            });
        }
        Ok(self.entries.join(self.sep.to_string().as_str()))
    }
}

pub fn is_in_path(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return false;
    }
    PathEntries::from_process().contains(path)
}
