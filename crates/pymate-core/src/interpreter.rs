//! Discovered Python installations.

use pymate_platform::env::{path_key, paths_equal};
use pymate_version::PyVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Version string recorded when `--version` could not be read.
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    /// Listed by the Windows `py` launcher.
    Launcher,
    /// Found by scanning PATH.
    PathScan,
}

/// One interpreter installation. Two records are equal when their
/// executables resolve to the same file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpreterRecord {
    path: PathBuf,
    version: String,
    display_name: String,
    source: Source,
}

impl InterpreterRecord {
    pub fn launcher(path: impl Into<PathBuf>, version: impl Into<String>, tag: &str) -> Self {
        let version = version.into();
        Self {
            display_name: format!("Python {version} (Py Launcher: {tag})"),
            path: path.into(),
            version,
            source: Source::Launcher,
        }
    }

    /// `name` is the executable name the scan looked for, e.g. `python3`.
    pub fn path_scan(path: impl Into<PathBuf>, version: impl Into<String>, name: &str) -> Self {
        let path = path.into();
        let version = version.into();
        Self {
            display_name: format!("Python {version} ({name} at {})", path.display()),
            path,
            version,
            source: Source::PathScan,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn parsed_version(&self) -> Option<PyVersion> {
        PyVersion::parse(&self.version).ok()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn key(&self) -> String {
        path_key(&self.path)
    }

    pub fn is_same(&self, path: &Path) -> bool {
        paths_equal(&self.path, path)
    }

    /// Directory holding the executable.
    pub fn dir(&self) -> PathBuf {
        exe_dir(&self.path)
    }

    /// Where pip and other console scripts are installed.
    pub fn scripts_dir(&self) -> PathBuf {
        scripts_dir_of(&self.path)
    }

    /// Directories put on a persistent PATH when this interpreter becomes
    /// the default, in precedence order.
    pub fn bin_dirs(&self) -> Vec<PathBuf> {
        bin_dirs_of(&self.path)
    }

    /// pip belonging to this interpreter, if installed.
    pub fn pip(&self) -> Option<PathBuf> {
        let name = if cfg!(windows) { "pip.exe" } else { "pip" };
        Some(self.scripts_dir().join(name)).filter(|p| p.is_file())
    }
}

impl PartialEq for InterpreterRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for InterpreterRecord {}

impl fmt::Display for InterpreterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

fn exe_dir(exe: &Path) -> PathBuf {
    exe.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn scripts_dir_of(exe: &Path) -> PathBuf {
    if cfg!(windows) {
        exe_dir(exe).join("Scripts")
    } else {
        exe_dir(exe)
    }
}

/// Bin directories of the interpreter at `exe`: `[Scripts, dir]` on
/// Windows, `[dir]` elsewhere.
pub fn bin_dirs_of(exe: &Path) -> Vec<PathBuf> {
    let dir = exe_dir(exe);
    let scripts = scripts_dir_of(exe);
    if scripts == dir {
        vec![dir]
    } else {
        vec![scripts, dir]
    }
}

/// Per-user scripts directory under `appdata` (`%APPDATA%` on Windows):
/// `Python\Python<XY>\Scripts` for `version`, else the shared
/// `Python\Scripts`. `None` when neither exists.
pub fn user_scripts_dir(appdata: &Path, version: Option<&PyVersion>) -> Option<PathBuf> {
    let base = appdata.join("Python");
    version
        .map(|v| {
            base.join(format!("Python{}", v.feature_release().replace('.', "")))
                .join("Scripts")
        })
        .into_iter()
        .chain([base.join("Scripts")])
        .find(|dir| dir.is_dir())
}

/// Newest first; records whose version is unknown go last.
pub fn sort_newest_first(records: &mut [InterpreterRecord]) {
    records.sort_by(|a, b| b.parsed_version().cmp(&a.parsed_version()));
}
