//! Finding installed interpreters.

use crate::error::{Error, Result};
use crate::interpreter::{InterpreterRecord, UNKNOWN_VERSION, sort_newest_first};
use pymate_platform::command::Command;
use pymate_platform::env::{path_key, resolve};
use pymate_version::PyVersion;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait Discovery {
    /// All interpreters found, newest first.
    fn discover(&self) -> Vec<InterpreterRecord>;

    /// Build a record for a known executable.
    fn probe(&self, exe: &Path) -> InterpreterRecord;
}

/// A fixed list, for callers that already scanned.
impl Discovery for Vec<InterpreterRecord> {
    fn discover(&self) -> Vec<InterpreterRecord> {
        self.clone()
    }

    fn probe(&self, exe: &Path) -> InterpreterRecord {
        self.iter()
            .find(|r| r.is_same(exe))
            .cloned()
            .unwrap_or_else(|| record_for(exe, UNKNOWN_VERSION.to_string()))
    }
}

/// Scans the `py` launcher (Windows) and PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDiscovery;

const SCAN_NAMES: &[&str] = if cfg!(windows) {
    &["python", "python3"]
} else {
    &["python3", "python"]
};

impl Discovery for SystemDiscovery {
    fn discover(&self) -> Vec<InterpreterRecord> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        if cfg!(windows) {
            for (tag, exe) in launcher_entries() {
                if !exe.is_file() || !seen.insert(path_key(&exe)) {
                    continue;
                }
                let exe = resolve(&exe);
                found.push(InterpreterRecord::launcher(&exe, version_of(&exe), &tag));
            }
        }

        for name in SCAN_NAMES {
            let Ok(paths) = which::which_all(name) else {
                continue;
            };
            for exe in paths {
                let exe = resolve(&exe);
                if !exe.is_file() || !seen.insert(path_key(&exe)) {
                    continue;
                }
                found.push(InterpreterRecord::path_scan(&exe, version_of(&exe), name));
            }
        }

        sort_newest_first(&mut found);
        debug!(count = found.len(), "interpreter scan finished");
        found
    }

    fn probe(&self, exe: &Path) -> InterpreterRecord {
        let exe = resolve(exe);
        record_for(&exe, version_of(&exe))
    }
}

fn record_for(exe: &Path, version: String) -> InterpreterRecord {
    let name = exe
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "python".to_string());
    InterpreterRecord::path_scan(exe, version, &name)
}

/// `<exe> --version`, or [`UNKNOWN_VERSION`].
pub fn version_of(exe: &Path) -> String {
    match read_version(exe) {
        Ok(Some(version)) => version.to_string(),
        Ok(None) => UNKNOWN_VERSION.to_string(),
        Err(err) => {
            warn!(exe = %exe.display(), error = %err, "cannot run interpreter");
            UNKNOWN_VERSION.to_string()
        }
    }
}

/// Run `<exe> --version`. `Ok(None)` when it ran but printed no version.
pub fn read_version(exe: &Path) -> Result<Option<PyVersion>> {
    let captured = Command::new(exe).arg("--version").capture()?;
    Ok(PyVersion::from_version_output(captured.text())
        .inspect_err(|err| warn!(exe = %exe.display(), error = %err, "unreadable version"))
        .ok())
}

fn launcher_entries() -> Vec<(String, PathBuf)> {
    match Command::new("py").arg("-0p").capture().map_err(Error::from) {
        Ok(captured) => parse_launcher_listing(&captured.stdout),
        Err(err) => {
            debug!(error = %err, "py launcher not available");
            Vec::new()
        }
    }
}

/// Parse `py -0p` output into `(tag, executable)` pairs.
///
/// ```text
/// Installed Pythons found by py Launcher for Windows
///  -V:3.12 *        C:\Python312\python.exe
///  -3.9-64          C:\Program Files\Python39\python.exe
/// ```
pub fn parse_launcher_listing(output: &str) -> Vec<(String, PathBuf)> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .filter_map(|line| {
            let (tag, rest) = line.split_once(char::is_whitespace)?;
            let tag = tag.trim_start_matches('-').trim_start_matches("V:");
            let path = rest.trim().trim_start_matches('*').trim();
            (!path.is_empty()).then(|| (tag.to_string(), PathBuf::from(path)))
        })
        .collect()
}
