//! The persistent record of what PyMate did to each scope's PATH.
//!
//! ```json
//! {
//!   "user": {
//!     "pymate_managed_paths": ["/opt/py311", "/opt/py/bin"],
//!     "python_exe_path_managed_by_pymate": "/opt/py311/python3"
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::scope::Scope;
use pymate_fs::AtomicWriteOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories the tool injected into one scope's PATH, in PATH order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedPathSet {
    #[serde(rename = "pymate_managed_paths", default)]
    pub directories: Vec<PathBuf>,

    #[serde(
        rename = "python_exe_path_managed_by_pymate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_interpreter: Option<PathBuf>,
}

impl ManagedPathSet {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.default_interpreter.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<ManagedPathSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<ManagedPathSet>,
}

impl PersistentConfigDocument {
    pub fn get(&self, scope: Scope) -> Option<&ManagedPathSet> {
        match scope {
            Scope::User => self.user.as_ref(),
            Scope::System => self.system.as_ref(),
        }
    }

    /// The scope's record, or an empty one if nothing was recorded.
    pub fn scope(&self, scope: Scope) -> ManagedPathSet {
        self.get(scope).cloned().unwrap_or_default()
    }

    /// Replace the scope's record entirely.
    pub fn set(&mut self, scope: Scope, set: ManagedPathSet) {
        match scope {
            Scope::User => self.user = Some(set),
            Scope::System => self.system = Some(set),
        }
    }

    pub fn is_empty(&self) -> bool {
        Scope::ALL
            .iter()
            .all(|s| self.get(*s).is_none_or(ManagedPathSet::is_empty))
    }

    /// First recorded default interpreter, user scope before system.
    pub fn default_interpreter(&self) -> Option<(Scope, &Path)> {
        Scope::ALL.into_iter().find_map(|scope| {
            self.get(scope)
                .and_then(|s| s.default_interpreter.as_deref())
                .map(|p| (scope, p))
        })
    }
}

/// Reads and writes the state document at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, reporting a damaged file as [`Error::CorruptState`].
    pub fn try_load(&self) -> Result<PersistentConfigDocument> {
        let Some(bytes) = pymate_fs::read_if_exists(&self.path)? else {
            debug!(path = %self.path.display(), "no state file yet");
            return Ok(PersistentConfigDocument::default());
        };

        serde_json::from_slice(&bytes).map_err(|e| Error::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Load the document. Never fails: a missing, unreadable or corrupt file
    /// is an empty document.
    pub fn load(&self) -> PersistentConfigDocument {
        self.try_load().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unusable state file");
            PersistentConfigDocument::default()
        })
    }

    /// Replace the whole file with `doc`.
    pub fn save(&self, doc: &PersistentConfigDocument) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(doc)?;
        bytes.push(b'\n');
        pymate_fs::atomic_write(&self.path, &bytes, AtomicWriteOptions::default())?;
        debug!(path = %self.path.display(), "saved state");
        Ok(())
    }
}
