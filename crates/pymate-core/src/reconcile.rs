//! Rewriting a scope's persistent PATH so that PyMate's own entries are
//! replaced as a unit while everything else stays where it was.
//!
//! 1. strip the tool's own copy of each directory recorded as managed (the
//!    front-most match), so a user entry for the same directory further
//!    back survives;
//! 2. build the new managed set: default interpreter's bin dirs, then the
//!    requested directories, deduplicated by normalized path;
//! 3. prepend it, write the value, then record the new set.
//!
//! A failed write leaves both the PATH value and the state file untouched.
//! A failed state save after a successful write restores the old PATH value
//! before the error is returned.

use crate::error::Result;
use crate::interpreter::{InterpreterRecord, bin_dirs_of};
use crate::registry::PathRegistry;
use crate::scope::Scope;
use crate::state::{ManagedPathSet, StateStore};
use pymate_platform::env::{PathEntries, path_key, resolve};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What the caller wants a scope to look like.
#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    pub desired: Vec<PathBuf>,
    pub default_interpreter: Option<InterpreterRecord>,
    pub revert: bool,
}

impl ApplyRequest {
    pub fn ensure<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            desired: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn revert() -> Self {
        Self {
            revert: true,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, interpreter: Option<InterpreterRecord>) -> Self {
        self.default_interpreter = interpreter;
        self
    }
}

/// Result of the pure PATH computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub path_value: String,
    pub managed: Vec<PathBuf>,
    /// Managed directories that the user also lists further down PATH.
    pub shadowed_user_entries: Vec<PathBuf>,
}

/// Compute the new PATH value and managed set without touching anything.
pub fn reconcile(
    current: &str,
    sep: char,
    previously_managed: &[PathBuf],
    request: &ApplyRequest,
) -> Result<Reconciled> {
    let mut entries = PathEntries::parse(current, sep);
    let previous: Vec<String> = previously_managed.iter().map(|p| path_key(p)).collect();
    let stripped = entries.remove_first_each(previous.iter().map(String::as_str));
    debug!(stripped, "removed previously managed entries");

    let mut managed = Vec::new();
    let mut shadowed_user_entries = Vec::new();

    if !request.revert {
        let user_keys: HashSet<String> = entries.keys().into_iter().collect();
        let mut seen = HashSet::new();

        let candidates = request
            .default_interpreter
            .iter()
            .flat_map(InterpreterRecord::bin_dirs)
            .chain(request.desired.iter().cloned());

        for dir in candidates {
            let key = path_key(&dir);
            if !seen.insert(key.clone()) {
                continue;
            }
            let dir = resolve(&dir);
            if user_keys.contains(&key) {
                shadowed_user_entries.push(dir.clone());
            }
            managed.push(dir);
        }
    }

    let path_value = entries
        .prepend_all(managed.iter().map(|p| p.to_string_lossy().into_owned()))
        .build()?;

    Ok(Reconciled {
        path_value,
        managed,
        shadowed_user_entries,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub scope: Scope,
    pub path_value: String,
    pub managed: Vec<PathBuf>,
    pub shadowed_user_entries: Vec<PathBuf>,
    pub broadcast_ok: bool,
}

pub struct Reconciler<'a> {
    registry: &'a dyn PathRegistry,
    store: &'a StateStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a dyn PathRegistry, store: &'a StateStore) -> Self {
        Self { registry, store }
    }

    pub fn apply_managed_paths(
        &self,
        scope: Scope,
        request: &ApplyRequest,
    ) -> Result<ApplyOutcome> {
        let mut doc = self.store.load();
        let previous = doc.scope(scope);

        let current = self.registry.read(scope)?;
        let reconciled = reconcile(
            &current,
            self.registry.separator(),
            &previous.directories,
            request,
        )?;

        for dir in &reconciled.shadowed_user_entries {
            debug!(
                %scope,
                dir = %dir.display(),
                "also listed as a user entry; managed copy goes first"
            );
        }

        let wrote = reconciled.path_value != current;
        if wrote {
            self.registry.write(scope, &reconciled.path_value)?;
        } else {
            debug!(%scope, "PATH already up to date");
        }

        let default_interpreter = match (&request.default_interpreter, request.revert) {
            (Some(interpreter), false) => Some(resolve(interpreter.path())),
            _ => None,
        };
        doc.set(
            scope,
            ManagedPathSet {
                directories: reconciled.managed.clone(),
                default_interpreter,
            },
        );
        if let Err(err) = self.store.save(&doc) {
            if wrote {
                self.restore(scope, &current);
            }
            return Err(err);
        }

        let broadcast_ok = match self.registry.broadcast() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "environment change broadcast failed");
                false
            }
        };

        if request.revert {
            info!(%scope, "reverted managed PATH entries");
        } else {
            info!(%scope, managed = reconciled.managed.len(), "updated persistent PATH");
        }

        Ok(ApplyOutcome {
            scope,
            path_value: reconciled.path_value,
            managed: reconciled.managed,
            shadowed_user_entries: reconciled.shadowed_user_entries,
            broadcast_ok,
        })
    }

    /// Put back the value read at the start of an apply whose state could
    /// not be recorded, so no unrecorded entry is left behind.
    fn restore(&self, scope: Scope, previous: &str) {
        match self.registry.write(scope, previous) {
            Ok(()) => warn!(%scope, "state file not saved; PATH change rolled back"),
            Err(err) => warn!(
                %scope,
                error = %err,
                "state file not saved and PATH could not be restored"
            ),
        }
    }
}

/// Directories previously managed in a scope that are not bin dirs of the
/// recorded default interpreter, i.e. the ones added explicitly.
pub fn extra_managed_dirs(set: &ManagedPathSet) -> Vec<PathBuf> {
    let interpreter_dirs: HashSet<String> = set
        .default_interpreter
        .as_deref()
        .map(|exe| bin_dirs_of(exe).iter().map(|d| path_key(d)).collect())
        .unwrap_or_default();

    set.directories
        .iter()
        .filter(|dir| !interpreter_dirs.contains(&path_key(dir)))
        .cloned()
        .collect()
}
