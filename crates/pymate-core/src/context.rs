//! Which interpreter a command should treat as "active".
//!
//! Resolved once per command from, in order: the marker variables left by
//! a sourced session script, a selection made earlier in this process, the
//! only discovered interpreter, and the persistent default (user scope
//! first).

use crate::discovery::Discovery;
use crate::interpreter::{InterpreterRecord, UNKNOWN_VERSION};
use crate::scope::Scope;
use crate::state::PersistentConfigDocument;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub const ACTIVE_PATH_VAR: &str = "PYMATE_ACTIVE_PYTHON_PATH";
pub const ACTIVE_VERSION_VAR: &str = "PYMATE_ACTIVE_PYTHON_VERSION";

/// Values of the session marker variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl Markers {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            path: var(ACTIVE_PATH_VAR).map(PathBuf::from),
            version: var(ACTIVE_VERSION_VAR),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveOrigin {
    SessionMarker,
    Selected,
    SoleDiscovered,
    PersistentDefault(Scope),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInterpreter {
    pub record: InterpreterRecord,
    pub origin: ActiveOrigin,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    discovered: Vec<InterpreterRecord>,
    selected: Option<InterpreterRecord>,
    markers: Markers,
}

impl SessionContext {
    pub fn new(discovered: Vec<InterpreterRecord>, markers: Markers) -> Self {
        Self {
            discovered,
            selected: None,
            markers,
        }
    }

    pub fn discovered(&self) -> &[InterpreterRecord] {
        &self.discovered
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn select(&mut self, interpreter: InterpreterRecord) {
        self.selected = Some(interpreter);
    }

    pub fn selected(&self) -> Option<&InterpreterRecord> {
        self.selected.as_ref()
    }

    fn known(&self, path: &std::path::Path) -> Option<InterpreterRecord> {
        self.discovered.iter().find(|r| r.is_same(path)).cloned()
    }

    pub fn resolve_active(
        &self,
        state: &PersistentConfigDocument,
        discovery: &dyn Discovery,
    ) -> Option<ActiveInterpreter> {
        let active = |record: InterpreterRecord, origin: ActiveOrigin| {
            debug!(?origin, path = %record.path().display(), "resolved active interpreter");
            Some(ActiveInterpreter { record, origin })
        };

        if let Some(path) = self.markers.path.as_deref().filter(|p| p.is_file()) {
            let record = self.known(path).unwrap_or_else(|| {
                let version = self.markers.version.as_deref().unwrap_or(UNKNOWN_VERSION);
                let name = path
                    .file_stem()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                InterpreterRecord::path_scan(path, version, &name)
            });
            return active(record, ActiveOrigin::SessionMarker);
        }

        if let Some(selected) = self.selected.as_ref().filter(|r| r.path().is_file()) {
            return active(selected.clone(), ActiveOrigin::Selected);
        }

        if let [only] = self.discovered.as_slice() {
            return active(only.clone(), ActiveOrigin::SoleDiscovered);
        }

        Scope::ALL.into_iter().find_map(|scope| {
            let exe = state.get(scope)?.default_interpreter.as_deref()?;
            if !exe.is_file() {
                return None;
            }
            let record = self.known(exe).unwrap_or_else(|| discovery.probe(exe));
            active(record, ActiveOrigin::PersistentDefault(scope))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ManagedPathSet;
    use std::path::Path;

    fn no_scan() -> Vec<InterpreterRecord> {
        Vec::new()
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_marker_wins_and_supplies_version() {
        let dir = tempfile::tempdir().unwrap();
        let marked = touch(dir.path(), "python3");
        let markers = Markers {
            path: Some(marked.clone()),
            version: Some("3.13.0".into()),
        };
        let mut ctx = SessionContext::new(Vec::new(), markers);
        ctx.select(InterpreterRecord::path_scan(touch(dir.path(), "other"), "3.9.0", "other"));

        let active = ctx
            .resolve_active(&PersistentConfigDocument::default(), &no_scan())
            .unwrap();
        assert_eq!(active.origin, ActiveOrigin::SessionMarker);
        assert_eq!(active.record.version(), "3.13.0");
        assert!(active.record.is_same(&marked));
    }

    #[test]
    fn test_stale_marker_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let only = InterpreterRecord::path_scan(touch(dir.path(), "python3"), "3.12.0", "python3");
        let markers = Markers {
            path: Some(dir.path().join("gone")),
            version: None,
        };
        let ctx = SessionContext::new(vec![only.clone()], markers);
        let active = ctx
            .resolve_active(&PersistentConfigDocument::default(), &no_scan())
            .unwrap();
        assert_eq!(active.origin, ActiveOrigin::SoleDiscovered);
        assert_eq!(active.record, only);
    }

    #[test]
    fn test_selected_beats_sole_discovered() {
        let dir = tempfile::tempdir().unwrap();
        let a = InterpreterRecord::path_scan(touch(dir.path(), "a"), "3.10.0", "a");
        let b = InterpreterRecord::path_scan(touch(dir.path(), "b"), "3.11.0", "b");
        let mut ctx = SessionContext::new(vec![a], Markers::default());
        ctx.select(b.clone());
        let active = ctx
            .resolve_active(&PersistentConfigDocument::default(), &no_scan())
            .unwrap();
        assert_eq!(active.origin, ActiveOrigin::Selected);
        assert_eq!(active.record, b);
    }

    #[test]
    fn test_persistent_default_user_before_system() {
        let dir = tempfile::tempdir().unwrap();
        let user_exe = touch(dir.path(), "user-python");
        let system_exe = touch(dir.path(), "system-python");

        let mut doc = PersistentConfigDocument::default();
        doc.set(
            Scope::System,
            ManagedPathSet {
                directories: vec![],
                default_interpreter: Some(system_exe),
            },
        );
        doc.set(
            Scope::User,
            ManagedPathSet {
                directories: vec![],
                default_interpreter: Some(user_exe.clone()),
            },
        );

        let ctx = SessionContext::new(Vec::new(), Markers::default());
        let active = ctx.resolve_active(&doc, &no_scan()).unwrap();
        assert_eq!(active.origin, ActiveOrigin::PersistentDefault(Scope::User));
        assert!(active.record.is_same(&user_exe));
    }

    #[test]
    fn test_nothing_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let a = InterpreterRecord::path_scan(touch(dir.path(), "a"), "3.10.0", "a");
        let b = InterpreterRecord::path_scan(touch(dir.path(), "b"), "3.11.0", "b");
        let ctx = SessionContext::new(vec![a, b], Markers::default());
        assert!(
            ctx.resolve_active(&PersistentConfigDocument::default(), &no_scan())
                .is_none()
        );
    }
}
