use crate::context::{ActiveInterpreter, ActiveOrigin, Markers};
use crate::scope::Scope;
use crate::state::PersistentConfigDocument;
use pymate_platform::env::is_in_path;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDir {
    pub path: PathBuf,
    /// On the PATH of this process (a new shell may be needed otherwise).
    pub in_process_path: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStatus {
    pub scope: Scope,
    pub default_interpreter: Option<PathBuf>,
    pub default_exists: bool,
    pub managed: Vec<ManagedDir>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub session_marker: Option<PathBuf>,
    pub active: Option<ActiveInterpreter>,
    pub scopes: Vec<ScopeStatus>,
}

impl Status {
    pub fn collect(
        markers: &Markers,
        active: Option<ActiveInterpreter>,
        doc: &PersistentConfigDocument,
    ) -> Self {
        let scopes = Scope::ALL
            .into_iter()
            .map(|scope| {
                let set = doc.scope(scope);
                ScopeStatus {
                    scope,
                    default_exists: set.default_interpreter.as_deref().is_some_and(|p| p.is_file()),
                    default_interpreter: set.default_interpreter,
                    managed: set
                        .directories
                        .into_iter()
                        .map(|path| ManagedDir {
                            in_process_path: is_in_path(&path),
                            path,
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            session_marker: markers.path.clone(),
            active,
            scopes,
        }
    }
}

impl fmt::Display for ActiveOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveOrigin::SessionMarker => f.write_str("session"),
            ActiveOrigin::Selected => f.write_str("selected"),
            ActiveOrigin::SoleDiscovered => f.write_str("only interpreter found"),
            ActiveOrigin::PersistentDefault(scope) => write!(f, "{scope} default"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.session_marker {
            Some(path) => writeln!(f, "session:  {}", path.display())?,
            None => writeln!(f, "session:  (no PyMate session script sourced)")?,
        }
        match &self.active {
            Some(active) => writeln!(f, "active:   {} [{}]", active.record, active.origin)?,
            None => writeln!(f, "active:   (none)")?,
        }

        for scope in &self.scopes {
            writeln!(f, "\n[{}]", scope.scope)?;
            match &scope.default_interpreter {
                Some(exe) if scope.default_exists => writeln!(f, "  default: {}", exe.display())?,
                Some(exe) => writeln!(f, "  default: {} (missing)", exe.display())?,
                None => writeln!(f, "  default: (none)")?,
            }
            if scope.managed.is_empty() {
                writeln!(f, "  managed: (none)")?;
            }
            for dir in &scope.managed {
                let note = if dir.in_process_path { "" } else { "  (open a new shell)" };
                writeln!(f, "  managed: {}{note}", dir.path.display())?;
            }
        }
        Ok(())
    }
}
