#![cfg(unix)]

use pymate_core::Error;
use pymate_core::interpreter::InterpreterRecord;
use pymate_core::reconcile::{ApplyRequest, Reconciler};
use pymate_core::registry::{MemoryRegistry, PathRegistry};
use pymate_core::scope::Scope;
use pymate_core::state::StateStore;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: StateStore,
    registry: MemoryRegistry,
}

impl Fixture {
    fn new(user_path: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("persistent_path.json"));
        let registry = MemoryRegistry::new(':').with_value(Scope::User, user_path);
        Self {
            _dir: dir,
            store,
            registry,
        }
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.registry, &self.store)
    }

    fn state_json(&self) -> serde_json::Value {
        serde_json::from_slice(&std::fs::read(self.store.path()).unwrap()).unwrap()
    }

    fn user_path(&self) -> String {
        self.registry.read(Scope::User).unwrap()
    }
}

#[test]
fn first_apply_prepends_and_records() {
    let fx = Fixture::new("/usr/bin:/usr/local/bin");

    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/py/bin"]))
        .unwrap();

    assert_eq!(outcome.path_value, "/opt/py/bin:/usr/bin:/usr/local/bin");
    assert_eq!(fx.user_path(), "/opt/py/bin:/usr/bin:/usr/local/bin");
    assert_eq!(
        fx.state_json(),
        serde_json::json!({"user": {"pymate_managed_paths": ["/opt/py/bin"]}})
    );
    assert!(outcome.broadcast_ok);
    assert_eq!(fx.registry.broadcasts(), 1);
}

#[test]
fn default_interpreter_supersedes_previous_set() {
    let fx = Fixture::new("/usr/bin:/usr/local/bin");
    let request = ApplyRequest::ensure(["/opt/py/bin"]);
    fx.reconciler()
        .apply_managed_paths(Scope::User, &request)
        .unwrap();

    let py311 = InterpreterRecord::path_scan("/opt/py311/python3", "3.11.4", "python3");
    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &request.with_default(Some(py311)))
        .unwrap();

    assert_eq!(
        outcome.managed,
        [PathBuf::from("/opt/py311"), PathBuf::from("/opt/py/bin")]
    );
    assert_eq!(fx.user_path(), "/opt/py311:/opt/py/bin:/usr/bin:/usr/local/bin");
    assert_eq!(
        fx.state_json(),
        serde_json::json!({"user": {
            "pymate_managed_paths": ["/opt/py311", "/opt/py/bin"],
            "python_exe_path_managed_by_pymate": "/opt/py311/python3"
        }})
    );
}

#[test]
fn reapply_is_idempotent() {
    let fx = Fixture::new("/usr/bin:/bin");
    let request = ApplyRequest::ensure(["/opt/a", "/opt/b"]);

    let first = fx.reconciler().apply_managed_paths(Scope::User, &request).unwrap();
    let state_after_first = fx.state_json();
    let second = fx.reconciler().apply_managed_paths(Scope::User, &request).unwrap();

    assert_eq!(first.path_value, second.path_value);
    assert_eq!(first.managed, second.managed);
    assert_eq!(fx.state_json(), state_after_first);
    assert_eq!(fx.registry.writes(), 1);
}

#[test]
fn manual_edits_between_runs_are_kept() {
    let fx = Fixture::new("/usr/bin");
    let request = ApplyRequest::ensure(["/opt/a"]);
    fx.reconciler().apply_managed_paths(Scope::User, &request).unwrap();

    // The user moved our entry to the end and added one of their own.
    fx.registry.set_value(Scope::User, "/home/me/bin:/usr/bin:/opt/a/");

    let outcome = fx.reconciler().apply_managed_paths(Scope::User, &request).unwrap();
    assert_eq!(outcome.path_value, "/opt/a:/home/me/bin:/usr/bin");
}

#[test]
fn revert_removes_only_managed_entries() {
    let fx = Fixture::new("/usr/bin:/home/me/bin");
    let py = InterpreterRecord::path_scan("/opt/py311/python3", "3.11.4", "python3");
    fx.reconciler()
        .apply_managed_paths(
            Scope::User,
            &ApplyRequest::ensure(["/opt/tools"]).with_default(Some(py)),
        )
        .unwrap();

    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::revert())
        .unwrap();

    assert_eq!(outcome.path_value, "/usr/bin:/home/me/bin");
    assert!(outcome.managed.is_empty());
    assert_eq!(
        fx.state_json(),
        serde_json::json!({"user": {"pymate_managed_paths": []}})
    );
    assert!(fx.store.load().scope(Scope::User).is_empty());
}

#[test]
fn directory_already_on_path_is_claimed_without_touching_user_copy() {
    let fx = Fixture::new("/usr/bin:/home/me/bin");
    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/home/me/bin/"]))
        .unwrap();

    assert_eq!(outcome.managed, [PathBuf::from("/home/me/bin")]);
    assert_eq!(outcome.shadowed_user_entries, [PathBuf::from("/home/me/bin")]);
    assert_eq!(fx.user_path(), "/home/me/bin:/usr/bin:/home/me/bin");

    let reverted = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::revert())
        .unwrap();
    assert_eq!(reverted.path_value, "/usr/bin:/home/me/bin");
}

#[test]
fn default_interpreter_behind_another_takes_precedence() {
    let fx = Fixture::new("/opt/py312:/opt/py311:/usr/bin");
    let py311 = InterpreterRecord::path_scan("/opt/py311/python3", "3.11.4", "python3");

    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::default().with_default(Some(py311)))
        .unwrap();
    assert_eq!(fx.user_path(), "/opt/py311:/opt/py312:/opt/py311:/usr/bin");

    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::revert())
        .unwrap();
    assert_eq!(fx.user_path(), "/opt/py312:/opt/py311:/usr/bin");
}

#[test]
fn failed_state_save_rolls_back_path() {
    let fx = Fixture::new("/usr/bin");
    // A directory where the state file should be makes the save fail.
    std::fs::create_dir(fx.store.path()).unwrap();

    let err = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap_err();
    assert!(matches!(err, Error::Fs(_)));
    assert_eq!(fx.user_path(), "/usr/bin");
    assert_eq!(fx.registry.writes(), 2);
    assert_eq!(fx.registry.broadcasts(), 0);

    std::fs::remove_dir(fx.store.path()).unwrap();
    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap();
    assert_eq!(outcome.path_value, "/opt/a:/usr/bin");
    assert!(outcome.shadowed_user_entries.is_empty());

    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::revert())
        .unwrap();
    assert_eq!(fx.user_path(), "/usr/bin");
}

#[test]
fn failed_write_leaves_everything_untouched() {
    let fx = Fixture::new("/usr/bin");
    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap();
    let state_before = std::fs::read(fx.store.path()).unwrap();

    fx.registry.fail_writes(true);
    let err = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/b"]))
        .unwrap_err();

    assert!(matches!(err, Error::Io { .. }));
    assert_eq!(fx.user_path(), "/opt/a:/usr/bin");
    assert_eq!(std::fs::read(fx.store.path()).unwrap(), state_before);
    assert_eq!(fx.registry.broadcasts(), 1);
}

#[test]
fn denied_scope_reports_privilege_required() {
    let fx = Fixture::new("/usr/bin");
    fx.registry.deny_scope(Scope::System);

    let err = fx
        .reconciler()
        .apply_managed_paths(Scope::System, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap_err();

    assert!(err.needs_elevation());
    assert!(!fx.store.path().exists());
}

#[test]
fn failed_broadcast_is_not_an_error() {
    let fx = Fixture::new("/usr/bin");
    fx.registry.fail_broadcast(true);

    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap();

    assert!(!outcome.broadcast_ok);
    assert_eq!(fx.store.load().scope(Scope::User).directories, [PathBuf::from("/opt/a")]);
}

#[test]
fn corrupt_state_is_treated_as_empty() {
    let fx = Fixture::new("/usr/bin");
    std::fs::write(fx.store.path(), "{\"user\": {\"pymate_managed_paths\": [").unwrap();

    let outcome = fx
        .reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/a"]))
        .unwrap();

    assert_eq!(outcome.path_value, "/opt/a:/usr/bin");
    assert_eq!(
        fx.state_json(),
        serde_json::json!({"user": {"pymate_managed_paths": ["/opt/a"]}})
    );
}

#[test]
fn scopes_are_independent() {
    let fx = Fixture::new("/usr/bin");
    fx.registry.set_value(Scope::System, "/sbin");

    fx.reconciler()
        .apply_managed_paths(Scope::System, &ApplyRequest::ensure(["/opt/sys"]))
        .unwrap();
    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::ensure(["/opt/usr"]))
        .unwrap();
    fx.reconciler()
        .apply_managed_paths(Scope::User, &ApplyRequest::revert())
        .unwrap();

    assert_eq!(fx.registry.read(Scope::System).unwrap(), "/opt/sys:/sbin");
    assert_eq!(fx.user_path(), "/usr/bin");
    assert_eq!(
        fx.store.load().scope(Scope::System).directories,
        [PathBuf::from("/opt/sys")]
    );
}
