#![cfg(unix)]

use proptest::prelude::*;
use pymate_core::reconcile::{ApplyRequest, Reconciler, reconcile};
use pymate_core::registry::{MemoryRegistry, PathRegistry};
use pymate_core::scope::Scope;
use pymate_core::state::StateStore;
use pymate_platform::env::{PathEntries, path_key};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directory names shared by both generators so that requested
/// directories sometimes collide with user entries.
fn dir_name() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u8..6).prop_map(|n| format!("/u{n}")),
        (0u8..6).prop_map(|n| format!("/m{n}")),
    ]
}

/// The same directory written in different but equivalent ways.
fn spelling(dir: String) -> impl Strategy<Value = String> {
    prop_oneof![
        Just(dir.clone()),
        Just(format!("{dir}/")),
        Just(format!("/.{dir}")),
        Just(format!("{dir}/sub/..")),
    ]
}

fn user_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((0u8..6).prop_map(|n| format!("/u{n}")), 0..6)
}

fn desired() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(dir_name().prop_flat_map(spelling), 0..6)
}

fn keys(entries: &[String]) -> Vec<String> {
    entries.iter().map(|e| path_key(Path::new(e))).collect()
}

fn apply(registry: &MemoryRegistry, store: &StateStore, request: &ApplyRequest) {
    Reconciler::new(registry, store)
        .apply_managed_paths(Scope::User, request)
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reapplying_is_idempotent(user in user_path(), dirs in desired()) {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.json"));
        let registry = MemoryRegistry::new(':').with_value(Scope::User, user.join(":"));
        let request = ApplyRequest::ensure(&dirs);

        apply(&registry, &store, &request);
        let path_once = registry.read(Scope::User).unwrap();
        let state_once = store.load();

        apply(&registry, &store, &request);
        prop_assert_eq!(registry.read(Scope::User).unwrap(), path_once);
        prop_assert_eq!(store.load(), state_once);
    }

    #[test]
    fn user_entries_keep_their_relative_order(
        user in user_path(),
        first in desired(),
        second in desired(),
    ) {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.json"));
        let registry = MemoryRegistry::new(':').with_value(Scope::User, user.join(":"));

        apply(&registry, &store, &ApplyRequest::ensure(&first));
        apply(&registry, &store, &ApplyRequest::ensure(&second));

        // Everything behind the managed prefix is the user's PATH, as it was.
        let managed = store.load().scope(Scope::User).directories;
        let after = PathEntries::parse(&registry.read(Scope::User).unwrap(), ':');
        prop_assert_eq!(keys(&after.entries()[managed.len()..]), keys(&user));
    }

    #[test]
    fn managed_entries_come_first_and_are_unique(user in user_path(), dirs in desired()) {
        let out = reconcile(&user.join(":"), ':', &[], &ApplyRequest::ensure(&dirs)).unwrap();

        let entries = PathEntries::parse(&out.path_value, ':');
        let managed: Vec<String> = out
            .managed
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        prop_assert_eq!(&entries.entries()[..managed.len()], managed.as_slice());

        let unique: HashSet<String> = keys(&managed).into_iter().collect();
        prop_assert_eq!(unique.len(), managed.len());

        // First-seen order of the requested directories.
        let mut seen = HashSet::new();
        let expected: Vec<String> = keys(&dirs)
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
        prop_assert_eq!(keys(&managed), expected);
    }

    #[test]
    fn revert_restores_user_path(
        user in user_path(),
        first in desired(),
        second in desired(),
    ) {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.json"));
        let registry = MemoryRegistry::new(':').with_value(Scope::User, user.join(":"));

        apply(&registry, &store, &ApplyRequest::ensure(&first));
        apply(&registry, &store, &ApplyRequest::ensure(&second));
        apply(&registry, &store, &ApplyRequest::revert());

        prop_assert!(store.load().scope(Scope::User).directories.is_empty());
        let after = PathEntries::parse(&registry.read(Scope::User).unwrap(), ':');
        prop_assert_eq!(keys(after.entries()), keys(&user));

        // No directory the user never had is left behind.
        let user_keys: HashSet<String> = keys(&user).into_iter().collect();
        let added: Vec<PathBuf> = second.iter().map(PathBuf::from).collect();
        prop_assert!(
            added
                .iter()
                .map(|p| path_key(p))
                .filter(|k| !user_keys.contains(k))
                .all(|k| !after.keys().contains(&k))
        );
    }
}
