use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::interpreter::InterpreterRecord;
use pymate_version::VersionSpec;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How the user names an interpreter: a 1-based position in the scan
/// listing, a version such as `3.11` or `python3`, or an executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Version(VersionSpec),
    Path(PathBuf),
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Ok(Selector::Index(index));
        }
        if let Ok(spec) = s.parse::<VersionSpec>() {
            return Ok(Selector::Version(spec));
        }
        Ok(Selector::Path(PathBuf::from(s)))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "#{i}"),
            Selector::Version(spec) => write!(f, "{spec}"),
            Selector::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Pick an interpreter from `discovered` (newest first).
///
/// A path does not have to be in the list; it only has to exist.
pub fn select(
    selector: &Selector,
    discovered: &[InterpreterRecord],
    discovery: &dyn Discovery,
) -> Result<InterpreterRecord> {
    let not_found = || Error::InterpreterNotFound(selector.to_string());

    match selector {
        Selector::Path(path) => {
            if !path.is_file() {
                return Err(not_found());
            }
            Ok(discovered
                .iter()
                .find(|r| r.is_same(path))
                .cloned()
                .unwrap_or_else(|| discovery.probe(path)))
        }
        _ if discovered.is_empty() => Err(Error::DiscoveryEmpty),
        Selector::Index(index) => index
            .checked_sub(1)
            .and_then(|i| discovered.get(i))
            .cloned()
            .ok_or_else(not_found),
        Selector::Version(spec) => discovered
            .iter()
            .find(|r| r.parsed_version().is_some_and(|v| spec.matches(&v)))
            .cloned()
            .ok_or_else(not_found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<InterpreterRecord> {
        vec![
            InterpreterRecord::path_scan("/opt/py312/python3", "3.12.1", "python3"),
            InterpreterRecord::path_scan("/opt/py311b/python3", "3.11.9", "python3"),
            InterpreterRecord::path_scan("/opt/py311a/python3", "3.11.2", "python3"),
        ]
    }

    fn sel(s: &str) -> Selector {
        s.parse().unwrap()
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(sel("2"), Selector::Index(2));
        assert!(matches!(sel("3.11"), Selector::Version(_)));
        assert!(matches!(sel("python3"), Selector::Version(_)));
        assert!(matches!(sel("/usr/bin/python3"), Selector::Path(_)));
    }

    #[test]
    fn test_select_by_index() {
        let list = listing();
        assert_eq!(select(&sel("1"), &list, &list).unwrap().version(), "3.12.1");
        assert!(matches!(
            select(&sel("0"), &list, &list),
            Err(Error::InterpreterNotFound(_))
        ));
        assert!(matches!(
            select(&sel("4"), &list, &list),
            Err(Error::InterpreterNotFound(_))
        ));
    }

    #[test]
    fn test_select_by_version_takes_newest_match() {
        let list = listing();
        assert_eq!(select(&sel("3.11"), &list, &list).unwrap().version(), "3.11.9");
        assert_eq!(select(&sel("3.11.2"), &list, &list).unwrap().version(), "3.11.2");
        assert!(select(&sel("3.10"), &list, &list).is_err());
    }

    #[test]
    fn test_select_empty_listing() {
        let empty: Vec<InterpreterRecord> = Vec::new();
        assert!(matches!(
            select(&sel("1"), &empty, &empty),
            Err(Error::DiscoveryEmpty)
        ));
    }

    #[test]
    fn test_select_path_outside_listing() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("python3.11");
        std::fs::write(&exe, "").unwrap();

        let list = listing();
        let picked = select(&Selector::Path(exe.clone()), &list, &list).unwrap();
        assert!(picked.is_same(&exe));

        let missing = Selector::Path(dir.path().join("nope"));
        assert!(matches!(
            select(&missing, &list, &list),
            Err(Error::InterpreterNotFound(_))
        ));
    }
}
