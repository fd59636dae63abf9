use crate::version::{PyVersion, VersionError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static SPEC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:python|py)?(?<major>[0-9]+)(?:\.(?<minor>[0-9]+))?(?:\.(?<micro>[0-9]+))?$").unwrap()
});

/// A partially specified version, e.g. `3`, `3.11` or `python3.11.4`.
/// Missing components match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    pub major: u64,
    pub minor: Option<u64>,
    pub micro: Option<u64>,
}

impl VersionSpec {
    pub fn matches(&self, version: &PyVersion) -> bool {
        self.major == version.major
            && self.minor.is_none_or(|m| m == version.minor)
            && self.micro.is_none_or(|m| m == version.micro)
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SPEC_REGEX
            .captures(s.trim())
            .ok_or_else(|| VersionError::InvalidSpec(s.to_string()))?;

        let component = |name: &str| -> Result<Option<u64>, VersionError> {
            caps.name(name)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map_err(|_| VersionError::InvalidSpec(s.to_string()))
        };

        Ok(Self {
            major: component("major")?.ok_or_else(|| VersionError::InvalidSpec(s.to_string()))?,
            minor: component("minor")?,
            micro: component("micro")?,
        })
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
            if let Some(micro) = self.micro {
                write!(f, ".{micro}")?;
            }
        }
        Ok(())
    }
}
