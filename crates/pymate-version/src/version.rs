//! Full Python versions.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<major>[0-9]+)\.(?<minor>[0-9]+)(?:\.(?<micro>[0-9]+))?(?:(?<pre>a|b|rc)(?<pre_num>[0-9]+))?\+?$").unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid python version: {0}")]
    Invalid(String),
    #[error("invalid version spec: {0}")]
    InvalidSpec(String),
    #[error("no version found in output: {0}")]
    NotInOutput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Alpha(n) => write!(f, "a{n}"),
            PreRelease::Beta(n) => write!(f, "b{n}"),
            PreRelease::Rc(n) => write!(f, "rc{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PyVersion {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub pre: Option<PreRelease>,
}

impl PyVersion {
    pub fn new(major: u64, minor: u64, micro: u64) -> Self {
        Self {
            major,
            minor,
            micro,
            pre: None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let caps = VERSION_REGEX
            .captures(s.trim())
            .ok_or_else(|| VersionError::Invalid(s.to_string()))?;

        let number = |name: &str| -> Result<u64, VersionError> {
            caps.name(name)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| VersionError::Invalid(s.to_string()))
        };

        let pre = match caps.name("pre").map(|m| m.as_str()) {
            Some("a") => Some(PreRelease::Alpha(number("pre_num")?)),
            Some("b") => Some(PreRelease::Beta(number("pre_num")?)),
            Some("rc") => Some(PreRelease::Rc(number("pre_num")?)),
            _ => None,
        };

        Ok(Self {
            major: number("major")?,
            minor: number("minor")?,
            micro: number("micro")?,
            pre,
        })
    }

    /// Pull the version out of `python --version` output
    /// (`Python 3.11.4`, possibly on stderr for old interpreters).
    pub fn from_version_output(output: &str) -> Result<Self, VersionError> {
        output
            .split_whitespace()
            .skip_while(|word| !word.eq_ignore_ascii_case("python"))
            .nth(1)
            .or_else(|| output.split_whitespace().next())
            .ok_or_else(|| VersionError::NotInOutput(output.trim().to_string()))
            .and_then(Self::parse)
            .map_err(|_| VersionError::NotInOutput(output.trim().to_string()))
    }

    /// `major.minor`, e.g. `3.11`.
    pub fn feature_release(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl Ord for PyVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.micro)
            .cmp(&(other.major, other.minor, other.micro))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for PyVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl std::str::FromStr for PyVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { PyVersion::parse(s) }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(pre) = &self.pre {
            write!(f, "{pre}")?;
        }
        Ok(())
    }
}
