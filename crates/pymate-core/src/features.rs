//! Named on/off features stored in `advanced_features.json`.

use crate::error::{Error, Result};
use pymate_fs::AtomicWriteOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Export `FORCE_COLOR=1` in session scripts.
    ColoredLogging,
    /// Alias `py` to the active interpreter in Windows session scripts.
    PyAlias,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::ColoredLogging, Feature::PyAlias];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::ColoredLogging => "colored-logging",
            Feature::PyAlias => "py-alias",
        }
    }

    /// Key in the features file.
    pub fn key(self) -> &'static str {
        match self {
            Feature::ColoredLogging => "enable_colored_logging",
            Feature::PyAlias => "add_py_alias_to_python_exe",
        }
    }

    pub fn default_enabled(self) -> bool {
        match self {
            Feature::ColoredLogging => false,
            Feature::PyAlias => cfg!(windows),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Feature::ColoredLogging => "force colored output from Python tools (FORCE_COLOR=1)",
            Feature::PyAlias => "make `py` run the active interpreter (Windows shells)",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Feature::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s) || f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

/// Persisted feature state. `None` means "never set": the default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(
        rename = "enable_colored_logging",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    colored_logging: Option<bool>,

    #[serde(
        rename = "add_py_alias_to_python_exe",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    py_alias: Option<bool>,
}

impl FeatureFlags {
    /// Load from `path`; a missing or damaged file gives the defaults.
    pub fn load(path: &Path) -> Self {
        let bytes = match pymate_fs::read_if_exists(path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(error = %err, "cannot read feature flags, using defaults");
                return Self::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "corrupt feature flags, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        pymate_fs::atomic_write(path, &bytes, AtomicWriteOptions::default())?;
        Ok(())
    }

    fn slot(&mut self, feature: Feature) -> &mut Option<bool> {
        match feature {
            Feature::ColoredLogging => &mut self.colored_logging,
            Feature::PyAlias => &mut self.py_alias,
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        let value = match feature {
            Feature::ColoredLogging => self.colored_logging,
            Feature::PyAlias => self.py_alias,
        };
        value.unwrap_or_else(|| feature.default_enabled())
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        *self.slot(feature) = Some(enabled);
    }

    /// Flip `feature` and return its new state.
    pub fn toggle(&mut self, feature: Feature) -> bool {
        let enabled = !self.is_enabled(feature);
        self.set(feature, enabled);
        enabled
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.is_enabled(f)))
    }
}
