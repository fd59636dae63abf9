//! Where PyMate keeps its files.

use crate::error::{Error, Result};
use crate::session::ScriptFlavor;
use pymate_platform::dir;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "PyMate";
pub const CONFIG_DIR_VAR: &str = "PYMATE_CONFIG_DIR";

const STATE_FILE: &str = "persistent_path.json";
const FEATURES_FILE: &str = "advanced_features.json";
const SESSION_SCRIPT_STEM: &str = "pymate_env_setup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    config_dir: PathBuf,
    scripts_dir: PathBuf,
    temp_dir: PathBuf,
}

impl Layout {
    /// Standard per-user locations, `$PYMATE_CONFIG_DIR` overriding the
    /// config directory.
    pub fn detect() -> Self {
        let fallback = || dir::user_temp().join(APP_DIR);

        let config_dir = std::env::var_os(CONFIG_DIR_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dir::user_config().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(fallback);

        let scripts_dir = dir::user_data()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(fallback)
            .join("scripts");

        Self {
            config_dir,
            scripts_dir,
            temp_dir: dir::user_temp(),
        }
    }

    /// Everything under one root.
    pub fn at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            scripts_dir: root.join("scripts"),
            temp_dir: root.join("tmp"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory for scripts PyMate generates for the user.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn state_file(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE)
    }

    pub fn features_file(&self) -> PathBuf {
        self.config_dir.join(FEATURES_FILE)
    }

    pub fn session_script(&self, flavor: ScriptFlavor) -> PathBuf {
        self.temp_dir
            .join(format!("{SESSION_SCRIPT_STEM}.{}", flavor.extension()))
    }

    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.scripts_dir, &self.temp_dir] {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        Ok(())
    }
}
