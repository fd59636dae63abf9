//! Per-user base directories.
//!
//! - config: `%APPDATA%` / `$XDG_CONFIG_HOME` / `~/.config`
//! - data: `%LOCALAPPDATA%` / `$XDG_DATA_HOME` / `~/.local/share`
//! - temp: `%TEMP%` / `$TMPDIR` / `/tmp`

use std::env;
use std::path::PathBuf;

pub fn user_home() -> Option<PathBuf> {
    home::home_dir()
}

fn from_env(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn user_config() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        from_env("APPDATA").or_else(|| user_home().map(|p| p.join("AppData").join("Roaming")))
    }
    #[cfg(not(target_os = "windows"))]
    {
        from_env("XDG_CONFIG_HOME").or_else(|| user_home().map(|p| p.join(".config")))
    }
}

pub fn user_data() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        from_env("LOCALAPPDATA").or_else(|| user_home().map(|p| p.join("AppData").join("Local")))
    }
    #[cfg(not(target_os = "windows"))]
    {
        from_env("XDG_DATA_HOME").or_else(|| user_home().map(|p| p.join(".local").join("share")))
    }
}

pub fn user_temp() -> PathBuf {
    env::temp_dir()
}
