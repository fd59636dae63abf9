//! Shell detection and helpers.

use query_shell::Shell as QueryShell;
use std::fmt;

/// Shells a session script can be written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Pwsh,
    Cmd,
    Nushell,
    Elvish,
    Ion,
    Xonsh,
    Unknown,
}

fn from_query_shell(qs: QueryShell) -> Shell {
    match qs {
        QueryShell::Bash => Shell::Bash,
        QueryShell::Zsh => Shell::Zsh,
        QueryShell::Fish => Shell::Fish,
        QueryShell::Powershell => Shell::Powershell,
        QueryShell::Nushell => Shell::Nushell,
        QueryShell::Elvish => Shell::Elvish,
        QueryShell::Ion => Shell::Ion,
        QueryShell::Xonsh => Shell::Xonsh,
        _ => Shell::Unknown,
    }
}

/// Detect the shell that launched this process.
///
/// Returns `None` if detection fails.
pub fn detect() -> Option<Shell> {
    query_shell::get_shell().ok().map(from_query_shell)
}

impl Shell {
    /// Executable name, `None` for [`Shell::Unknown`].
    fn executable(self) -> Option<&'static str> {
        match self {
            Shell::Bash => Some("bash"),
            Shell::Zsh => Some("zsh"),
            Shell::Fish => Some("fish"),
            Shell::Powershell => Some("powershell"),
            Shell::Pwsh => Some("pwsh"),
            Shell::Cmd => Some("cmd.exe"),
            Shell::Nushell => Some("nu"),
            Shell::Elvish => Some("elvish"),
            Shell::Ion => Some("ion"),
            Shell::Xonsh => Some("xonsh"),
            Shell::Unknown => None,
        }
    }

    /// Whether the shell understands POSIX `export`/`alias` syntax.
    pub fn is_posix(self) -> bool {
        matches!(self, Shell::Bash | Shell::Zsh)
    }

    pub fn is_powershell(self) -> bool {
        matches!(self, Shell::Powershell | Shell::Pwsh)
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable().unwrap_or("unknown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_executable() {
        assert_eq!(Shell::Zsh.to_string(), "zsh");
        assert_eq!(Shell::Cmd.to_string(), "cmd.exe");
        assert_eq!(Shell::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_classification() {
        assert!(Shell::Bash.is_posix());
        assert!(!Shell::Fish.is_posix());
        assert!(Shell::Pwsh.is_powershell());
    }
}
