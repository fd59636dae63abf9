//! Session activation scripts.
//!
//! A process cannot change its parent shell's environment, so session
//! changes are written to a script at a fixed temp path that the shell then
//! sources (`. /tmp/pymate_env_setup.sh`, `call %TEMP%\pymate_env_setup.bat`).
//! The file is overwritten on every call.

use crate::context::{ACTIVE_PATH_VAR, ACTIVE_VERSION_VAR};
use crate::error::{Error, Result};
use crate::features::{Feature, FeatureFlags};
use crate::interpreter::InterpreterRecord;
use crate::layout::Layout;
use pymate_fs::AtomicWriteOptions;
use pymate_platform::env::path_key;
use pymate_platform::shell::Shell;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Variables every session gets.
const STATIC_EXPORTS: [(&str, &str); 2] = [("PYTHONUTF8", "1"), ("PYTHON_COLOR", "1")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScriptFlavor {
    /// `sh`-compatible (bash, zsh, dash).
    Posix,
    /// Windows `cmd.exe` batch file.
    Cmd,
    #[value(name = "powershell")]
    PowerShell,
}

impl ScriptFlavor {
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            ScriptFlavor::Cmd
        } else {
            ScriptFlavor::Posix
        }
    }

    /// Flavor for a detected shell, if it can source one of ours.
    pub fn for_shell(shell: Shell) -> Option<Self> {
        match shell {
            Shell::Cmd => Some(ScriptFlavor::Cmd),
            s if s.is_powershell() => Some(ScriptFlavor::PowerShell),
            s if s.is_posix() => Some(ScriptFlavor::Posix),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ScriptFlavor::Posix => "sh",
            ScriptFlavor::Cmd => "bat",
            ScriptFlavor::PowerShell => "ps1",
        }
    }

    pub fn separator(self) -> char {
        match self {
            ScriptFlavor::Posix => ':',
            ScriptFlavor::Cmd | ScriptFlavor::PowerShell => ';',
        }
    }

    fn is_windows(self) -> bool {
        matches!(self, ScriptFlavor::Cmd | ScriptFlavor::PowerShell)
    }

    /// How to run the script in the current shell.
    pub fn source_hint(self, script: &Path) -> String {
        match self {
            ScriptFlavor::Posix => format!(". \"{}\"", script.display()),
            ScriptFlavor::Cmd => format!("call \"{}\"", script.display()),
            ScriptFlavor::PowerShell => format!(". '{}'", script.display()),
        }
    }
}

/// Caller-supplied additions to a session.
#[derive(Debug, Clone, Default)]
pub struct SessionRequest {
    pub extra_env: Vec<(String, String)>,
    pub extra_path_dirs: Vec<PathBuf>,
    pub extra_aliases: Vec<(String, String)>,
}

/// Everything a session script sets, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEnvironmentPlan {
    pub banner: Option<String>,
    pub exports: Vec<(String, String)>,
    pub prepend_dirs: Vec<PathBuf>,
    pub aliases: Vec<(String, String)>,
}

fn upsert(list: &mut Vec<(String, String)>, key: &str, value: &str) {
    match list.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => list.push((key.to_string(), value.to_string())),
    }
}

impl SessionEnvironmentPlan {
    pub fn build(
        active: Option<&InterpreterRecord>,
        request: &SessionRequest,
        features: &FeatureFlags,
        scripts_dir: &Path,
        flavor: ScriptFlavor,
    ) -> Self {
        let mut plan = Self::default();
        let mut dirs = Vec::new();

        if let Some(py) = active {
            plan.banner = Some(format!("Activating Python for session: {}", py.display_name()));
            upsert(&mut plan.exports, ACTIVE_PATH_VAR, &py.path().to_string_lossy());
            upsert(&mut plan.exports, ACTIVE_VERSION_VAR, py.version());

            let scripts = py.scripts_dir();
            if scripts.is_dir() {
                dirs.push(scripts);
            }
            dirs.push(py.dir());
        }

        if scripts_dir.is_dir() {
            dirs.push(scripts_dir.to_path_buf());
        }
        dirs.extend(request.extra_path_dirs.iter().cloned());

        let mut seen = HashSet::new();
        plan.prepend_dirs = dirs
            .into_iter()
            .filter(|d| seen.insert(path_key(d)))
            .collect();

        for (key, value) in STATIC_EXPORTS {
            upsert(&mut plan.exports, key, value);
        }
        if features.is_enabled(Feature::ColoredLogging) {
            upsert(&mut plan.exports, "FORCE_COLOR", "1");
        }
        for (key, value) in &request.extra_env {
            upsert(&mut plan.exports, key, value);
        }

        if let Some(py) = active {
            let exe = py.path().to_string_lossy();
            upsert(&mut plan.aliases, "python", &exe);
            upsert(&mut plan.aliases, "python3", &exe);
            if let Some(pip) = py.pip() {
                let pip = pip.to_string_lossy();
                upsert(&mut plan.aliases, "pip", &pip);
                upsert(&mut plan.aliases, "pip3", &pip);
            }
            if flavor.is_windows() && features.is_enabled(Feature::PyAlias) {
                upsert(&mut plan.aliases, "py", &exe);
            }
        }
        for (name, target) in &request.extra_aliases {
            upsert(&mut plan.aliases, name, target);
        }

        plan
    }

    /// Script text for `flavor`. Fails only for cmd, which has no way to
    /// quote a `"` inside a `set` or `doskey` value.
    pub fn render(&self, flavor: ScriptFlavor) -> Result<String> {
        let mut out = String::new();
        let nl = if flavor == ScriptFlavor::Cmd { "\r\n" } else { "\n" };
        let mut line = |s: String| {
            out.push_str(&s);
            out.push_str(nl);
        };

        match flavor {
            ScriptFlavor::Posix => line("#!/bin/sh".into()),
            ScriptFlavor::Cmd => line("@echo off".into()),
            ScriptFlavor::PowerShell => {}
        }

        if let Some(banner) = &self.banner {
            line(match flavor {
                ScriptFlavor::Posix => format!("echo {}", sh_quote(banner)),
                ScriptFlavor::Cmd => format!("echo {}", cmd_echo_escape(banner)),
                ScriptFlavor::PowerShell => format!("Write-Host {}", ps_quote(banner)),
            });
        }

        if !self.prepend_dirs.is_empty() {
            let mut joined = String::new();
            for dir in &self.prepend_dirs {
                let _ = write!(joined, "{}{}", dir.display(), flavor.separator());
            }
            line(match flavor {
                ScriptFlavor::Posix => format!("export PATH=\"{}$PATH\"", dq_escape(&joined)),
                ScriptFlavor::Cmd => format!("set \"PATH={}%PATH%\"", cmd_quoted(&joined)?),
                ScriptFlavor::PowerShell => {
                    format!("$env:PATH = {} + $env:PATH", ps_quote(&joined))
                }
            });
        }

        for (key, value) in &self.exports {
            line(match flavor {
                ScriptFlavor::Posix => format!("export {key}={}", sh_quote(value)),
                ScriptFlavor::Cmd => {
                    format!("set \"{}={}\"", cmd_quoted(key)?, cmd_quoted(value)?)
                }
                ScriptFlavor::PowerShell => format!("$env:{key} = {}", ps_quote(value)),
            });
        }

        for (name, target) in &self.aliases {
            line(match flavor {
                ScriptFlavor::Posix => format!("alias {name}={}", sh_quote(target)),
                ScriptFlavor::Cmd => format!(
                    "doskey {}=\"{}\" $*",
                    cmd_bare_word(name)?,
                    cmd_quoted(target)?.replace('$', "$$")
                ),
                ScriptFlavor::PowerShell => {
                    format!("function {name} {{ & {} @args }}", ps_quote(target))
                }
            });
        }

        Ok(out)
    }
}

fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn dq_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Unquoted `echo` text: metacharacters take a caret, `%` is doubled.
fn cmd_echo_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%%"),
            '^' | '&' | '|' | '<' | '>' | '(' | ')' | '"' => {
                out.push('^');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Text inside `"..."`. Metacharacters are literal there but `%` still
/// expands, and a `"` would end the quoted part.
fn cmd_quoted(s: &str) -> Result<String> {
    if s.contains('"') {
        return Err(Error::UnsafeScriptText {
            text: s.to_string(),
            reason: "double quotes cannot be escaped in cmd",
        });
    }
    Ok(s.replace('%', "%%"))
}

/// An unquoted name such as a doskey macro name.
fn cmd_bare_word(s: &str) -> Result<&str> {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || "\"%^&|<>()=".contains(c)) {
        return Err(Error::UnsafeScriptText {
            text: s.to_string(),
            reason: "not a plain name",
        });
    }
    Ok(s)
}

fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A written session script.
#[derive(Debug, Clone)]
pub struct SessionScript {
    pub path: PathBuf,
    pub flavor: ScriptFlavor,
    pub plan: SessionEnvironmentPlan,
}

pub struct SessionScriptGenerator<'a> {
    layout: &'a Layout,
    features: &'a FeatureFlags,
    flavor: ScriptFlavor,
}

impl<'a> SessionScriptGenerator<'a> {
    pub fn new(layout: &'a Layout, features: &'a FeatureFlags, flavor: ScriptFlavor) -> Self {
        Self {
            layout,
            features,
            flavor,
        }
    }

    /// Build the plan for `active` and overwrite the session script.
    pub fn generate(
        &self,
        active: Option<&InterpreterRecord>,
        request: &SessionRequest,
    ) -> Result<SessionScript> {
        let plan = SessionEnvironmentPlan::build(
            active,
            request,
            self.features,
            self.layout.scripts_dir(),
            self.flavor,
        );
        let path = self.layout.session_script(self.flavor);
        pymate_fs::atomic_write(
            &path,
            plan.render(self.flavor)?.as_bytes(),
            AtomicWriteOptions::default().executable(),
        )?;
        debug!(path = %path.display(), "wrote session script");

        Ok(SessionScript {
            path,
            flavor: self.flavor,
            plan,
        })
    }
}
