use super::{parse_pair, print_session, resolve_flavor};
use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::interpreter::{InterpreterRecord, user_scripts_dir};
use pymate_core::session::{ScriptFlavor, SessionRequest};
use pymate_platform::dir;
use std::path::PathBuf;

#[derive(Args, Clone, Debug)]
pub struct EnvArg {
    /// Extra directory to prepend to PATH (repeatable)
    #[arg(long, value_name = "DIR")]
    pub path: Vec<PathBuf>,

    /// Extra variable to export (repeatable)
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub set: Vec<(String, String)>,

    /// Extra alias (repeatable)
    #[arg(long, value_name = "NAME=COMMAND", value_parser = parse_pair)]
    pub alias: Vec<(String, String)>,

    /// Also prepend the per-user scripts directory of the active interpreter
    /// (`%APPDATA%\Python\Python<XY>\Scripts`, Windows only)
    #[arg(long)]
    pub user_scripts: bool,

    /// Script flavor; detected from the running shell by default
    #[arg(long, value_enum)]
    pub shell: Option<ScriptFlavor>,
}

impl EnvArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let ctx = rt.context();
        let active = rt.active(&ctx);
        if active.is_none() {
            eprintln!("no active interpreter; writing a script without one");
        }

        let mut extra_path_dirs = self.path;
        if self.user_scripts {
            match user_scripts(active.as_ref()) {
                Some(dir) => extra_path_dirs.push(dir),
                None => eprintln!("no user scripts directory found; skipping it"),
            }
        }

        let request = SessionRequest {
            extra_env: self.set,
            extra_path_dirs,
            extra_aliases: self.alias,
        };
        let script = rt.write_session(active.as_ref(), &request, resolve_flavor(self.shell))?;
        print_session(&script);
        Ok(())
    }
}

fn user_scripts(active: Option<&InterpreterRecord>) -> Option<PathBuf> {
    if !cfg!(windows) {
        return None;
    }
    let appdata = dir::user_config()?;
    let version = active.and_then(InterpreterRecord::parsed_version);
    user_scripts_dir(&appdata, version.as_ref())
}
