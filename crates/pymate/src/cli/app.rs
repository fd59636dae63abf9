use super::{add_path, completions, default, env, feature, revert, scan, status, use_py};
use crate::runtime::Runtime;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "pymate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Switch Python interpreters per shell and manage their PATH entries",
    long_about = None,
    propagate_version = true
)]
pub struct App {
    /// More log output (-v info, -vv debug); PYMATE_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Relaunch as administrator when a change needs it
    #[arg(long, global = true)]
    pub elevate: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "ls", name = "scan", about = "List installed interpreters, newest first")]
    Scan(scan::ScanArg),
    #[command(name = "use", about = "Activate an interpreter for this shell session")]
    Use(use_py::UseArg),
    #[command(name = "env", about = "Regenerate the session script")]
    Env(env::EnvArg),
    #[command(name = "default", about = "Make an interpreter the persistent default")]
    Default(default::DefaultArg),
    #[command(name = "add-path", about = "Add directories to the persistent PATH")]
    AddPath(add_path::AddPathArg),
    #[command(name = "revert", about = "Remove every PATH entry PyMate added")]
    Revert(revert::RevertArg),
    #[command(name = "feature", about = "Show or change optional features")]
    Feature(feature::FeatureArg),
    #[command(name = "status", about = "Show the active interpreter and PATH state")]
    Status(status::StatusArg),
    #[command(name = "completions", about = "Print shell completions")]
    Completions(completions::CompletionsArg),
}

impl Commands {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        match self {
            Commands::Scan(arg) => arg.run(rt),
            Commands::Use(arg) => arg.run(rt),
            Commands::Env(arg) => arg.run(rt),
            Commands::Default(arg) => arg.run(rt),
            Commands::AddPath(arg) => arg.run(rt),
            Commands::Revert(arg) => arg.run(rt),
            Commands::Feature(arg) => arg.run(rt),
            Commands::Status(arg) => arg.run(rt),
            Commands::Completions(arg) => arg.run(),
        }
    }
}
