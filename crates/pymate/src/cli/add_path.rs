use super::print_outcome;
use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::reconcile::{ApplyRequest, extra_managed_dirs};
use pymate_core::scope::Scope;
use std::path::PathBuf;

#[derive(Args, Clone, Debug)]
pub struct AddPathArg {
    /// Directories to add; PyMate's scripts directory if none are given
    #[arg(value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Scope::User)]
    pub scope: Scope,
}

impl AddPathArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let dirs = if self.dirs.is_empty() {
            vec![rt.layout.scripts_dir().to_path_buf()]
        } else {
            self.dirs
        };

        let recorded = rt.store.load().scope(self.scope);
        let default_interpreter = recorded
            .default_interpreter
            .as_deref()
            .filter(|exe| exe.is_file())
            .map(|exe| rt.discovery.probe(exe));

        let mut desired = extra_managed_dirs(&recorded);
        desired.extend(dirs);
        let request = ApplyRequest::ensure(desired).with_default(default_interpreter);

        let outcome = rt.apply(self.scope, &request)?;
        print_outcome(&outcome);
        Ok(())
    }
}
