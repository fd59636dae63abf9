use super::print_outcome;
use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::reconcile::{ApplyRequest, extra_managed_dirs};
use pymate_core::scope::Scope;
use pymate_core::select::{Selector, select};

#[derive(Args, Clone, Debug)]
pub struct DefaultArg {
    /// Listing number from `scan`, a version (3.11, python3) or a path
    pub selector: Selector,

    #[arg(long, value_enum, default_value_t = Scope::User)]
    pub scope: Scope,
}

impl DefaultArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let discovered = rt.scan();
        let py = select(&self.selector, &discovered, rt.discovery.as_ref())?;

        // Directories added with `add-path` survive a change of default.
        let extras = extra_managed_dirs(&rt.store.load().scope(self.scope));
        let request = ApplyRequest::ensure(extras).with_default(Some(py));

        let outcome = rt.apply(self.scope, &request)?;
        print_outcome(&outcome);
        Ok(())
    }
}
