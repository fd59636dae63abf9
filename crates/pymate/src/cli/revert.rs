use super::print_outcome;
use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::reconcile::ApplyRequest;
use pymate_core::scope::Scope;

#[derive(Args, Clone, Debug)]
pub struct RevertArg {
    #[arg(long, value_enum, default_value_t = Scope::User)]
    pub scope: Scope,
}

impl RevertArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let outcome = rt.apply(self.scope, &ApplyRequest::revert())?;
        print_outcome(&outcome);
        Ok(())
    }
}
