use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::status::Status;

#[derive(Args, Clone, Debug)]
pub struct StatusArg {}

impl StatusArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let ctx = rt.context();
        let doc = rt.store.load();
        let active = ctx.resolve_active(&doc, rt.discovery.as_ref());
        print!("{}", Status::collect(ctx.markers(), active, &doc));
        Ok(())
    }
}
