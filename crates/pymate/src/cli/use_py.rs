use super::{print_session, resolve_flavor};
use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use pymate_core::select::{Selector, select};
use pymate_core::session::{ScriptFlavor, SessionRequest};
use tracing::info;

#[derive(Args, Clone, Debug)]
pub struct UseArg {
    /// Listing number from `scan`, a version (3.11, python3) or a path
    pub selector: Selector,

    /// Script flavor; detected from the running shell by default
    #[arg(long, value_enum)]
    pub shell: Option<ScriptFlavor>,
}

impl UseArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let mut ctx = rt.context();
        let py = select(&self.selector, ctx.discovered(), rt.discovery.as_ref())?;
        info!(interpreter = %py, "selected");
        ctx.select(py);

        let script = rt.write_session(
            ctx.selected(),
            &SessionRequest::default(),
            resolve_flavor(self.shell),
        )?;
        print_session(&script);
        Ok(())
    }
}
