use crate::runtime::Runtime;
use anyhow::Result;
use clap::Args;

#[derive(Args, Clone, Debug)]
pub struct ScanArg {
    /// Print executable paths only
    #[arg(long, short)]
    pub quiet: bool,
}

impl ScanArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let found = rt.scan();
        if found.is_empty() {
            eprintln!("{}", pymate_core::Error::DiscoveryEmpty);
            return Ok(());
        }

        for (i, py) in found.iter().enumerate() {
            if self.quiet {
                println!("{}", py.path().display());
            } else {
                println!("{:>3}. {}", i + 1, py.display_name());
            }
        }
        Ok(())
    }
}
