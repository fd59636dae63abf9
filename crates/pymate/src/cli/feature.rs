use super::{print_session, resolve_flavor};
use crate::runtime::Runtime;
use anyhow::Result;
use clap::{Args, Subcommand};
use pymate_core::features::Feature;
use pymate_core::session::{ScriptFlavor, SessionRequest};
use tracing::info;

#[derive(Args, Clone, Debug)]
pub struct FeatureArg {
    #[command(subcommand)]
    pub action: Option<FeatureAction>,

    /// Flavor of the regenerated session script
    #[arg(long, value_enum, global = true)]
    pub shell: Option<ScriptFlavor>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum FeatureAction {
    /// List features and their state
    List,
    Enable { feature: Feature },
    Disable { feature: Feature },
    Toggle { feature: Feature },
}

impl FeatureArg {
    pub fn run(self, rt: &Runtime) -> Result<()> {
        let path = rt.layout.features_file();
        let mut flags = rt.features();

        let (feature, enabled) = match self.action.unwrap_or(FeatureAction::List) {
            FeatureAction::List => {
                for (feature, enabled) in flags.iter() {
                    let state = if enabled { "on" } else { "off" };
                    println!("{:<16} {state:<4} {}", feature.name(), feature.description());
                }
                return Ok(());
            }
            FeatureAction::Enable { feature } => {
                flags.set(feature, true);
                (feature, true)
            }
            FeatureAction::Disable { feature } => {
                flags.set(feature, false);
                (feature, false)
            }
            FeatureAction::Toggle { feature } => (feature, flags.toggle(feature)),
        };

        flags.save(&path)?;
        info!(%feature, enabled, "feature updated");
        println!("{feature}: {}", if enabled { "on" } else { "off" });

        // Session scripts pick features up at generation time.
        let ctx = rt.context();
        let active = rt.active(&ctx);
        let script = rt.write_session(
            active.as_ref(),
            &SessionRequest::default(),
            resolve_flavor(self.shell),
        )?;
        print_session(&script);
        Ok(())
    }
}
