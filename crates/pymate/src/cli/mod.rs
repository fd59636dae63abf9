pub mod add_path;
pub mod app;
pub mod completions;
pub mod default;
pub mod env;
pub mod feature;
pub mod revert;
pub mod scan;
pub mod status;
pub mod use_py;

use pymate_core::reconcile::ApplyOutcome;
use pymate_core::session::{ScriptFlavor, SessionScript};

/// `--shell` if given, else the flavor for the detected shell, else the
/// platform default.
pub fn resolve_flavor(explicit: Option<ScriptFlavor>) -> ScriptFlavor {
    explicit
        .or_else(|| pymate_platform::shell::detect().and_then(ScriptFlavor::for_shell))
        .unwrap_or_else(ScriptFlavor::platform_default)
}

/// `KEY=VALUE` command-line pairs.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

pub fn print_session(script: &SessionScript) {
    println!("{}", script.path.display());
    eprintln!("run this to apply it: {}", script.flavor.source_hint(&script.path));
}

pub fn print_outcome(outcome: &ApplyOutcome) {
    println!("{} PATH: {}", outcome.scope, outcome.path_value);
    for dir in &outcome.managed {
        println!("  managed: {}", dir.display());
    }
    for dir in &outcome.shadowed_user_entries {
        println!("  also further down PATH (kept there): {}", dir.display());
    }
    if !outcome.broadcast_ok {
        eprintln!("note: running programs were not notified; open a new terminal");
    } else {
        eprintln!("open a new terminal to pick up the change");
    }
}
