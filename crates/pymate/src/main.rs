mod cli;
mod logging;
mod runtime;

use clap::Parser;
use cli::app::App;
use pymate_platform::privilege::{RELAUNCH_EXIT_CODE, relaunch_elevated};
use runtime::Runtime;
use std::process::ExitCode;

fn main() -> ExitCode {
    let app = App::parse();
    logging::init(app.verbose);

    let elevate = app.elevate;
    let runtime = Runtime::detect();
    match app.cmd.run(&runtime) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, elevate),
    }
}

fn report(err: &anyhow::Error, elevate: bool) -> ExitCode {
    let needs_elevation = err
        .downcast_ref::<pymate_core::Error>()
        .is_some_and(pymate_core::Error::needs_elevation);

    if needs_elevation {
        if elevate {
            let args: Vec<String> = std::env::args()
                .skip(1)
                .filter(|a| a != "--elevate")
                .collect();
            match relaunch_elevated(&args) {
                Ok(()) => {
                    eprintln!("continuing in an elevated window");
                    std::process::exit(RELAUNCH_EXIT_CODE);
                }
                Err(relaunch_err) => eprintln!("error: cannot relaunch elevated: {relaunch_err}"),
            }
        } else {
            eprintln!(
                "hint: run from an administrator prompt, \
                 or add --elevate to relaunch as administrator"
            );
        }
    }

    eprintln!("error: {err:#}");
    ExitCode::FAILURE
}
