mod cmd;

use std::process::ExitCode;

use clap::error::ErrorKind as ArgsErrorKind;
use clap::Parser;

use cmd::{App, RunCommand};

#[tokio::main]
async fn main() -> ExitCode {
    let app = match App::try_parse() {
        Ok(app) => app,
        Err(err) => {
            let _ = err.print();
            if matches!(
                err.kind(),
                ArgsErrorKind::DisplayHelp
                    | ArgsErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ArgsErrorKind::DisplayVersion
            ) {
                return ExitCode::SUCCESS;
            }
            return ExitCode::from(3);
        }
    };

    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Command error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
