//! Meg Store CLI

use std::{fmt::Display, io, process::ExitCode};

use meg_store::logging;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(err) => {
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = logging::init(&cli.config.logging) {
        report(&err);

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match cli.run(&mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);

            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "failures are reported to the user on stderr")]
fn report(err: &impl Display) {
    eprintln!("error: {err}");
}
