use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;

mod app;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Windowed,
    Replay { script_path: PathBuf },
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args {
        [] => Ok(Command::Windowed),
        [verb, path] if verb == "replay" => Ok(Command::Replay {
            script_path: PathBuf::from(path),
        }),
        [verb] if verb == "replay" => Err("usage: sandbox replay <script.json>".to_string()),
        [other, ..] => Err(format!(
            "unknown command '{other}'; usage: sandbox [replay <script.json>]"
        )),
    }
}

fn main() -> ExitCode {
    app::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            error!(error = message.as_str(), "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Windowed => app::run_windowed(),
        Command::Replay { script_path } => app::run_replay(&script_path),
    }
}
