//! Main application entry point (native).

use raidboard_app::{App, AppConfig, AppError, Script};
use raidboard_core::config::BoardConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: raidboard <script.json> [config.json]";

fn run(script_path: &Path, config_path: Option<&Path>) -> Result<String, AppError> {
    let board = match config_path {
        Some(path) => BoardConfig::from_file(path)?,
        None => BoardConfig::default(),
    };
    let script = Script::from_file(script_path)?;
    let base = script_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let config = AppConfig {
        board,
        asset_dir: base.clone(),
        output_dir: base,
        ..AppConfig::default()
    };

    let report = App::new(config).run(&script)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Raidboard");

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let (script, config) = match args.as_slice() {
        [script] => (script, None),
        [script, config] => (script, Some(config.as_path())),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(script, config) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
