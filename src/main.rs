use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ctxwatch_core::config::{Command, Config, Settings};
use ctxwatch_core::monitor::{inspect_transcript, run_hook};

fn main() -> ExitCode {
    let cli = parse_cli(std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Setup logging
    setup_logging(cli.debug);

    match &cli.command {
        Some(Command::Inspect { transcript, json }) => match run_inspect(&cli, transcript, *json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("ctxwatch: {:#}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            let settings = hook_settings(&cli);
            if let Some(advisory) = run_hook(&settings, io::stdin().lock()) {
                // A closed stdout is not our problem to report
                let _ = writeln!(io::stdout().lock(), "{}", advisory);
            }
            ExitCode::SUCCESS
        }
    }
}

/// Parse CLI arguments; in hook mode a bad argument must not fail the host.
///
/// Only `--help`, `--version` and errors in an `inspect` invocation are
/// returned for clap to report.
fn parse_cli<I, T>(args: I) -> std::result::Result<Config, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match Config::try_parse_from(&args) {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Err(e)
        }
        // Interactive use gets the usual clap error
        Err(e) if args.iter().skip(1).any(|a| a == "inspect") => Err(e),
        Err(_) => Ok(Config::default()),
    }
}

/// Logs go to stderr only; stdout carries the advisory line.
///
/// Silent unless `--debug` or `RUST_LOG` asks otherwise.
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("ctxwatch=debug,ctxwatch_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Settings for hook mode.
///
/// Invalid CLI overrides are dropped in favor of the config file; an
/// unreadable or invalid config file falls back to defaults.
fn hook_settings(cli: &Config) -> Settings {
    let file_settings = match Settings::load(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Using default settings: {:#}", e);
            return Settings::default();
        }
    };

    let mut settings = file_settings.clone();
    settings.merge_cli(cli);
    let Err(e) = settings.validate() else {
        return settings;
    };

    match file_settings.validate() {
        Ok(()) => {
            warn!("Ignoring CLI overrides, using config file settings: {}", e);
            file_settings
        }
        Err(file_err) => {
            warn!("Using default settings: invalid config file: {}", file_err);
            Settings::default()
        }
    }
}

/// Load the config file, apply CLI overrides, and validate
fn load_settings(cli: &Config) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(cli);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn run_inspect(cli: &Config, transcript: &std::path::Path, json: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let report = inspect_transcript(&settings, transcript)?;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", report)?;
    }
    Ok(())
}
