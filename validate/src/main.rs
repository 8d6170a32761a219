//! vehicle-remover-validate - operator tool for Vehicle Remover configurations.
//!
//! Works against a TOML world snapshot instead of a running game:
//!
//! ```text
//! vehicle-remover-validate init  --world city.toml
//! vehicle-remover-validate check --world city.toml [--json]
//! vehicle-remover-validate apply --world city.toml [--mode load-game] [--out after.toml] [--json]
//! ```
//!
//! `--config` points at the vehicle list (default `VehicleRemover.xml` in the
//! working directory).

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::EnvFilter;
use vehicle_remover_core::{ConfigStore, LoadMode, MOD_DESCRIPTION, MOD_NAME};

/// Env var naming a file to append logs to instead of stderr
const LOG_PATH_VAR: &str = "VEHICLE_REMOVER_LOG_PATH";

#[derive(Parser)]
#[command(
    version,
    about = MOD_DESCRIPTION,
    long_about = "Generate, check and dry-run Vehicle Remover configurations against a TOML world snapshot"
)]
struct Cli {
    /// Vehicle list to use
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an all-enabled vehicle list from the snapshot's catalog
    Init {
        #[arg(short, long)]
        world: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Compare the vehicle list against the snapshot's catalog
    Check {
        #[arg(short, long)]
        world: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Run a level load against the snapshot
    Apply {
        #[arg(short, long)]
        world: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Mode::LoadGame)]
        mode: Mode,
        /// Write the resulting world here
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    NewGame,
    LoadGame,
    NewGameFromScenario,
    NewMap,
    LoadMap,
    NewAsset,
    LoadAsset,
    NewTheme,
    LoadTheme,
    NewScenario,
    LoadScenario,
}

impl From<Mode> for LoadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::NewGame => LoadMode::NewGame,
            Mode::LoadGame => LoadMode::LoadGame,
            Mode::NewGameFromScenario => LoadMode::NewGameFromScenario,
            Mode::NewMap => LoadMode::NewMap,
            Mode::LoadMap => LoadMode::LoadMap,
            Mode::NewAsset => LoadMode::NewAsset,
            Mode::LoadAsset => LoadMode::LoadAsset,
            Mode::NewTheme => LoadMode::NewTheme,
            Mode::LoadTheme => LoadMode::LoadTheme,
            Mode::NewScenario => LoadMode::NewScenario,
            Mode::LoadScenario => LoadMode::LoadScenario,
        }
    }
}

/// Initialize logging. Diagnostics go to stderr so stdout stays clean for
/// `--json`; setting VEHICLE_REMOVER_LOG_PATH sends them to that file instead.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // Append, so repeated runs from a game launcher share one log
    let log_file = std::env::var_os(LOG_PATH_VAR).and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match log_file {
        Some(file) => subscriber.with_ansi(false).with_writer(file).init(),
        // Unset or unopenable path: fall back to stderr
        None => subscriber.with_writer(std::io::stderr).init(),
    }
}

/// Dispatch a parsed command line and return the process exit code
fn run(cli: Cli) -> u8 {
    let store = cli.config.map(ConfigStore::new).unwrap_or_default();

    let result = match cli.command {
        Commands::Init { world, force } => commands::init(&store, &world, force),
        Commands::Check { world, json } => commands::check(&store, &world, json),
        Commands::Apply {
            world,
            mode,
            out,
            json,
        } => commands::apply(&store, &world, mode.into(), out.as_deref(), json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "[VALIDATE] Command failed");
            commands::EXIT_FAILED
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    tracing::debug!("[VALIDATE] {} {}", MOD_NAME, env!("CARGO_PKG_VERSION"));

    ExitCode::from(run(Cli::parse()))
}
