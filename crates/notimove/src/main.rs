//! Binary entrypoint: moves macOS notification banners to a configured position.
use std::{
    io,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use config::{Placement, Settings, load_or_default, resolve_config_path, to_ron};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::error;

#[cfg(target_os = "macos")]
mod run;

#[derive(Parser, Debug)]
#[command(name = "notimove", about = "Move macOS notification banners", version)]
/// Command-line interface for the `notimove` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured placement (e.g. top-left, dead-center, bottom-right)
    #[arg(long, value_name = "PLACEMENT")]
    placement: Option<Placement>,

    /// Ask the OS to show the Accessibility permission prompt if not yet trusted
    #[arg(long)]
    prompt: bool,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.config/notimove/config.ron)
        path: Option<PathBuf>,

        /// Dump the effective settings as RON to stdout
        #[arg(long)]
        dump: bool,
    },
}

/// Failures that end the process.
#[derive(Debug, Error)]
enum AppError {
    /// The core could not be started.
    #[error(transparent)]
    Core(#[from] notimove_core::Error),

    /// Runtime or signal setup failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Not running on macOS.
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    #[error("notimove only runs on macOS")]
    Unsupported,
}

/// Options the running service needs beyond the settings themselves.
#[derive(Debug, Clone)]
struct RunOpts {
    /// Config file to reload on SIGHUP.
    config_path: PathBuf,
    /// Placement that overrides the file on every (re)load.
    placement: Option<Placement>,
    /// Show the permission prompt at startup.
    prompt: bool,
}

impl RunOpts {
    /// Load settings from disk and apply command-line overrides.
    fn load(&self) -> Result<Settings, config::Error> {
        let mut settings = load_or_default(&self.config_path)?;
        if let Some(p) = self.placement {
            settings.placement = p;
        }
        Ok(settings)
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        process::exit(check(&resolve_config_path(explicit), *dump));
    }

    let opts = RunOpts {
        config_path: resolve_config_path(cli.config.as_deref()),
        placement: cli.placement,
        prompt: cli.prompt,
    };
    let settings = match opts.load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    };

    let rt = match Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to build runtime: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(serve(opts, settings)) {
        error!("{}", e);
        process::exit(1);
    }
}

/// Validate the config at `path`, optionally printing the effective settings.
fn check(path: &Path, dump: bool) -> i32 {
    match load_or_default(path) {
        Ok(settings) => {
            if dump {
                match to_ron(&settings) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("{}", e.pretty());
                        return 1;
                    }
                }
            } else if path.exists() {
                println!("OK");
            } else {
                println!("OK (no file at {}, using defaults)", path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("{}", e.pretty());
            1
        }
    }
}

#[cfg(target_os = "macos")]
async fn serve(opts: RunOpts, settings: Settings) -> Result<(), AppError> {
    run::serve(&opts, settings).await
}

#[cfg(not(target_os = "macos"))]
async fn serve(_opts: RunOpts, _settings: Settings) -> Result<(), AppError> {
    Err(AppError::Unsupported)
}
