//! # swatch
//!
//! Swatch - Symbolic CSS module class names.
//!
//! ## Name Origin
//!
//! A **swatch** is the small sample that stands in for a whole bolt of
//! colour. Templates name a swatch (`button`); the build decides which real
//! class it stands for. This binary is the build side: it compiles a tree of
//! stylesheets into rewritten CSS plus importable style maps.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swatch")]
#[command(about = "Compile CSS modules into style maps", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),

    /// Log compiler activity (overridden by SWATCH_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile stylesheets into CSS and style maps (default command)
    #[command(visible_alias = "atelier")]
    Build(commands::build::BuildArgs),
}

/// Install the stderr subscriber; `SWATCH_LOG` takes an `EnvFilter` directive.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Build(args)) => commands::build::run(args),
        None => {
            // Default to build command with default args
            commands::build::run(commands::build::BuildArgs::default());
        }
    }
}
