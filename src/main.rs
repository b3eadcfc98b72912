//! driver-upload - verify and archive out-of-tree kernel driver builds.
//!
//! Checks that every driver file built for a kernel release is present in
//! the working directory and uploads it to the artifact store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use driver_upload::commands;
use driver_upload::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "driver-upload")]
#[command(about = "Verify and upload kernel driver builds to the artifact store")]
#[command(
    after_help = "QUICK START:\n  driver-upload preflight    Check client and driver files\n  driver-upload show plan    List what would be uploaded\n  driver-upload upload       Upload everything"
)]
struct Cli {
    /// JSON configuration file (catalog, versions, remote directories)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the driver files (default: current directory)
    #[arg(short = 'C', long, global = true)]
    work_dir: Option<PathBuf>,

    /// Kernel version suffix, overrides KERNEL_VER
    #[arg(long, global = true)]
    kernel_version: Option<String>,

    /// Release counter for special drivers, overrides RC_NUMBER
    #[arg(long, global = true)]
    rc_number: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every catalog file and upload the ones present
    Upload {
        /// Print upload commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Locate the upload client, optionally downloading it
    Setup {
        /// Fetch the client into ~/.cache/driver-upload/
        #[arg(long)]
        download: bool,
    },

    /// Run preflight checks (client, working directory, driver files)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show effective configuration
    Config,
    /// Show every file and its destination
    Plan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    // Load .env if present
    dotenvy::from_path(work_dir.join(".env")).ok();
    let overrides = Overrides {
        kernel_version: cli.kernel_version,
        rc_number: cli.rc_number,
    };
    let config = Config::load(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Commands::Upload { dry_run } => {
            commands::cmd_upload(&config, &work_dir, dry_run)?;
        }

        Commands::Setup { download } => {
            commands::cmd_setup(&config, download)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, &work_dir, strict)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Plan => commands::show::ShowTarget::Plan,
            };
            commands::cmd_show(&config, &work_dir, show_target)?;
        }
    }

    Ok(())
}
