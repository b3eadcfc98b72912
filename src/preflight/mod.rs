//! Preflight checks before an upload run.
//!
//! Validates the upload client, host tools, working directory and catalog
//! files. Run with `driver-upload preflight` to check everything is ready.

mod artifacts;
mod environment;
mod host_tools;
mod types;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config, work_dir: &Path, cache: &Path) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(host_tools::check_host_tools(config, cache));

    println!("Checking environment...");
    checks.extend(environment::check_environment(config, work_dir));

    println!("Checking driver files...");
    checks.extend(artifacts::check_artifacts(config, work_dir));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config, work_dir: &Path, cache: &Path) -> Result<()> {
    let report = run_preflight(config, work_dir, cache);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before uploading.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
