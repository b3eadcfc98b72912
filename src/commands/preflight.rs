//! Preflight command - runs preflight checks.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::preflight;
use crate::setup;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, work_dir: &Path, strict: bool) -> Result<()> {
    let cache = setup::cache_dir();
    if strict {
        preflight::run_preflight_or_fail(config, work_dir, &cache)?;
    } else {
        let report = preflight::run_preflight(config, work_dir, &cache);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail with a non-zero exit.");
        }
    }
    Ok(())
}
