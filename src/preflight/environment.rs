//! Working directory and configuration checks.

use std::fs;
use std::path::Path;

use crate::config::Config;

use super::types::CheckResult;

/// Check the configuration is valid and the working directory is writable.
pub fn check_environment(config: &Config, work_dir: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match config.validate() {
        Ok(()) => results.push(CheckResult::pass("configuration")),
        Err(e) => results.push(CheckResult::fail("configuration", &e.to_string())),
    }

    // Module inspection writes a temporary copy next to the source
    let probe = work_dir.join(".driver-upload-preflight");
    match fs::write(&probe, "test") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            results.push(CheckResult::pass_with(
                "working directory writable",
                &work_dir.display().to_string(),
            ));
        }
        Err(e) => results.push(CheckResult::fail(
            "working directory writable",
            &format!("Cannot write to {}: {}", work_dir.display(), e),
        )),
    }

    results
}
