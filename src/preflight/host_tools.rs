//! Host tool availability checks.

use std::path::Path;

use crate::config::Config;
use crate::process;
use crate::setup;

use super::types::CheckResult;

/// Check the upload client and, when inspection is enabled, `modinfo`.
pub fn check_host_tools(config: &Config, cache: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match setup::resolve_client(config, cache) {
        Ok(client) => match setup::smoke_test(&client.path) {
            Ok(version) => results.push(CheckResult::pass_with(
                "upload client",
                &format!("{} ({})", client.path.display(), version),
            )),
            Err(e) => results.push(CheckResult::fail("upload client", &format!("{:#}", e))),
        },
        Err(e) => results.push(CheckResult::fail("upload client", &e.to_string())),
    }

    if config.inspect_modules {
        match process::which("modinfo") {
            Some(path) => results.push(CheckResult::pass_with("modinfo", &path.to_string_lossy())),
            None => results.push(CheckResult::fail(
                "modinfo",
                "Not found. Install 'kmod' package. Required when INSPECT_MODULES is set",
            )),
        }
    }

    results
}
