//! Catalog file presence checks.

use std::fs;
use std::path::Path;

use crate::catalog;
use crate::config::Config;

use super::types::CheckResult;

/// One check per catalog file. Missing files are warnings since the upload
/// run skips them; empty files are warnings since they are likely truncated.
pub fn check_artifacts(config: &Config, work_dir: &Path) -> Vec<CheckResult> {
    catalog::resolve_all(
        &config.driver_catalog,
        &config.special_driver_catalog,
        &config.kernel_version,
        &config.base_remote_dir,
        &config.special_remote_dir,
    )
    .iter()
    .map(|task| {
        let path = work_dir.join(&task.local_path);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => CheckResult::pass_with(
                &task.local_path,
                &format!("{} bytes -> {}/", meta.len(), task.destination_directory),
            ),
            Ok(meta) if meta.is_file() => CheckResult::warn(&task.local_path, "File is empty"),
            Ok(_) => CheckResult::warn(&task.local_path, "Not a regular file - will be skipped"),
            Err(_) => CheckResult::warn(&task.local_path, "Not found - will be skipped"),
        }
    })
    .collect()
}
