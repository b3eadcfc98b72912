//! Show command - displays information.

use anyhow::Result;
use std::path::Path;

use crate::catalog::{self, TaskKind};
use crate::config::Config;

/// Show target for the show command.
pub enum ShowTarget {
    /// Effective configuration
    Config,
    /// Every file the upload run would process
    Plan,
}

/// Execute the show command.
pub fn cmd_show(config: &Config, work_dir: &Path, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Plan => print_plan(config, work_dir),
    }
    Ok(())
}

fn print_plan(config: &Config, work_dir: &Path) {
    let tasks = catalog::resolve_all(
        &config.driver_catalog,
        &config.special_driver_catalog,
        &config.kernel_version,
        &config.base_remote_dir,
        &config.special_remote_dir,
    );

    println!(
        "Upload plan ({} files, working directory {}):",
        tasks.len(),
        work_dir.display()
    );
    for task in &tasks {
        let state = if work_dir.join(&task.local_path).is_file() {
            "present"
        } else {
            "missing"
        };
        let kind = match task.kind {
            TaskKind::Regular => "",
            TaskKind::Special => " (special)",
        };
        println!(
            "  [{}] {}{} -> {}/",
            state, task.local_path, kind, task.destination_directory
        );
    }
}
