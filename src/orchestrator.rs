//! The upload run.
//!
//! Drivers are processed one at a time in catalog order, then special
//! drivers. A missing file is reported and skipped; every other failure
//! (temporary copy, inspection, upload) aborts the run.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::{self, ResolvedFileTask};
use crate::client::Uploader;
use crate::config::Config;
use crate::inspect::ModuleInspector;

const BANNER: &str = "==========================================";

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files uploaded, in order.
    pub uploaded: Vec<String>,
    /// Files reported missing, in order.
    pub missing: Vec<String>,
}

impl RunSummary {
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct Orchestrator<'a, U: Uploader> {
    config: &'a Config,
    work_dir: PathBuf,
    uploader: U,
    inspector: ModuleInspector,
}

impl<'a, U: Uploader> Orchestrator<'a, U> {
    pub fn new(config: &'a Config, work_dir: &Path, uploader: U, inspector: ModuleInspector) -> Self {
        Self {
            config,
            work_dir: work_dir.to_path_buf(),
            uploader,
            inspector,
        }
    }

    /// Hand back the uploader, e.g. to inspect what a test double recorded.
    pub fn into_uploader(self) -> U {
        self.uploader
    }

    /// Process every driver, writing progress lines to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let config = self.config;

        for driver in &config.driver_catalog {
            let destination = driver.destination(&config.base_remote_dir);
            writeln!(out, "{}", BANNER)?;
            writeln!(out, "Driver: {}", driver.name)?;
            writeln!(out, "Remote directory: {}", destination)?;
            writeln!(out, "Files to upload and verify:")?;

            for task in catalog::resolve_driver(driver, &config.kernel_version, &config.base_remote_dir) {
                self.process(&task, out, &mut summary)?;
            }
        }

        for special in &config.special_driver_catalog {
            writeln!(out, "{}", BANNER)?;
            writeln!(out, "Special driver: {}", special.name)?;
            writeln!(out, "Remote directory: {}", config.special_remote_dir)?;

            let task = catalog::resolve_special(special, &config.special_remote_dir);
            self.process(&task, out, &mut summary)?;
        }

        writeln!(out, "{}", BANNER)?;
        writeln!(out, "All uploads done!")?;
        writeln!(
            out,
            "Uploaded {} file(s), {} missing",
            summary.uploaded.len(),
            summary.missing.len()
        )?;

        Ok(summary)
    }

    fn process<W: Write>(
        &mut self,
        task: &ResolvedFileTask,
        out: &mut W,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let file = &task.local_path;

        if !self.work_dir.join(file).is_file() {
            writeln!(out, "   [MISSING] {}", file)?;
            writeln!(out)?;
            summary.missing.push(file.clone());
            return Ok(());
        }

        writeln!(out, "   [FOUND] {}", file)?;

        if task.is_kernel_module() {
            self.inspector.inspect(&self.work_dir, file, out)?;
        }

        writeln!(out, "     Uploading {} to {}/", file, task.destination_directory)?;
        self.uploader
            .upload(&self.work_dir, file, &task.destination_directory, &mut *out)?;
        writeln!(out, "     [UPLOADED] {}", file)?;
        writeln!(out)?;

        summary.uploaded.push(file.clone());
        Ok(())
    }
}
