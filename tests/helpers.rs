//! Shared test utilities for driver-upload tests.
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use driver_upload::catalog::{DriverSpec, SpecialDriverSpec};
use driver_upload::client::Uploader;
use driver_upload::config::Config;

pub const KVER: &str = "5.15.0-140-rubrik7-generic";

/// Test environment with a temporary working directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Directory holding the driver files
    pub work_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let work_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            work_dir,
        }
    }

    /// Create a driver file with some content.
    pub fn add_file(&self, name: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        fs::write(&path, format!("contents of {}\n", name)).expect("Failed to create driver file");
        path
    }
}

/// Config with only the given drivers and specials.
pub fn config_with(drivers: Vec<DriverSpec>, specials: Vec<SpecialDriverSpec>) -> Config {
    Config {
        kernel_version: KVER.to_string(),
        driver_catalog: drivers,
        special_driver_catalog: specials,
        ..Config::default()
    }
}

pub fn igb() -> DriverSpec {
    DriverSpec::new("igb", "igb-5.17.4", ["igb.ko"])
}

/// One recorded upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub file: String,
    pub destination: String,
    /// Whether any `<module>.ko` temporary copy was lying around at upload time.
    pub temp_copy_present: bool,
}

/// Uploader that records calls and can be told to fail on one file.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    pub calls: Vec<UploadCall>,
    pub fail_on: Option<String>,
}

impl RecordingUploader {
    pub fn failing_on(file: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(file.to_string()),
        }
    }
}

impl Uploader for RecordingUploader {
    fn upload(
        &mut self,
        work_dir: &Path,
        local_file: &str,
        destination: &str,
        _out: &mut dyn Write,
    ) -> Result<()> {
        if self.fail_on.as_deref() == Some(local_file) {
            bail!("Upload of {} to {}/ failed (exit code 1)", local_file, destination);
        }
        let temp_copy_present = fs::read_dir(work_dir)?
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().ends_with(".ko"));
        self.calls.push(UploadCall {
            file: local_file.to_string(),
            destination: destination.to_string(),
            temp_copy_present,
        });
        Ok(())
    }
}

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Index of the first output line containing `needle`.
pub fn line_index(output: &str, needle: &str) -> usize {
    output
        .lines()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("No line containing {:?} in:\n{}", needle, output))
}
