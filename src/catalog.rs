//! Driver catalog types and filename resolution.
//!
//! Regular drivers carry a version tag and a list of base filenames; the
//! kernel version is appended to each base filename to find the local build.
//! Special drivers carry one filename that already embeds kernel version and
//! release counter.

use serde::{Deserialize, Serialize};

/// Substring that marks a file as a kernel module.
pub const KERNEL_MODULE_MARKER: &str = ".ko";

/// A regular driver: version tag plus the files that make up a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSpec {
    pub name: String,
    pub version_tag: String,
    pub base_filenames: Vec<String>,
}

impl DriverSpec {
    pub fn new<I, S>(name: &str, version_tag: &str, base_filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            version_tag: version_tag.to_string(),
            base_filenames: base_filenames.into_iter().map(Into::into).collect(),
        }
    }

    /// Remote directory for this driver: `<base>/<versionTag>`.
    pub fn destination(&self, base_remote_dir: &str) -> String {
        format!("{}/{}", base_remote_dir, self.version_tag)
    }
}

/// A driver whose filename is fully resolved at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDriverSpec {
    pub name: String,
    pub resolved_filename: String,
}

impl SpecialDriverSpec {
    pub fn new(name: &str, resolved_filename: &str) -> Self {
        Self {
            name: name.to_string(),
            resolved_filename: resolved_filename.to_string(),
        }
    }

    /// Build the conventional special filename `<name>.ko.<kernel>.<rc>`.
    pub fn for_release(name: &str, kernel_version: &str, rc_number: &str) -> Self {
        let filename = format!("{}.ko.{}.{}", name, kernel_version, rc_number);
        Self::new(name, &filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Regular,
    Special,
}

/// One file to check and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileTask {
    /// Owning driver name.
    pub driver: String,
    /// Filename relative to the working directory.
    pub local_path: String,
    /// Remote directory the file is uploaded into.
    pub destination_directory: String,
    pub kind: TaskKind,
}

impl ResolvedFileTask {
    pub fn is_kernel_module(&self) -> bool {
        is_kernel_module(&self.local_path)
    }
}

/// Local filename for a regular driver file: `<base>.<kernelVersion>`.
pub fn local_filename(base_filename: &str, kernel_version: &str) -> String {
    format!("{}.{}", base_filename, kernel_version)
}

/// Substring match on `.ko`, so `foo.kompiled` counts too.
pub fn is_kernel_module(filename: &str) -> bool {
    filename.contains(KERNEL_MODULE_MARKER)
}

/// Tasks for one regular driver, in `base_filenames` order.
pub fn resolve_driver(
    driver: &DriverSpec,
    kernel_version: &str,
    base_remote_dir: &str,
) -> Vec<ResolvedFileTask> {
    let destination = driver.destination(base_remote_dir);
    driver
        .base_filenames
        .iter()
        .map(|base| ResolvedFileTask {
            driver: driver.name.clone(),
            local_path: local_filename(base, kernel_version),
            destination_directory: destination.clone(),
            kind: TaskKind::Regular,
        })
        .collect()
}

/// The single task for a special driver.
pub fn resolve_special(special: &SpecialDriverSpec, special_remote_dir: &str) -> ResolvedFileTask {
    ResolvedFileTask {
        driver: special.name.clone(),
        local_path: special.resolved_filename.clone(),
        destination_directory: special_remote_dir.to_string(),
        kind: TaskKind::Special,
    }
}

/// Every task in processing order: regular drivers first, then special ones.
pub fn resolve_all(
    drivers: &[DriverSpec],
    specials: &[SpecialDriverSpec],
    kernel_version: &str,
    base_remote_dir: &str,
    special_remote_dir: &str,
) -> Vec<ResolvedFileTask> {
    let mut tasks: Vec<ResolvedFileTask> = drivers
        .iter()
        .flat_map(|d| resolve_driver(d, kernel_version, base_remote_dir))
        .collect();
    tasks.extend(specials.iter().map(|s| resolve_special(s, special_remote_dir)));
    tasks
}
