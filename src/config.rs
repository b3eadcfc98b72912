//! Configuration management for driver-upload.
//!
//! Layers, lowest precedence first:
//! 1. Built-in release catalog
//! 2. JSON config file (`--config`)
//! 3. `.env` file and environment variables
//! 4. Command-line overrides
//!
//! The special-driver catalog is derived from the effective kernel version
//! and RC number unless a config file lists it explicitly.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::catalog::{DriverSpec, SpecialDriverSpec};

pub const DEFAULT_KERNEL_VERSION: &str = "5.15.0-140-rubrik7-generic";
pub const DEFAULT_RC_NUMBER: &str = "56";
pub const DEFAULT_BASE_REMOTE_DIR: &str = "legacy-archive-local/manufacturing/drivers";
pub const DEFAULT_SPECIAL_REMOTE_DIR: &str = "artifactory/files/rubrik/refs";
pub const DEFAULT_UPLOAD_CLIENT: &str = "jfrog";
pub const DEFAULT_CLIENT_DOWNLOAD_URL: &str =
    "https://releases.jfrog.io/artifactory/jfrog-cli/v2/[RELEASE]/jfrog-cli-linux-amd64/jfrog";

/// Special drivers uploaded without a per-version subdirectory.
pub const DEFAULT_SPECIAL_DRIVERS: &[&str] = &["jnl"];

/// The release catalog, in processing order.
pub fn default_driver_catalog() -> Vec<DriverSpec> {
    vec![
        DriverSpec::new("mpt3sas", "mpt3sas-51.00.00.00", ["mpt3sas.ko"]),
        DriverSpec::new(
            "mellanox",
            "mlx-5.8-5.1.1.2",
            ["mlx5_core.ko", "mlx_compat.ko", "mlxfw.ko", "mlx5_ib.ko", "mlxdevm.ko"],
        ),
        DriverSpec::new(
            "ice",
            "ice-1.14.13",
            [
                "ice.ko",
                "ice-vfio-pci.ko",
                "ice-1.3.36.0.pkg",
                "LICENSE",
                "Module.symvers",
                "README",
            ],
        ),
        DriverSpec::new("bnxt_en", "bnxt_en-1.10.3-231.0.162.0", ["bnxt_en.ko"]),
        DriverSpec::new("mpi3mr", "mpi3mr-8.6.1.0.0", ["mpi3mr.ko"]),
        DriverSpec::new("igb", "igb-5.17.4", ["igb.ko"]),
    ]
}

/// driver-upload configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Suffix appended to every regular driver filename.
    pub kernel_version: String,
    /// Release counter embedded in special driver filenames.
    pub rc_number: String,
    pub base_remote_dir: String,
    pub special_remote_dir: String,
    pub driver_catalog: Vec<DriverSpec>,
    pub special_driver_catalog: Vec<SpecialDriverSpec>,
    /// Upload client binary name or path.
    pub upload_client: String,
    /// Where `setup --download` fetches the client from.
    pub client_download_url: String,
    /// Expected SHA-256 of the downloaded client, if pinned.
    pub client_sha256: Option<String>,
    /// Run `modinfo` on kernel modules instead of only announcing it.
    pub inspect_modules: bool,
}

/// On-disk JSON shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub kernel_version: Option<String>,
    pub rc_number: Option<String>,
    pub base_remote_dir: Option<String>,
    pub special_remote_dir: Option<String>,
    pub driver_catalog: Option<Vec<DriverSpec>>,
    pub special_driver_catalog: Option<Vec<SpecialDriverSpec>>,
    pub upload_client: Option<String>,
    pub client_download_url: Option<String>,
    pub client_sha256: Option<String>,
    pub inspect_modules: Option<bool>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub kernel_version: Option<String>,
    pub rc_number: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kernel_version: DEFAULT_KERNEL_VERSION.to_string(),
            rc_number: DEFAULT_RC_NUMBER.to_string(),
            base_remote_dir: DEFAULT_BASE_REMOTE_DIR.to_string(),
            special_remote_dir: DEFAULT_SPECIAL_REMOTE_DIR.to_string(),
            driver_catalog: default_driver_catalog(),
            special_driver_catalog: derive_specials(DEFAULT_KERNEL_VERSION, DEFAULT_RC_NUMBER),
            upload_client: DEFAULT_UPLOAD_CLIENT.to_string(),
            client_download_url: DEFAULT_CLIENT_DOWNLOAD_URL.to_string(),
            client_sha256: None,
            inspect_modules: false,
        }
    }
}

fn derive_specials(kernel_version: &str, rc_number: &str) -> Vec<SpecialDriverSpec> {
    DEFAULT_SPECIAL_DRIVERS
        .iter()
        .map(|name| SpecialDriverSpec::for_release(name, kernel_version, rc_number))
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", key, other),
    }
}

impl Config {
    /// Load configuration from an optional JSON file plus the environment.
    ///
    /// `.env` values are only seen if already loaded into the process
    /// environment; the CLI does that with `dotenvy::from_path` on the
    /// working directory's `.env` before calling this.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = config_path.map(ConfigFile::read).transpose()?;
        let env_vars: HashMap<String, String> = std::env::vars().collect();
        Self::resolve(file, &env_vars, overrides)
    }

    /// Merge all layers and validate the result.
    pub fn resolve(
        file: Option<ConfigFile>,
        env_vars: &HashMap<String, String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut config = Self::default();
        let mut explicit_specials = None;

        if let Some(file) = file {
            if let Some(v) = file.kernel_version {
                config.kernel_version = v;
            }
            if let Some(v) = file.rc_number {
                config.rc_number = v;
            }
            if let Some(v) = file.base_remote_dir {
                config.base_remote_dir = v;
            }
            if let Some(v) = file.special_remote_dir {
                config.special_remote_dir = v;
            }
            if let Some(v) = file.driver_catalog {
                config.driver_catalog = v;
            }
            if let Some(v) = file.upload_client {
                config.upload_client = v;
            }
            if let Some(v) = file.client_download_url {
                config.client_download_url = v;
            }
            if let Some(v) = file.inspect_modules {
                config.inspect_modules = v;
            }
            config.client_sha256 = file.client_sha256;
            explicit_specials = file.special_driver_catalog;
        }

        // Environment variables override the config file
        if let Some(v) = env_vars.get("KERNEL_VER") {
            config.kernel_version = v.clone();
        }
        if let Some(v) = env_vars.get("RC_NUMBER") {
            config.rc_number = v.clone();
        }
        if let Some(v) = env_vars.get("ARTIFACTORY_BASE") {
            config.base_remote_dir = v.clone();
        }
        if let Some(v) = env_vars.get("SPECIAL_ARTIFACTORY_BASE") {
            config.special_remote_dir = v.clone();
        }
        if let Some(v) = env_vars.get("UPLOAD_CLIENT") {
            config.upload_client = v.clone();
        }
        if let Some(v) = env_vars.get("INSPECT_MODULES") {
            config.inspect_modules = parse_bool("INSPECT_MODULES", v)?;
        }

        if let Some(v) = &overrides.kernel_version {
            config.kernel_version = v.clone();
        }
        if let Some(v) = &overrides.rc_number {
            config.rc_number = v.clone();
        }

        config.special_driver_catalog = match explicit_specials {
            Some(specials) => specials,
            None => derive_specials(&config.kernel_version, &config.rc_number),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce malformed paths.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_version.trim().is_empty() {
            bail!("kernelVersion must not be empty");
        }
        if self.base_remote_dir.trim().is_empty() {
            bail!("baseRemoteDir must not be empty");
        }
        if self.special_remote_dir.trim().is_empty() {
            bail!("specialRemoteDir must not be empty");
        }
        if self.upload_client.trim().is_empty() {
            bail!("uploadClient must not be empty");
        }

        let mut seen = HashSet::new();
        for driver in &self.driver_catalog {
            if driver.name.is_empty() {
                bail!("driverCatalog contains a driver with an empty name");
            }
            if !seen.insert(driver.name.as_str()) {
                bail!("driverCatalog lists '{}' more than once", driver.name);
            }
            if driver.version_tag.is_empty() {
                bail!("Driver '{}' has an empty versionTag", driver.name);
            }
            if driver.base_filenames.is_empty() {
                bail!("Driver '{}' has no files", driver.name);
            }
            if driver.base_filenames.iter().any(|f| f.is_empty()) {
                bail!("Driver '{}' has an empty filename", driver.name);
            }
        }

        let mut seen = HashSet::new();
        for special in &self.special_driver_catalog {
            if special.name.is_empty() || special.resolved_filename.is_empty() {
                bail!("specialDriverCatalog entries need a name and a resolvedFilename");
            }
            if !seen.insert(special.name.as_str()) {
                bail!("specialDriverCatalog lists '{}' more than once", special.name);
            }
        }

        Ok(())
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  KERNEL_VER: {}", self.kernel_version);
        println!("  RC_NUMBER: {}", self.rc_number);
        println!("  ARTIFACTORY_BASE: {}", self.base_remote_dir);
        println!("  SPECIAL_ARTIFACTORY_BASE: {}", self.special_remote_dir);
        println!("  UPLOAD_CLIENT: {}", self.upload_client);
        println!(
            "  INSPECT_MODULES: {}",
            if self.inspect_modules { "modinfo" } else { "announce only" }
        );
        println!();
        println!("Drivers:");
        for driver in &self.driver_catalog {
            println!(
                "  {} -> {}: {}",
                driver.name,
                driver.version_tag,
                driver.base_filenames.join(" ")
            );
        }
        println!("Special drivers:");
        for special in &self.special_driver_catalog {
            println!("  {} -> {}", special.name, special.resolved_filename);
        }
    }
}
