//! Upload client setup.
//!
//! Resolution order:
//! 1. `uploadClient` as an explicit path (contains a `/`)
//! 2. `uploadClient` looked up in PATH
//! 3. A copy previously fetched into `~/.cache/driver-upload/`
//!
//! Credentials are not handled here; the client must already be configured
//! for the target server.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::process::{self, Cmd};

/// Where the client was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSource {
    /// Explicit path from configuration.
    Configured,
    /// Found in PATH.
    SystemPath,
    /// Downloaded earlier into the cache directory.
    Cached,
}

#[derive(Debug, Clone)]
pub struct ResolvedClient {
    pub path: PathBuf,
    pub source: ClientSource,
}

/// Cache directory for downloaded tools (`~/.cache/driver-upload`).
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("driver-upload")
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn client_file_name(upload_client: &str) -> String {
    Path::new(upload_client)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| upload_client.to_string())
}

/// Locate the upload client without downloading anything.
pub fn resolve_client(config: &Config, cache: &Path) -> Result<ResolvedClient> {
    let configured = &config.upload_client;

    if configured.contains('/') {
        let path = PathBuf::from(configured);
        if is_executable(&path) {
            return Ok(ResolvedClient {
                path,
                source: ClientSource::Configured,
            });
        }
        bail!(
            "Upload client {} does not exist or is not executable",
            path.display()
        );
    }

    if let Some(path) = process::which(configured) {
        return Ok(ResolvedClient {
            path,
            source: ClientSource::SystemPath,
        });
    }

    let cached = cache.join(client_file_name(configured));
    if is_executable(&cached) {
        return Ok(ResolvedClient {
            path: cached,
            source: ClientSource::Cached,
        });
    }

    bail!(
        "Upload client '{}' not found in PATH or {}.\n\
         Run 'driver-upload setup --download' or set UPLOAD_CLIENT.",
        configured,
        cache.display()
    )
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a file against a pinned digest, deleting it on mismatch.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        let _ = fs::remove_file(path);
        bail!(
            "Checksum mismatch for {}!\n  Expected: {}\n  Got: {}\n\
             The download may be corrupted. Deleted the file.",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

/// Fetch the client into `cache` with curl and make it executable.
pub fn download_client(config: &Config, cache: &Path) -> Result<PathBuf> {
    fs::create_dir_all(cache)
        .with_context(|| format!("Failed to create {}", cache.display()))?;

    let dest = cache.join(client_file_name(&config.upload_client));
    let partial = dest.with_extension("part");

    println!("Downloading upload client...");
    println!("URL: {}", config.client_download_url);

    let fetched = Cmd::new("curl")
        .args(["-fL", "--progress-bar", "-o"])
        .arg_path(&partial)
        .arg(&config.client_download_url)
        .error_msg("Client download failed")
        .run_interactive();
    if let Err(e) = fetched {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    if let Some(expected) = &config.client_sha256 {
        println!("Verifying SHA256 checksum...");
        verify_sha256(&partial, expected)?;
    }

    fs::set_permissions(&partial, fs::Permissions::from_mode(0o755))?;
    fs::rename(&partial, &dest)
        .with_context(|| format!("Failed to move client into {}", dest.display()))?;

    println!("Downloaded to {}", dest.display());
    Ok(dest)
}

/// Run `<client> --version` to prove the binary is usable.
pub fn smoke_test(client: &Path) -> Result<String> {
    let result = Cmd::new(client.to_string_lossy())
        .arg("--version")
        .error_msg(format!("Upload client {} is not runnable", client.display()))
        .run()?;
    Ok(result.stdout_trimmed().to_string())
}

/// Make sure a working client is available, optionally downloading it first.
pub fn ensure_client(config: &Config, cache: &Path, download: bool) -> Result<ResolvedClient> {
    try_ensure_client(config, cache, download).context("Setup failed")
}

fn try_ensure_client(config: &Config, cache: &Path, download: bool) -> Result<ResolvedClient> {
    if download {
        download_client(config, cache)?;
    }
    let client = resolve_client(config, cache)?;
    smoke_test(&client.path)?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn config_with_client(client: &str) -> Config {
        Config {
            upload_client: client.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_resolve_configured_path() {
        let dir = TempDir::new().unwrap();
        let client = dir.path().join("jf");
        write_script(&client, "echo jf version 2.0");

        let config = config_with_client(client.to_str().unwrap());
        let resolved = resolve_client(&config, dir.path()).unwrap();
        assert_eq!(resolved.source, ClientSource::Configured);
        assert_eq!(smoke_test(&resolved.path).unwrap(), "jf version 2.0");
    }

    #[test]
    fn test_configured_path_not_executable() {
        let dir = TempDir::new().unwrap();
        let client = dir.path().join("jf");
        fs::write(&client, "data").unwrap();

        let config = config_with_client(client.to_str().unwrap());
        assert!(resolve_client(&config, dir.path()).is_err());
    }

    #[test]
    fn test_resolve_from_cache() {
        let cache = TempDir::new().unwrap();
        write_script(&cache.path().join("jfrog_test_client_12345"), "echo ok");

        let config = config_with_client("jfrog_test_client_12345");
        let resolved = resolve_client(&config, cache.path()).unwrap();
        assert_eq!(resolved.source, ClientSource::Cached);
    }

    #[test]
    fn test_resolve_not_found() {
        let cache = TempDir::new().unwrap();
        let config = config_with_client("jfrog_test_client_12345");
        let err = resolve_client(&config, cache.path()).unwrap_err();
        assert!(err.to_string().contains("setup --download"));
    }

    #[test]
    fn test_ensure_client_reports_setup_failure() {
        let cache = TempDir::new().unwrap();
        let client = cache.path().join("broken");
        write_script(&client, "exit 3");

        let config = config_with_client(client.to_str().unwrap());
        let err = ensure_client(&config, cache.path(), false).unwrap_err();
        assert!(err.to_string().contains("Setup failed"));
        assert!(format!("{:#}", err).contains("exit code 3"));
    }

    #[test]
    fn test_verify_sha256() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("blob");
        fs::write(&file, b"abc").unwrap();

        verify_sha256(
            &file,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        )
        .unwrap();

        assert!(verify_sha256(&file, "00").is_err());
        assert!(!file.exists());
    }

    const TEST_CLIENT: &str = "jfrog_test_client_12345";

    /// A "release" served from disk through curl's file:// support.
    fn served_client(dir: &Path) -> (Config, String) {
        let source = dir.join("release-jf");
        write_script(&source, "echo jf version 2.11.0");
        let digest = sha256_file(&source).unwrap();
        let config = Config {
            upload_client: TEST_CLIENT.to_string(),
            client_download_url: format!("file://{}", source.display()),
            ..Config::default()
        };
        (config, digest)
    }

    #[test]
    fn test_download_with_matching_pin() {
        let server = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let (mut config, digest) = served_client(server.path());
        config.client_sha256 = Some(digest.to_uppercase());

        let client = ensure_client(&config, cache.path(), true).unwrap();

        assert_eq!(client.source, ClientSource::Cached);
        assert_eq!(client.path, cache.path().join(TEST_CLIENT));
        assert!(is_executable(&client.path));
        assert!(!cache.path().join(format!("{}.part", TEST_CLIENT)).exists());
        assert_eq!(smoke_test(&client.path).unwrap(), "jf version 2.11.0");
    }

    #[test]
    fn test_download_with_mismatched_pin() {
        let server = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let (mut config, _) = served_client(server.path());
        config.client_sha256 = Some("0".repeat(64));

        let err = download_client(&config, cache.path()).unwrap_err();

        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(!cache.path().join(TEST_CLIENT).exists());
        assert!(!cache.path().join(format!("{}.part", TEST_CLIENT)).exists());
    }

    #[test]
    fn test_failed_download_leaves_no_partial() {
        let server = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let config = Config {
            upload_client: TEST_CLIENT.to_string(),
            client_download_url: format!("file://{}", server.path().join("absent").display()),
            ..Config::default()
        };

        let err = ensure_client(&config, cache.path(), true).unwrap_err();

        assert!(format!("{:#}", err).contains("Client download failed"));
        assert!(!cache.path().join(format!("{}.part", TEST_CLIENT)).exists());
        assert!(!cache.path().join(TEST_CLIENT).exists());
    }
}
