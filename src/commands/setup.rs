//! Setup command - makes the upload client available.

use anyhow::Result;

use crate::config::Config;
use crate::setup::{self, ClientSource};

/// Execute the setup command.
pub fn cmd_setup(config: &Config, download: bool) -> Result<()> {
    let client = setup::ensure_client(config, &setup::cache_dir(), download)?;

    let source = match client.source {
        ClientSource::Configured => "configured path",
        ClientSource::SystemPath => "PATH",
        ClientSource::Cached => "download cache",
    };
    println!("Upload client: {} (from {})", client.path.display(), source);
    println!("Credentials are not managed here; configure the client for your server before uploading.");
    Ok(())
}
