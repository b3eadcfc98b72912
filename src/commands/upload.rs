//! Upload command - the main run.

use anyhow::Result;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::client::{DryRun, JfrogCli};
use crate::config::Config;
use crate::inspect::ModuleInspector;
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::setup;

/// Execute the upload command.
pub fn cmd_upload(config: &Config, work_dir: &Path, dry_run: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_upload(config, work_dir, &setup::cache_dir(), dry_run, &mut out)?;

    if !summary.all_present() {
        eprintln!(
            "  [WARN] {} file(s) were missing and not uploaded",
            summary.missing.len()
        );
    }
    Ok(())
}

/// Resolve the client and run the orchestrator, writing progress to `out`.
///
/// The client is resolved before any driver is touched, so a setup failure
/// aborts with nothing uploaded. Dry runs skip that check and fall back to
/// the configured client name.
pub fn run_upload<W: Write>(
    config: &Config,
    work_dir: &Path,
    cache: &Path,
    dry_run: bool,
    out: &mut W,
) -> Result<RunSummary> {
    let inspector = ModuleInspector::from_flag(config.inspect_modules);

    if dry_run {
        let client = setup::resolve_client(config, cache)
            .map(|c| c.path)
            .unwrap_or_else(|_| PathBuf::from(&config.upload_client));
        return Orchestrator::new(config, work_dir, DryRun::new(client), inspector).run(out);
    }

    let client = setup::ensure_client(config, cache, false)?;
    Orchestrator::new(config, work_dir, JfrogCli::new(client.path), inspector).run(out)
}
