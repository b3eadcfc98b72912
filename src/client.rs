//! Upload client abstraction.
//!
//! The orchestrator only needs "put this local file into that remote
//! directory". [`JfrogCli`] does it by shelling out to the JFrog CLI;
//! [`DryRun`] writes the command to the run's output instead.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::process::Cmd;

/// Something that can push a file to the artifact store.
pub trait Uploader {
    /// Upload `local_file` (relative to `work_dir`) into `destination`.
    /// Progress text goes to `out`; a real client may also stream to the terminal.
    fn upload(
        &mut self,
        work_dir: &Path,
        local_file: &str,
        destination: &str,
        out: &mut dyn Write,
    ) -> Result<()>;
}

/// `<client> rt upload --flat <file> <destination>/`
pub fn upload_command(client: &Path, work_dir: &Path, local_file: &str, destination: &str) -> Cmd {
    Cmd::new(client.to_string_lossy())
        .args(["rt", "upload", "--flat"])
        .arg(local_file)
        .arg(format!("{}/", destination))
        .dir(work_dir)
        .error_msg(format!("Upload of {} to {}/ failed", local_file, destination))
}

/// JFrog CLI invoked as an external process.
#[derive(Debug, Clone)]
pub struct JfrogCli {
    program: PathBuf,
}

impl JfrogCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Uploader for JfrogCli {
    fn upload(
        &mut self,
        work_dir: &Path,
        local_file: &str,
        destination: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        // The client writes straight to the inherited stdout
        out.flush()?;
        upload_command(&self.program, work_dir, local_file, destination).run_interactive()?;
        Ok(())
    }
}

/// Writes the upload command without running it.
#[derive(Debug, Clone)]
pub struct DryRun {
    program: PathBuf,
}

impl DryRun {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Uploader for DryRun {
    fn upload(
        &mut self,
        work_dir: &Path,
        local_file: &str,
        destination: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        let cmd = upload_command(&self.program, work_dir, local_file, destination);
        writeln!(out, "     [DRY RUN] {}", cmd.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_command_shape() {
        let cmd = upload_command(
            Path::new("jfrog"),
            Path::new("/tmp"),
            "igb.ko.5.15.0-140-rubrik7-generic",
            "legacy-archive-local/manufacturing/drivers/igb-5.17.4",
        );
        assert_eq!(
            cmd.display(),
            "jfrog rt upload --flat igb.ko.5.15.0-140-rubrik7-generic \
             legacy-archive-local/manufacturing/drivers/igb-5.17.4/"
        );
    }

    #[test]
    fn test_dry_run_writes_command_without_executing() {
        let mut dry = DryRun::new("nonexistent_program_12345");
        let mut out = Vec::new();
        dry.upload(Path::new("/tmp"), "igb.ko.x", "dest", &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "     [DRY RUN] nonexistent_program_12345 rt upload --flat igb.ko.x dest/\n"
        );
    }
}
