//! Kernel module inspection step.
//!
//! A module is copied to a fixed temporary name next to it (`igb.ko` for
//! `igb.ko.<kernel>`) so tools that key on the `.ko` suffix accept it, then
//! inspected and removed again. The copy never outlives the step.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::KERNEL_MODULE_MARKER;
use crate::process::Cmd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectMode {
    /// Print the banner only.
    Announce,
    /// Run `modinfo` on the temporary copy and echo its output.
    Modinfo,
}

/// Temporary file name for a module: everything up to and including `.ko`.
///
/// The name is fixed, so it can coincide with a real file in the working
/// directory (a special driver shipped as plain `jnl.ko`). [`temp_path`]
/// steps around such files.
pub fn temp_name(local_file: &str) -> String {
    let base = Path::new(local_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_file.to_string());

    let name = match base.find(KERNEL_MODULE_MARKER) {
        Some(idx) => base[..idx + KERNEL_MODULE_MARKER.len()].to_string(),
        None => base.clone(),
    };

    // Never alias the source file itself
    if name == base {
        format!("{}.inspect", name)
    } else {
        name
    }
}

/// Free path for the temporary copy, appending `.inspect` while the fixed
/// name is already taken so an existing file is never overwritten.
pub fn temp_path(work_dir: &Path, local_file: &str) -> PathBuf {
    let mut path = work_dir.join(temp_name(local_file));
    while path.exists() {
        let mut name = path.as_os_str().to_os_string();
        name.push(".inspect");
        path = PathBuf::from(name);
    }
    path
}

/// Temporary copy removed on drop unless already cleaned up.
struct TempCopy {
    path: PathBuf,
    armed: bool,
}

impl TempCopy {
    fn create(source: &Path, dest: PathBuf) -> Result<Self> {
        fs::copy(source, &dest).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                dest.display()
            )
        })?;
        Ok(Self {
            path: dest,
            armed: true,
        })
    }

    fn remove(mut self) -> Result<()> {
        self.armed = false;
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove temporary file {}", self.path.display()))
    }
}

impl Drop for TempCopy {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModuleInspector {
    mode: InspectMode,
}

impl ModuleInspector {
    pub fn new(mode: InspectMode) -> Self {
        Self { mode }
    }

    pub fn from_flag(inspect_modules: bool) -> Self {
        Self::new(if inspect_modules {
            InspectMode::Modinfo
        } else {
            InspectMode::Announce
        })
    }

    /// Copy, inspect, remove. Any I/O or `modinfo` failure is returned after
    /// the temporary copy has been removed.
    pub fn inspect<W: Write>(&self, work_dir: &Path, local_file: &str, out: &mut W) -> Result<()> {
        writeln!(out, "     Running modinfo on {}:", local_file)?;

        let source = work_dir.join(local_file);
        let temp = TempCopy::create(&source, temp_path(work_dir, local_file))?;

        let inspected = match self.mode {
            InspectMode::Announce => Ok(()),
            InspectMode::Modinfo => run_modinfo(&temp.path, out),
        };

        match inspected {
            Ok(()) => temp.remove(),
            Err(e) => {
                // Cleanup failure would mask the real error
                let _ = temp.remove();
                Err(e)
            }
        }
    }
}

fn run_modinfo<W: Write>(module: &Path, out: &mut W) -> Result<()> {
    let result = Cmd::new("modinfo")
        .arg_path(module)
        .error_msg(format!("modinfo failed on {}", module.display()))
        .run()?;
    for line in result.stdout.lines() {
        writeln!(out, "       {}", line)?;
    }
    Ok(())
}
