use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::{PP_MODULE, SEQUENCE_MODULE};

/// The component library itself; always installed.
pub const UI_PACKAGE: &str = "@melt-ui/svelte";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Picks the manager whose lockfile is present in `cwd`, npm otherwise.
    pub fn detect(cwd: &Path) -> Self {
        let pm = if cwd.join("bun.lockb").is_file() || cwd.join("bun.lock").is_file() {
            PackageManager::Bun
        } else if cwd.join("pnpm-lock.yaml").is_file() {
            PackageManager::Pnpm
        } else if cwd.join("yarn.lock").is_file() {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        };
        debug!(cwd = %cwd.display(), manager = %pm, "detected package manager");
        pm
    }

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// `npm install -D <deps>` or `<pm> add -D <deps>`.
    pub fn dev_install_args<'a>(self, deps: &[&'a str]) -> Vec<&'a str> {
        let verb = match self {
            PackageManager::Npm => "install",
            _ => "add",
        };
        let mut args = vec![verb, "-D"];
        args.extend_from_slice(deps);
        args
    }

    pub fn install_dev(self, cwd: &Path, deps: &[&str]) -> Result<()> {
        let args = self.dev_install_args(deps);
        info!(manager = %self, ?args, "installing dependencies");
        let output = Command::new(self.program())
            .args(&args)
            .current_dir(cwd)
            .output()
            .map_err(|e| Error::Install {
                manager: self.to_string(),
                detail: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::Install {
                manager: self.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Packages to install, depending on whether the preprocessor was wired in.
pub fn dependencies(with_preprocessor: bool) -> Vec<&'static str> {
    if with_preprocessor {
        vec![UI_PACKAGE, PP_MODULE, SEQUENCE_MODULE]
    } else {
        vec![UI_PACKAGE]
    }
}
