//! CLI commands
//!
//! `from` generates marker documents; `resolve.*` and `node-path` query the
//! namespace built from the marker files above the working directory.

pub mod from;
pub mod resolve;

use anyhow::{bail, Context as _};
use libjson::Options;
use std::path::PathBuf;

/// Settings shared by all commands, fixed at start-up
pub struct Context {
    /// Absolute working directory
    pub cwd: PathBuf,
    pub options: Options,
}

impl Context {
    pub fn new(cwd: Option<PathBuf>, allow_missing: bool) -> anyhow::Result<Self> {
        let current = std::env::current_dir().context("cannot read current directory")?;
        let cwd = match cwd {
            Some(dir) => current.join(dir),
            None => current,
        };
        if !cwd.is_dir() {
            bail!("working directory does not exist: {}", cwd.display());
        }
        let cwd = libjson::paths::normalize(&cwd);

        tracing::debug!(cwd = %cwd.display(), allow_missing, "starting");

        Ok(Self {
            cwd,
            options: Options::from_env().with_allow_missing(allow_missing),
        })
    }
}
