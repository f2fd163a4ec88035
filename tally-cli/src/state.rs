use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$TALLY_HOME`, or `~/.tally`
pub fn tally_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TALLY_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set TALLY_HOME)")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
