use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

const HOME_OVERRIDE: &str = "RUPEERADAR_HOME";

fn resolve_home(override_dir: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".rupeeradar")),
        _ => bail!("HOME is not set (or set {HOME_OVERRIDE})"),
    }
}

pub fn radar_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os(HOME_OVERRIDE), std::env::var_os("HOME"))
}

pub fn ensure_radar_home() -> Result<PathBuf> {
    let dir = radar_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_store_path() -> Result<PathBuf> {
    Ok(ensure_radar_home()?.join("transactions.json"))
}
