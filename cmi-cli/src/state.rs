use anyhow::{bail, Context, Result};
use cmi_core::JournalRow;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the config directory, otherwise `$HOME/.cmi-journal`
pub const HOME_VAR: &str = "CMI_HOME";

fn resolve_home(cmi_home: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    match (cmi_home.filter(|v| !v.is_empty()), home.filter(|v| !v.is_empty())) {
        (Some(dir), _) => Ok(PathBuf::from(dir)),
        (None, Some(home)) => Ok(PathBuf::from(home).join(".cmi-journal")),
        (None, None) => bail!("neither {HOME_VAR} nor HOME is set"),
    }
}

pub fn app_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os(HOME_VAR), std::env::var_os("HOME"))
}

pub fn ensure_app_home() -> Result<PathBuf> {
    let dir = app_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_rows_json(path: &Path) -> Result<Vec<JournalRow>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse rows from {}", path.display()))
}

pub fn write_rows_json(path: &Path, rows: &[JournalRow]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
