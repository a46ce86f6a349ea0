use anyhow::{bail, Context, Result};
use cmi_export::{csv_out, xlsx};
use cmi_extract::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use cmi_extract::{ExtractionMode, GeminiConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::ensure_app_home;

/// Environment variables holding the Gemini credential, first match wins
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiSection,
    pub extract: ExtractSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    /// Unset means wait for the service however long it takes
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    pub mode: ExtractionMode,
    /// Fail when model-produced rows break the rule table (rows mode only)
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub sheet_name: String,
    pub xlsx_file_name: String,
    pub csv_file_name: String,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: Some(0.0),
            timeout_secs: None,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            sheet_name: xlsx::DEFAULT_SHEET_NAME.to_string(),
            xlsx_file_name: xlsx::DEFAULT_FILE_NAME.to_string(),
            csv_file_name: csv_out::DEFAULT_FILE_NAME.to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_app_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn api_key() -> Result<String> {
    for var in API_KEY_VARS {
        if let Ok(v) = std::env::var(var) {
            if !v.trim().is_empty() {
                return Ok(v.trim().to_string());
            }
        }
    }
    bail!("no API key found; export GEMINI_API_KEY (or put it in a .env file)")
}

/// Gemini settings from the config file, with `CMI_MODEL` / `CMI_BASE_URL` overrides.
pub fn gemini_config(cfg: &Config) -> Result<GeminiConfig> {
    let mut g = GeminiConfig::new(api_key()?);
    g.model = std::env::var("CMI_MODEL").unwrap_or_else(|_| cfg.gemini.model.clone());
    g.base_url = std::env::var("CMI_BASE_URL").unwrap_or_else(|_| cfg.gemini.base_url.clone());
    g.temperature = cfg.gemini.temperature;
    g.timeout = cfg.gemini.timeout_secs.map(Duration::from_secs);
    Ok(g)
}
