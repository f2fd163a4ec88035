use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_finance::{AssistConfig, Provider};
use tally_ingest::AmountPolicy;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub import: ImportSection,
    pub assist: AssistSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory for stored blobs; relative paths are under the tally home
    pub dir: PathBuf,
    /// Key the transaction list is stored under
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub amount_policy: AmountPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSection {
    /// Ask the assistant on every import, without `--assist`
    pub enabled: bool,
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("storage"),
            key: tally_core::DEFAULT_KEY.to_string(),
        }
    }
}

impl Default for AssistSection {
    fn default() -> Self {
        let d = AssistConfig::default();
        Self {
            enabled: false,
            provider: d.provider,
            base_url: d.base_url,
            model: d.model,
            timeout_secs: d.timeout.as_secs(),
        }
    }
}

impl AssistSection {
    /// Runtime assistant settings; the OpenAI key comes from `OPENAI_API_KEY`
    pub fn to_assist_config(&self) -> AssistConfig {
        AssistConfig {
            provider: self.provider,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

impl Config {
    pub fn storage_dir(&self, home: &Path) -> PathBuf {
        if self.storage.dir.is_absolute() {
            self.storage.dir.clone()
        } else {
            home.join(&self.storage.dir)
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
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
