use anyhow::{Context, Result};
use radar_finance::PollerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::{self, ensure_radar_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poller: PollerSection,
    pub llm: LlmSection,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub interval_secs: u64,
    pub batch_size: usize,
    pub cache_capacity: usize,
    pub verify_financial_senders: bool,
    pub reject_confidence: f64,
    /// Give up on a confidence check or category lookup after this long
    pub classifier_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub enabled: bool,
    /// "openai" or "anthropic"
    pub provider: String,
    pub model: String,
    /// Defaults to the provider's public endpoint when unset
    pub base_url: Option<String>,
    /// Name of the environment variable that holds the API key
    pub api_key_env: String,
    pub temperature: f32,
    /// Whole-request limit for the HTTP client
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: Option<PathBuf>,
}

impl Default for PollerSection {
    fn default() -> Self {
        let d = PollerConfig::default();
        Self {
            interval_secs: d.interval.as_secs(),
            batch_size: d.batch_size,
            cache_capacity: d.cache_capacity,
            verify_financial_senders: d.verify_financial_senders,
            reject_confidence: d.reject_confidence,
            classifier_timeout_secs: d.classifier_timeout.as_secs(),
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 10,
        }
    }
}

impl PollerSection {
    pub fn to_poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            batch_size: self.batch_size,
            cache_capacity: self.cache_capacity,
            verify_financial_senders: self.verify_financial_senders,
            reject_confidence: self.reject_confidence,
            classifier_timeout: Duration::from_secs(self.classifier_timeout_secs.max(1)),
        }
    }
}

impl Config {
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(p) => Ok(p.clone()),
            None => state::default_store_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_radar_home()?.join("config.toml"))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [poller]
            interval_secs = 30

            [llm]
            enabled = true
            provider = "anthropic"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.poller.interval_secs, 30);
        assert_eq!(cfg.poller.batch_size, 20);
        assert!(cfg.llm.enabled);
        assert_eq!(cfg.llm.api_key_env, "OPENAI_API_KEY");
        assert!(cfg.store.path.is_none());

        let pc = cfg.poller.to_poller_config();
        assert_eq!(pc.interval, Duration::from_secs(30));
        assert_eq!(pc.reject_confidence, 0.8);
        assert_eq!(pc.classifier_timeout, Duration::from_secs(10));
        assert_eq!(cfg.llm.timeout_secs, 10);
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.poller.cache_capacity, 100);
        assert!(!back.llm.enabled);
    }
}
