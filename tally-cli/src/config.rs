use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_data_path, ensure_tally_home};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub log: LogSection,
    pub clock: ClockSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSection {
    /// Data blob location (default: ~/.tally/data.json)
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// tracing level for tally crates; RUST_LOG overrides
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// IANA timezone used to decide "today" and the current month
    pub timezone: String,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl Config {
    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.storage.data_file {
            Some(p) => Ok(p.clone()),
            None => default_data_path(),
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(tally_core::time::parse_timezone(&self.clock.timezone)?)
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
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: Config = toml::from_str("[clock]\ntimezone = \"Europe/Paris\"\n").unwrap();
        assert_eq!(cfg.clock.timezone, "Europe/Paris");
        assert_eq!(cfg.log.level, "warn");
        assert!(cfg.storage.data_file.is_none());
        assert!(cfg.timezone().is_ok());
    }

    #[test]
    fn test_default_config_round_trips() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.clock.timezone, "UTC");
    }
}
