use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::state::{default_store_path, ensure_taskdeck_home, taskdeck_home};

/// Overrides `[store] endpoint`.
pub const STORE_ENV: &str = "TASKDECK_STORE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreSection,
    pub board: BoardSection,
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreSection {
    /// Path of the task store file. Required, here or via TASKDECK_STORE.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSection {
    /// Cells the mouse must travel with the button held before a drag starts.
    pub activation_distance: f32,
    /// "dashboard" or a project name.
    pub default_view: String,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            activation_distance: 2.0,
            default_view: "dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthSection {
    pub passcode: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no task store configured.\nSet TASKDECK_STORE=<path> or add\n\n  [store]\n  endpoint = \"<path>\"\n\nto {0} (or run: taskdeck init)"
    )]
    MissingStoreEndpoint(String),
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_taskdeck_home()?.join("config.toml"))
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

pub fn init_config(passcode: Option<String>) -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let mut cfg = Config::default();
    cfg.store.endpoint = Some(default_store_path()?.display().to_string());
    cfg.auth.passcode = passcode;
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    if cfg.auth.passcode.is_none() {
        println!("Set [auth] passcode in it before logging in.");
    }
    Ok(())
}

/// Store location: the environment wins over the config file; blank values
/// count as unset.
pub fn resolve_store_endpoint(env: Option<String>, cfg: &Config) -> Result<PathBuf, ConfigError> {
    env.filter(|s| !s.trim().is_empty())
        .or_else(|| cfg.store.endpoint.clone().filter(|s| !s.trim().is_empty()))
        .map(PathBuf::from)
        .ok_or_else(|| {
            let where_ = taskdeck_home()
                .map(|h| h.join("config.toml").display().to_string())
                .unwrap_or_else(|_| "~/.taskdeck/config.toml".to_string());
            ConfigError::MissingStoreEndpoint(where_)
        })
}

pub fn store_endpoint(cfg: &Config) -> Result<PathBuf, ConfigError> {
    resolve_store_endpoint(std::env::var(STORE_ENV).ok(), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[store]\nendpoint = \"/tmp/t.json\"\n").unwrap();
        assert_eq!(cfg.store.endpoint.as_deref(), Some("/tmp/t.json"));
        assert_eq!(cfg.board.activation_distance, 2.0);
        assert_eq!(cfg.board.default_view, "dashboard");
        assert!(cfg.auth.passcode.is_none());
    }

    #[test]
    fn env_overrides_file_and_blank_is_unset() {
        let mut cfg = Config::default();
        cfg.store.endpoint = Some("/from/file.json".into());
        assert_eq!(
            resolve_store_endpoint(Some("/from/env.json".into()), &cfg).unwrap(),
            PathBuf::from("/from/env.json")
        );
        assert_eq!(
            resolve_store_endpoint(Some("  ".into()), &cfg).unwrap(),
            PathBuf::from("/from/file.json")
        );
    }

    #[test]
    fn missing_endpoint_is_a_config_error() {
        let mut cfg = Config::default();
        cfg.store.endpoint = Some(String::new());
        let err = resolve_store_endpoint(None, &cfg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingStoreEndpoint(_)));
        assert!(err.to_string().contains(STORE_ENV));
    }
}
