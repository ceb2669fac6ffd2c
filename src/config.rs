// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{FinitorError, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("org", "Finitor", "finitor"));

pub const CONFIG_ENV: &str = "FINITOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

fn default_currency() -> String {
    "VND".to_string()
}

fn default_list_limit() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            list_limit: default_list_limit(),
            database: None,
        }
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
        FinitorError::Config("Could not determine platform-specific directories".into())
    })
}

impl Config {
    /// `$FINITOR_CONFIG` if set, otherwise `config.toml` in the platform config dir.
    pub fn path() -> Result<PathBuf> {
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(p));
        }
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Missing file means defaults; a file that exists must parse.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        tracing::debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            FinitorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
            .map_err(|e| FinitorError::Config(format!("{} ({})", e, path.display())))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: Config = toml::from_str(s)
            .map_err(|e| FinitorError::Config(format!("Failed to parse TOML: {}", e)))?;
        cfg.default_currency = cfg.default_currency.trim().to_uppercase();
        if cfg.default_currency.is_empty() {
            return Err(FinitorError::Config("default_currency must not be empty".into()));
        }
        if cfg.list_limit == 0 {
            return Err(FinitorError::Config("list_limit must be at least 1".into()));
        }
        Ok(cfg)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| FinitorError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}
