// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::db;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(config: &Config, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already present at {}", config_path.display());
    } else {
        config
            .save_to(config_path)
            .with_context(|| format!("Writing {}", config_path.display()))?;
        println!("Wrote default config to {}", config_path.display());
    }
    println!("Database initialized at {}", db::db_path(config)?.display());
    Ok(())
}
