// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinitorError {
    #[error("Invalid amount '{0}', expected e.g. 30k, 1.5m, $100 or 100USD")]
    InvalidAmount(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid exchange rate {rate} for {code}: rate must be positive")]
    InvalidRate { code: String, rate: Decimal },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinitorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors raised before any write because an input was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidRate { .. })
    }
}

pub type Result<T> = std::result::Result<T, FinitorError>;
