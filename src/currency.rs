// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::decimal_at;
use crate::error::{FinitorError, Result};
use crate::models::Currency;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// Display names for codes commonly seen in rate feeds.
pub fn display_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "VND" => "Vietnamese Dong",
        "USD" => "US Dollar",
        "EUR" => "Euro",
        "GBP" => "British Pound",
        "JPY" => "Japanese Yen",
        "CNY" => "Chinese Yuan",
        "KRW" => "South Korean Won",
        "SGD" => "Singapore Dollar",
        "THB" => "Thai Baht",
        "AUD" => "Australian Dollar",
        "CAD" => "Canadian Dollar",
        "CHF" => "Swiss Franc",
        "INR" => "Indian Rupee",
        "HKD" => "Hong Kong Dollar",
        "TWD" => "New Taiwan Dollar",
        "MYR" => "Malaysian Ringgit",
        "IDR" => "Indonesian Rupiah",
        "PHP" => "Philippine Peso",
        _ => return None,
    };
    Some(name)
}

/// A conversion that could not be performed because a rate is missing.
/// The amount is passed through unconverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    pub from: String,
    pub to: String,
    pub missing: Vec<String>,
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no exchange rate for {} (converting {} -> {}); amount left unconverted",
            self.missing.join(", "),
            self.from,
            self.to
        )
    }
}

/// Known currencies and their rates against one common reference currency.
pub struct CurrencyTable<'a> {
    conn: &'a Connection,
    default_currency: String,
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn currency_from_row(r: &Row<'_>) -> rusqlite::Result<Currency> {
    Ok(Currency {
        code: r.get(0)?,
        name: r.get(1)?,
        exchange_rate: decimal_at(r, 2)?,
        last_updated: r.get(3)?,
    })
}

impl<'a> CurrencyTable<'a> {
    /// Opens the table and seeds the default currency at rate 1 when no
    /// currency exists yet.
    pub fn open(conn: &'a Connection, default_currency: &str) -> Result<Self> {
        let table = Self {
            conn,
            default_currency: normalize(default_currency),
        };
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM currencies", [], |r| r.get(0))?;
        if count == 0 {
            let code = table.default_currency.clone();
            let name = display_name(&code).unwrap_or(code.as_str()).to_string();
            table.upsert(&code, &name, Decimal::ONE)?;
            tracing::debug!("Seeded default currency {} at rate 1", code);
        }
        Ok(table)
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Insert or fully replace the row for `code`.
    pub fn upsert(&self, code: &str, name: &str, rate: Decimal) -> Result<()> {
        let code = normalize(code);
        if code.is_empty() {
            return Err(FinitorError::validation("currency code must not be empty"));
        }
        if rate <= Decimal::ZERO {
            return Err(FinitorError::InvalidRate { code, rate });
        }
        let name = match name.trim() {
            "" => code.as_str(),
            n => n,
        };
        self.conn.execute(
            "INSERT INTO currencies(code, name, exchange_rate, last_updated) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(code) DO UPDATE SET
                name=excluded.name,
                exchange_rate=excluded.exchange_rate,
                last_updated=excluded.last_updated",
            params![code, name, rate.normalize().to_string(), Local::now().naive_local()],
        )?;
        Ok(())
    }

    pub fn get(&self, code: &str) -> Result<Option<Currency>> {
        let c = self
            .conn
            .query_row(
                "SELECT code, name, exchange_rate, last_updated FROM currencies WHERE code=?1",
                params![normalize(code)],
                currency_from_row,
            )
            .optional()?;
        Ok(c)
    }

    pub fn list(&self) -> Result<Vec<Currency>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, name, exchange_rate, last_updated FROM currencies ORDER BY code",
        )?;
        let rows = stmt.query_map([], currency_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn contains(&self, code: &str) -> Result<bool> {
        Ok(self.rate(&normalize(code))?.is_some())
    }

    fn rate(&self, code: &str) -> Result<Option<Decimal>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT exchange_rate FROM currencies WHERE code=?1")?;
        let r = stmt
            .query_row(params![code], |r| decimal_at(r, 0))
            .optional()?;
        Ok(r)
    }

    /// Convert between two known currencies; a missing rate logs a warning
    /// and returns `amount` unchanged.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        let (value, warning) = self.convert_reporting(amount, from, to)?;
        if let Some(w) = warning {
            tracing::warn!("{}", w);
        }
        Ok(value)
    }

    /// Like `convert`, but hands the warning back instead of logging it.
    pub fn convert_reporting(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<(Decimal, Option<ConversionWarning>)> {
        let from = normalize(from);
        let to = normalize(to);
        if from == to {
            return Ok((amount, None));
        }
        let from_rate = self.rate(&from)?;
        let to_rate = self.rate(&to)?;
        match (from_rate, to_rate) {
            (Some(f), Some(t)) => {
                // multiply first so exact ratios stay exact
                let converted = amount
                    .checked_mul(t)
                    .and_then(|scaled| scaled.checked_div(f))
                    .ok_or_else(|| {
                        FinitorError::validation(format!(
                            "{} {} -> {} is out of range",
                            amount, from, to
                        ))
                    })?;
                Ok((converted, None))
            }
            (f, t) => {
                let mut missing = Vec::new();
                if f.is_none() {
                    missing.push(from.clone());
                }
                if t.is_none() {
                    missing.push(to.clone());
                }
                Ok((amount, Some(ConversionWarning { from, to, missing })))
            }
        }
    }

    /// Apply a `code -> rate` mapping fetched for one base currency.
    /// Non-positive rates are skipped. Returns how many rows were written.
    pub fn refresh(&self, rates: &HashMap<String, Decimal>) -> Result<usize> {
        let mut codes: Vec<&String> = rates.keys().collect();
        codes.sort();
        let mut written = 0;
        for code in codes {
            let rate = rates[code];
            let code = normalize(code);
            if rate <= Decimal::ZERO {
                tracing::warn!("Skipping {}: non-positive rate {}", code, rate);
                continue;
            }
            let name = match self.get(&code)? {
                Some(existing) => existing.name,
                None => display_name(&code).unwrap_or(code.as_str()).to_string(),
            };
            self.upsert(&code, &name, rate)?;
            written += 1;
        }
        tracing::info!("Refreshed {} exchange rates", written);
        Ok(written)
    }
}
