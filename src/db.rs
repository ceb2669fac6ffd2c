// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Config, project_dirs};
use crate::error::Result;
use crate::models::Period;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

pub fn db_path(config: &Config) -> Result<PathBuf> {
    if let Some(p) = &config.database {
        return Ok(p.clone());
    }
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("finitor.sqlite"))
}

pub fn open_or_init(config: &Config) -> Result<Connection> {
    let path = db_path(config)?;
    let conn = Connection::open(&path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT,
        source TEXT,
        date TEXT NOT NULL,
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL,
        recurrence TEXT CHECK(recurrence IN ('daily','weekly','monthly','yearly')),
        next_date TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        notes TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    -- one row per code; rate = units of this currency per one reference unit
    CREATE TABLE IF NOT EXISTS currencies(
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        exchange_rate TEXT NOT NULL,
        last_updated TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        period TEXT NOT NULL CHECK(period IN ('daily','weekly','monthly','yearly')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS alerts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL,
        read INTEGER NOT NULL DEFAULT 0
    );
    "#,
    )?;
    Ok(())
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

// Decimals live in TEXT columns to keep them exact.
pub(crate) fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.trim().parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn period_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Period>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        Some(s) => s.parse::<Period>().map(Some).map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn tags_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: Option<String> = row.get(idx)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| conversion_error(idx, e)),
    }
}
