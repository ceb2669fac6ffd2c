// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::ledger::Ledger;
use crate::models::ExportRecord;
use crate::utils::date_bounds;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, config, sub),
        _ => Ok(()),
    }
}

// CSV cells are flat, so tags collapse into one `;`-joined column.
#[derive(Serialize)]
struct CsvRecord<'r> {
    id: i64,
    date: &'r str,
    amount: String,
    currency: &'r str,
    description: &'r str,
    category: &'r str,
    source: &'r str,
    tags: String,
    notes: &'r str,
    recurrence: &'r str,
    next_date: &'r str,
    created_at: &'r str,
}

impl<'r> From<&'r ExportRecord> for CsvRecord<'r> {
    fn from(r: &'r ExportRecord) -> Self {
        Self {
            id: r.id,
            date: &r.date,
            amount: r.amount.to_string(),
            currency: &r.currency,
            description: &r.description,
            category: &r.category,
            source: &r.source,
            tags: r.tags.join(";"),
            notes: &r.notes,
            recurrence: &r.recurrence,
            next_date: &r.next_date,
            created_at: &r.created_at,
        }
    }
}

pub fn write_json(records: &[ExportRecord], out: &Path) -> Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(records)?)
        .with_context(|| format!("Writing {}", out.display()))?;
    Ok(())
}

pub fn write_csv(records: &[ExportRecord], out: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out)
        .with_context(|| format!("Creating {}", out.display()))?;
    for r in records {
        wtr.serialize(CsvRecord::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

fn export_transactions(conn: &Connection, config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "json".into());
    let out = Path::new(sub.get_one::<String>("out").context("--out is required")?);
    if !matches!(fmt.as_str(), "json" | "csv") {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let ledger = Ledger::new(conn, config)?;
    let (from, to) = date_bounds(sub)?;
    let mut records = ledger.export(from, to)?;
    // files read top to bottom in date order
    records.reverse();

    match fmt.as_str() {
        "csv" => write_csv(&records, out)?,
        _ => write_json(&records, out)?,
    }
    println!("Exported {} transactions to {}", records.len(), out.display());
    Ok(())
}
