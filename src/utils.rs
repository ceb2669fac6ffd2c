// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};

const UA: &str = concat!("finitor/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let (y, m) = s
        .trim()
        .split_once('-')
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    let year: i32 = y
        .parse()
        .with_context(|| format!("Invalid year in '{}'", s))?;
    let month: u32 = m
        .parse()
        .with_context(|| format!("Invalid month in '{}'", s))?;
    if !(1..=12).contains(&month) {
        bail!("Invalid month number {}", month);
    }
    Ok((year, month))
}

/// Optional `--from`/`--to` bounds shared by listing, summary and export commands.
pub fn date_bounds(sub: &clap::ArgMatches) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let from = sub
        .get_one::<String>("from")
        .map(|s| parse_date(s))
        .transpose()?;
    let to = sub
        .get_one::<String>("to")
        .map(|s| parse_date(s))
        .transpose()?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            bail!("--from {} is after --to {}", f, t);
        }
    }
    Ok((from, to))
}

/// Comma-separated tags; blanks are dropped, order is kept.
pub fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
