// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::{AmountFormatter, parse_amount_typed};
use crate::config::Config;
use crate::currency::{CurrencyTable, display_name};
use crate::utils::{http_client, maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

const RATES_URL: &str = "https://open.er-api.com/v6/latest";

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let table = CurrencyTable::open(conn, &config.default_currency)?;
    match m.subcommand() {
        Some(("list", sub)) => list(&table, sub)?,
        Some(("set", sub)) => set(&table, sub)?,
        Some(("convert", sub)) => convert(&table, sub)?,
        Some(("fetch", sub)) => {
            let base = sub
                .get_one::<String>("base")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_else(|| table.default_currency().to_string());
            fetch(&table, &base)?;
        }
        _ => {}
    }
    Ok(())
}

fn list(table: &CurrencyTable<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let data = table.list()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|c| {
            vec![
                c.code,
                c.name,
                c.exchange_rate.to_string(),
                c.last_updated.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Code", "Name", "Rate", "Updated"], rows)
    );
    Ok(())
}

fn set(table: &CurrencyTable<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let code = sub
        .get_one::<String>("code")
        .context("code is required")?
        .trim()
        .to_uppercase();
    let rate_s = sub.get_one::<String>("rate").context("rate is required")?;
    let rate = rate_s
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid rate '{}'", rate_s))?;
    let name = match sub.get_one::<String>("name") {
        Some(n) => n.clone(),
        None => match table.get(&code)? {
            Some(existing) => existing.name,
            None => display_name(&code).unwrap_or(code.as_str()).to_string(),
        },
    };
    table.upsert(&code, &name, rate)?;
    println!("{} ({}) = {} per reference unit", code, name, rate);
    Ok(())
}

fn convert(table: &CurrencyTable<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let text = sub.get_one::<String>("amount").context("amount is required")?;
    let from = sub.get_one::<String>("from").context("from is required")?;
    let to = sub.get_one::<String>("to").context("to is required")?;
    let (amount, typed) = parse_amount_typed(text)?;
    if let Some(code) = typed {
        if !code.eq_ignore_ascii_case(from.trim()) {
            bail!("Amount '{}' is in {}, not {}", text, code, from.trim().to_uppercase());
        }
    }
    for code in [from, to] {
        if !table.contains(code)? {
            bail!("Unknown currency {}; add it with `currency set` or `currency fetch`", code);
        }
    }
    let converted = table.convert(amount, from, to)?;
    let fmt = AmountFormatter::new(table.default_currency());
    let full = sub.get_flag("full");
    println!(
        "{} = {}",
        fmt.format(amount, from, full),
        fmt.format(converted, to, full)
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    result: String,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

/// Latest `code -> rate` table for `base` (units of each code per one `base`).
pub fn fetch_rates(base: &str) -> Result<HashMap<String, Decimal>> {
    let url = format!("{}/{}", RATES_URL, base);
    let client = http_client()?;
    let resp = client.get(url).send()?.error_for_status()?;
    let body: LatestRates = resp.json().context("Unexpected rate feed response")?;
    if body.result != "success" || body.rates.is_empty() {
        bail!("Rate feed returned '{}' for {}", body.result, base);
    }
    Ok(body.rates)
}

fn fetch(table: &CurrencyTable<'_>, base: &str) -> Result<()> {
    let rates = match fetch_rates(base) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Rate fetch for {} failed: {:#}", base, e);
            println!("No rates available; stored rates left unchanged.");
            return Ok(());
        }
    };
    let written = table.refresh(&rates)?;
    println!("Updated {} rates against {} (open.er-api.com).", written, base);
    Ok(())
}
