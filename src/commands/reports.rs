// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::AmountFormatter;
use crate::config::Config;
use crate::ledger::{Ledger, today};
use crate::utils::{date_bounds, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(conn, config)?;
    match m.subcommand() {
        Some(("category", sub)) => grouped(&ledger, sub, "Category")?,
        Some(("source", sub)) => grouped(&ledger, sub, "Source")?,
        Some(("month", sub)) => month(&ledger, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BalanceOut {
    balance: Decimal,
    currency: String,
    warnings: Vec<String>,
}

pub fn balance(conn: &Connection, config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(conn, config)?;
    let report = ledger.balance_report(sub.get_one::<String>("currency").map(|s| s.as_str()))?;
    let out = BalanceOut {
        balance: report.total,
        currency: report.currency.clone(),
        warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        return Ok(());
    }
    let fmt = AmountFormatter::new(ledger.default_currency());
    println!(
        "Balance: {}",
        fmt.format(report.total, &report.currency, sub.get_flag("full"))
    );
    for w in &out.warnings {
        println!("warning: {}", w);
    }
    Ok(())
}

#[derive(Serialize)]
struct GroupTotal {
    name: String,
    total: Decimal,
}

fn grouped(ledger: &Ledger<'_>, sub: &clap::ArgMatches, heading: &str) -> Result<()> {
    let (from, to) = date_bounds(sub)?;
    let totals: BTreeMap<String, Decimal> = if heading == "Category" {
        ledger.category_summary(from, to)?
    } else {
        ledger.source_summary(from, to)?
    };
    let data: Vec<GroupTotal> = totals
        .into_iter()
        .map(|(name, total)| GroupTotal { name, total })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    // native totals, labelled with the default code
    let fmt = AmountFormatter::new(ledger.default_currency());
    let full = sub.get_flag("full");
    let rows = data
        .iter()
        .map(|g| {
            vec![
                g.name.clone(),
                fmt.format(g.total, ledger.default_currency(), full),
            ]
        })
        .collect();
    println!("{}", pretty_table(&[heading, "Total"], rows));
    Ok(())
}

fn month(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => {
            let d = today();
            (d.year(), d.month())
        }
    };
    let summary = ledger.monthly_summary(year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        return Ok(());
    }
    let fmt = AmountFormatter::new(ledger.default_currency());
    let full = sub.get_flag("full");
    let code = ledger.default_currency();
    let rows = vec![
        vec!["Income".to_string(), fmt.format(summary.income, code, full)],
        vec!["Expenses".to_string(), fmt.format(summary.expenses, code, full)],
        vec!["Net".to_string(), fmt.format(summary.total, code, full)],
    ];
    let heading = format!("{}-{:02}", year, month);
    println!("{}", pretty_table(&[heading.as_str(), "Amount"], rows));
    Ok(())
}
