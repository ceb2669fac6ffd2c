// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::{AmountFormatter, parse_amount};
use crate::budget::{BUDGET_ALERT, BudgetTracker};
use crate::config::Config;
use crate::ledger::Ledger;
use crate::models::Period;
use crate::utils::{maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(conn, config)?;
    let tracker = BudgetTracker::new(conn, &ledger);
    match m.subcommand() {
        Some(("add", sub)) => add(&tracker, &ledger, sub)?,
        Some(("list", sub)) => list(&tracker, &ledger, sub)?,
        Some(("check", sub)) => check(&tracker, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(tracker: &BudgetTracker<'_>, ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").context("category is required")?;
    let text = sub.get_one::<String>("amount").context("amount is required")?;
    // thresholds compare against native totals, so any currency code is dropped
    let (amount, _) = parse_amount(text, ledger.default_currency())?;
    let period = sub
        .get_one::<String>("period")
        .map(|s| s.parse::<Period>())
        .transpose()?
        .unwrap_or(Period::Monthly);
    let start = sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?;
    let end = sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?;

    let id = tracker.add_budget(category, amount, period, start, end)?;
    println!(
        "Budget {} set for {}: {} {}",
        id, category, amount, period
    );
    Ok(())
}

fn list(tracker: &BudgetTracker<'_>, ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let data = tracker.budgets()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let fmt = AmountFormatter::new(ledger.default_currency());
    let rows = data
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.category.clone(),
                fmt.format(b.amount, ledger.default_currency(), true),
                b.period.to_string(),
                b.start_date.to_string(),
                b.end_date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Category", "Limit", "Period", "Start", "End"], rows)
    );
    Ok(())
}

fn check(tracker: &BudgetTracker<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let alerts = tracker.check_alerts()?;
    if sub.get_flag("record") {
        for a in &alerts {
            tracker.record_alert(BUDGET_ALERT, &a.message)?;
        }
    }
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &alerts)? {
        return Ok(());
    }
    if alerts.is_empty() {
        println!("All budgets within limits.");
        return Ok(());
    }
    for a in &alerts {
        println!("{}", a.message);
    }
    if sub.get_flag("record") {
        println!("Recorded {} alert(s).", alerts.len());
    }
    Ok(())
}
