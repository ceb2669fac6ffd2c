// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::{AmountFormatter, parse_amount_typed};
use crate::config::Config;
use crate::ledger::{Ledger, today};
use crate::models::{NewTransaction, Period, Transaction, TransactionUpdate};
use crate::utils::{date_bounds, maybe_print_json, parse_date, pretty_table, split_tags};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(conn, config)?;
    match m.subcommand() {
        Some(("add", sub)) => add(&ledger, sub)?,
        Some(("list", sub)) => list(&ledger, sub)?,
        Some(("show", sub)) => show(&ledger, sub)?,
        Some(("update", sub)) => update(&ledger, sub)?,
        Some(("delete", sub)) => delete(&ledger, sub)?,
        Some(("post-recurring", sub)) => post_recurring(&ledger, sub)?,
        _ => {}
    }
    Ok(())
}

/// Parse an amount argument, honouring an explicit `--currency` and `--type`.
/// The currency is `None` unless the user named one.
fn amount_arg(sub: &clap::ArgMatches, text: &str) -> Result<(Decimal, Option<String>)> {
    let (mut amount, mut currency) = parse_amount_typed(text)?;
    if let Some(c) = sub.get_one::<String>("currency") {
        currency = Some(c.trim().to_uppercase());
    }
    if let Ok(Some(kind)) = sub.try_get_one::<String>("type") {
        amount = match kind.as_str() {
            "income" => amount.abs(),
            _ => -amount.abs(),
        };
    }
    Ok((amount, currency))
}

fn recurrence_arg(sub: &clap::ArgMatches) -> Result<Option<Period>> {
    Ok(sub
        .get_one::<String>("recurring")
        .map(|s| s.parse::<Period>())
        .transpose()?)
}

fn add(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let text = sub.get_one::<String>("amount").context("amount is required")?;
    let description = sub
        .get_one::<String>("description")
        .context("description is required")?;
    let (amount, currency) = amount_arg(sub, text)?;
    let currency = currency.unwrap_or_else(|| ledger.default_currency().to_string());
    let date = sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?;

    let id = ledger.add(NewTransaction {
        amount,
        description: description.clone(),
        category: sub.get_one::<String>("category").cloned(),
        source: sub.get_one::<String>("source").cloned(),
        date,
        currency: Some(currency.clone()),
        tags: sub
            .get_one::<String>("tags")
            .map(|s| split_tags(s))
            .unwrap_or_default(),
        notes: sub.get_one::<String>("notes").cloned(),
        recurrence: recurrence_arg(sub)?,
    })?;
    let fmt = AmountFormatter::new(ledger.default_currency());
    println!(
        "Recorded {} '{}' (id {})",
        fmt.format(amount, &currency, true),
        description,
        id
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub source: String,
    pub tags: String,
}

impl TransactionRow {
    fn from_transaction(t: &Transaction, fmt: &AmountFormatter, full: bool) -> Self {
        Self {
            id: t.id,
            date: t.date.to_string(),
            description: t.description.clone(),
            amount: fmt.format(t.amount, &t.currency, full),
            currency: t.currency.clone(),
            category: t.category.clone().unwrap_or_default(),
            source: t.source.clone().unwrap_or_default(),
            tags: t.tags.join(", "),
        }
    }
}

/// Transactions selected by the `tx list` filters, newest first, capped at
/// `--limit` or the configured list limit.
pub fn query_rows(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(ledger.list_limit());
    let (from, to) = date_bounds(sub)?;
    let search = sub.get_one::<String>("search");

    if search.is_none() && from.is_none() && to.is_none() {
        return Ok(ledger.recent(Some(limit))?);
    }
    let mut rows = match search {
        Some(q) => ledger.search(q)?,
        None => ledger.list()?,
    };
    rows.retain(|t| from.is_none_or(|f| t.date >= f) && to.is_none_or(|e| t.date <= e));
    rows.truncate(limit);
    Ok(rows)
}

fn list(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ledger, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let fmt = AmountFormatter::new(ledger.default_currency());
    let full = sub.get_flag("full");
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            let r = TransactionRow::from_transaction(t, &fmt, full);
            vec![
                r.id.to_string(),
                r.date,
                r.description,
                r.amount,
                r.category,
                r.source,
                r.tags,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Description", "Amount", "Category", "Source", "Tags"],
            rows,
        )
    );
    Ok(())
}

fn show(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id is required")?;
    let Some(t) = ledger.get(id)? else {
        bail!("Transaction {} not found", id);
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        return Ok(());
    }
    let fmt = AmountFormatter::new(ledger.default_currency());
    let mut rows = vec![
        vec!["ID".to_string(), t.id.to_string()],
        vec!["Date".into(), t.date.to_string()],
        vec!["Description".into(), t.description.clone()],
        vec!["Amount".into(), fmt.format(t.amount, &t.currency, true)],
        vec!["Category".into(), t.category.clone().unwrap_or_default()],
        vec!["Source".into(), t.source.clone().unwrap_or_default()],
        vec!["Tags".into(), t.tags.join(", ")],
        vec!["Notes".into(), t.notes.clone().unwrap_or_default()],
        vec![
            "Created".into(),
            t.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    ];
    if let Some(p) = t.recurrence {
        let next = t.next_date.map(|d| d.to_string()).unwrap_or_default();
        rows.push(vec!["Recurs".into(), format!("{} (next {})", p, next)]);
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn update(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id is required")?;
    let mut changes = TransactionUpdate {
        description: sub.get_one::<String>("description").cloned(),
        category: sub.get_one::<String>("category").cloned(),
        source: sub.get_one::<String>("source").cloned(),
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        currency: sub.get_one::<String>("currency").cloned(),
        tags: sub.get_one::<String>("tags").map(|s| split_tags(s)),
        notes: sub.get_one::<String>("notes").cloned(),
        recurrence: if sub.get_flag("no-recurring") {
            Some(None)
        } else {
            recurrence_arg(sub)?.map(Some)
        },
        ..TransactionUpdate::default()
    };
    if let Some(text) = sub.get_one::<String>("amount") {
        let (amount, currency) = amount_arg(sub, text)?;
        changes.amount = Some(amount);
        // a symbol or code typed with the amount counts as a currency change
        if changes.currency.is_none() {
            changes.currency = currency;
        }
    }
    if !ledger.update(id, changes)? {
        bail!("Transaction {} not found", id);
    }
    println!("Updated transaction {}", id);
    Ok(())
}

fn delete(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id is required")?;
    if ledger.delete(id)? {
        println!("Deleted transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

fn post_recurring(ledger: &Ledger<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = match sub.get_one::<String>("as-of") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let posted = ledger.post_recurring(as_of)?;
    if posted.is_empty() {
        println!("Nothing due on or before {}", as_of);
    } else {
        println!("Posted {} recurring transaction(s) through {}", posted.len(), as_of);
    }
    Ok(())
}
