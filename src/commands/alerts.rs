// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::BudgetTracker;
use crate::config::Config;
use crate::ledger::Ledger;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(conn, config)?;
    let tracker = BudgetTracker::new(conn, &ledger);
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = tracker.unread_alerts()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                if data.is_empty() {
                    println!("No unread alerts.");
                } else {
                    let rows = data
                        .into_iter()
                        .map(|a| {
                            vec![
                                a.id.to_string(),
                                a.r#type,
                                a.message,
                                a.created_at.format("%Y-%m-%d %H:%M").to_string(),
                            ]
                        })
                        .collect();
                    println!("{}", pretty_table(&["ID", "Type", "Message", "Created"], rows));
                }
            }
        }
        Some(("read", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id is required")?;
            if !tracker.mark_read(id)? {
                bail!("Alert {} not found", id);
            }
            println!("Alert {} marked as read", id);
        }
        _ => {}
    }
    Ok(())
}
