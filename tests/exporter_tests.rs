// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finitor::config::Config;
use finitor::ledger::Ledger;
use finitor::models::NewTransaction;
use finitor::{cli, commands::exporter, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::tempdir;

fn seeded() -> Connection {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    ledger
        .add(NewTransaction {
            category: Some("Groceries".into()),
            source: Some("Corner Shop".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 2),
            tags: vec!["weekly".into(), "food".into()],
            notes: Some("Weekly run".into()),
            ..NewTransaction::new(Decimal::from_str("-123400").unwrap(), "Groceries run")
        })
        .unwrap();
    ledger
        .add(NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 5),
            ..NewTransaction::new(Decimal::from(9_000_000), "Salary")
        })
        .unwrap();
    conn
}

fn run_export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "finitor",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(conn, &Config::default(), export_m)
}

#[test]
fn export_transactions_writes_pretty_json_in_date_order() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    run_export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["date"], "2025-01-02");
    assert_eq!(items[0]["amount"], "-123400");
    assert_eq!(items[0]["currency"], "VND");
    assert_eq!(items[0]["category"], "Groceries");
    assert_eq!(items[0]["source"], "Corner Shop");
    assert_eq!(items[0]["tags"], serde_json::json!(["weekly", "food"]));
    assert_eq!(items[0]["notes"], "Weekly run");
    assert_eq!(items[1]["description"], "Salary");
    assert_eq!(items[1]["category"], "");
}

#[test]
fn export_transactions_writes_csv_with_joined_tags() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    run_export(&conn, "CSV", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[1], "date");
    assert_eq!(&headers[7], "tags");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "2025-01-02");
    assert_eq!(&rows[0][2], "-123400");
    assert_eq!(&rows[0][7], "weekly;food");
    assert_eq!(&rows[1][4], "Salary");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(run_export(&conn, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
