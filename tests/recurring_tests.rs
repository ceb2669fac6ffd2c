// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finitor::config::Config;
use finitor::{cli, commands::transactions, db};
use finitor::ledger::Ledger;
use finitor::models::{NewTransaction, Period, TransactionUpdate};
use rust_decimal::Decimal;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn template(amount: i64, desc: &str, date: &str, period: Period) -> NewTransaction {
    NewTransaction {
        date: Some(day(date)),
        category: Some("Housing".into()),
        tags: vec!["fixed".into()],
        recurrence: Some(period),
        ..NewTransaction::new(Decimal::from(amount), desc)
    }
}

#[test]
fn period_advances_by_calendar_step() {
    assert_eq!(Period::Daily.advance(day("2025-12-31")), Some(day("2026-01-01")));
    assert_eq!(Period::Weekly.advance(day("2025-01-01")), Some(day("2025-01-08")));
    assert_eq!(Period::Monthly.advance(day("2025-01-31")), Some(day("2025-02-28")));
    assert_eq!(Period::Yearly.advance(day("2024-02-29")), Some(day("2025-02-28")));
    assert_eq!("Weekly".parse::<Period>().unwrap(), Period::Weekly);
    assert!("fortnightly".parse::<Period>().is_err());
}

#[test]
fn template_gets_next_date_on_insert() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-5_000_000, "Rent", "2025-01-10", Period::Monthly))
        .unwrap();
    let t = ledger.get(id).unwrap().unwrap();
    assert!(t.is_recurring());
    assert_eq!(t.next_date, Some(day("2025-02-10")));
}

#[test]
fn posting_catches_up_missed_occurrences() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let rent = ledger
        .add(template(-5_000_000, "Rent", "2025-01-10", Period::Monthly))
        .unwrap();

    assert!(ledger.due_recurring(day("2025-02-09")).unwrap().is_empty());
    assert_eq!(ledger.due_recurring(day("2025-02-10")).unwrap().len(), 1);

    let posted = ledger.post_recurring(day("2025-03-15")).unwrap();
    assert_eq!(posted.len(), 2);

    let dates: Vec<NaiveDate> = posted
        .iter()
        .map(|id| ledger.get(*id).unwrap().unwrap().date)
        .collect();
    assert_eq!(dates, vec![day("2025-02-10"), day("2025-03-10")]);

    for id in &posted {
        let t = ledger.get(*id).unwrap().unwrap();
        assert_eq!(t.amount, Decimal::from(-5_000_000));
        assert_eq!(t.currency, "VND");
        assert_eq!(t.category.as_deref(), Some("Housing"));
        assert_eq!(t.tags, vec!["fixed".to_string()]);
        assert!(!t.is_recurring());
        assert_eq!(t.next_date, None);
    }

    let tpl = ledger.get(rent).unwrap().unwrap();
    assert_eq!(tpl.next_date, Some(day("2025-04-10")));
    assert_eq!(ledger.count().unwrap(), 3);

    // nothing left to post for the same day
    assert!(ledger.post_recurring(day("2025-03-15")).unwrap().is_empty());
    assert_eq!(ledger.count().unwrap(), 3);
}

#[test]
fn weekly_and_monthly_templates_post_independently() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    ledger
        .add(template(-100_000, "Cleaner", "2025-01-01", Period::Weekly))
        .unwrap();
    ledger
        .add(template(-5_000_000, "Rent", "2025-01-01", Period::Monthly))
        .unwrap();

    let posted = ledger.post_recurring(day("2025-01-20")).unwrap();
    assert_eq!(posted.len(), 2);
    let cleaner = ledger.search("cleaner").unwrap();
    // template plus 2025-01-08 and 2025-01-15
    assert_eq!(cleaner.len(), 3);
}

#[test]
fn month_end_template_keeps_its_day_of_month() {
    assert_eq!(Period::Monthly.occurrence(day("2025-01-31"), 2), Some(day("2025-03-31")));
    assert_eq!(Period::Monthly.occurrence(day("2025-01-31"), 3), Some(day("2025-04-30")));

    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-2_000_000, "Savings", "2025-01-31", Period::Monthly))
        .unwrap();
    let posted = ledger.post_recurring(day("2025-05-31")).unwrap();
    let dates: Vec<NaiveDate> = posted
        .iter()
        .map(|id| ledger.get(*id).unwrap().unwrap().date)
        .collect();
    assert_eq!(
        dates,
        vec![
            day("2025-02-28"),
            day("2025-03-31"),
            day("2025-04-30"),
            day("2025-05-31")
        ]
    );
    let tpl = ledger.get(id).unwrap().unwrap();
    assert_eq!(tpl.next_date, Some(day("2025-06-30")));
}

#[test]
fn updating_a_posted_template_does_not_repost() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-5_000_000, "Rent", "2025-01-10", Period::Monthly))
        .unwrap();
    assert_eq!(ledger.post_recurring(day("2025-06-15")).unwrap().len(), 5);

    ledger
        .update(
            id,
            TransactionUpdate {
                amount: Some(Decimal::from(-5_500_000)),
                notes: Some("new lease".into()),
                recurrence: Some(Some(Period::Monthly)),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();
    let t = ledger.get(id).unwrap().unwrap();
    assert_eq!(t.next_date, Some(day("2025-07-10")));

    assert!(ledger.post_recurring(day("2025-06-15")).unwrap().is_empty());
    assert_eq!(ledger.count().unwrap(), 6);
}

#[test]
fn changing_recurrence_keeps_posted_history() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-100_000, "Gym", "2025-01-01", Period::Monthly))
        .unwrap();
    assert_eq!(ledger.post_recurring(day("2025-03-01")).unwrap().len(), 2);

    ledger
        .update(
            id,
            TransactionUpdate {
                recurrence: Some(Some(Period::Weekly)),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();
    let t = ledger.get(id).unwrap().unwrap();
    assert_eq!(t.recurrence, Some(Period::Weekly));
    // first weekly step on or after the old next date (2025-04-01)
    assert_eq!(t.next_date, Some(day("2025-04-02")));

    let posted = ledger.post_recurring(day("2025-04-10")).unwrap();
    let dates: Vec<NaiveDate> = posted
        .iter()
        .map(|id| ledger.get(*id).unwrap().unwrap().date)
        .collect();
    assert_eq!(dates, vec![day("2025-04-02"), day("2025-04-09")]);
}

#[test]
fn moving_the_date_restarts_the_schedule_from_it() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-100_000, "Gym", "2025-01-01", Period::Monthly))
        .unwrap();
    ledger
        .update(
            id,
            TransactionUpdate {
                date: Some(day("2025-03-15")),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();
    let t = ledger.get(id).unwrap().unwrap();
    assert_eq!(t.next_date, Some(day("2025-04-15")));
}

#[test]
fn clearing_recurrence_stops_posting() {
    let conn = db::open_in_memory().unwrap();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let id = ledger
        .add(template(-5_000_000, "Rent", "2025-01-10", Period::Monthly))
        .unwrap();
    ledger
        .update(
            id,
            TransactionUpdate {
                recurrence: Some(None),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();

    let t = ledger.get(id).unwrap().unwrap();
    assert!(!t.is_recurring());
    assert_eq!(t.next_date, None);
    assert_eq!(t.amount, Decimal::from(-5_000_000));
    assert!(ledger.due_recurring(day("2026-01-01")).unwrap().is_empty());
    assert!(ledger.post_recurring(day("2026-01-01")).unwrap().is_empty());
    assert_eq!(ledger.count().unwrap(), 1);
}

#[test]
fn no_recurring_flag_clears_a_template() {
    let conn = db::open_in_memory().unwrap();
    let config = Config::default();
    let ledger = Ledger::new(&conn, &config).unwrap();
    let id = ledger
        .add(template(-5_000_000, "Rent", "2025-01-10", Period::Monthly))
        .unwrap();

    let id_arg = id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "finitor",
        "tx",
        "update",
        id_arg.as_str(),
        "--no-recurring",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    transactions::handle(&conn, &config, tx_m).unwrap();

    let t = ledger.get(id).unwrap().unwrap();
    assert_eq!(t.recurrence, None);
    assert_eq!(t.next_date, None);

    let clash = cli::build_cli().try_get_matches_from([
        "finitor",
        "tx",
        "update",
        id_arg.as_str(),
        "--no-recurring",
        "--recurring",
        "weekly",
    ]);
    assert!(clash.is_err());
}
