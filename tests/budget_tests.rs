// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finitor::budget::{BUDGET_ALERT, BudgetTracker};
use finitor::config::Config;
use finitor::db;
use finitor::ledger::Ledger;
use finitor::models::{NewTransaction, Period};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn spend(ledger: &Ledger<'_>, amount: &str, category: &str, date: &str) {
    ledger
        .add(NewTransaction {
            category: Some(category.into()),
            date: Some(day(date)),
            ..NewTransaction::new(dec(amount), "spend")
        })
        .unwrap();
}

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

#[test]
fn food_overspend_raises_one_alert() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    tracker
        .add_budget("Food", dec("1000000"), Period::Monthly, Some(day("2025-05-01")), None)
        .unwrap();
    spend(&ledger, "-700000", "Food", "2025-05-03");
    spend(&ledger, "-500000", "Food", "2025-05-18");
    // last month does not count
    spend(&ledger, "-9000000", "Food", "2025-04-30");

    let alerts = tracker.check_alerts_on(day("2025-05-20")).unwrap();
    assert_eq!(alerts.len(), 1);
    let a = &alerts[0];
    assert_eq!(a.category, "Food");
    assert_eq!(a.threshold, dec("1000000"));
    assert_eq!(a.spent, dec("-1200000"));
    assert_eq!(a.message, "Budget limit of 1000000 reached for Food (-1200000)");
}

#[test]
fn threshold_is_inclusive_and_under_spend_is_quiet() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    tracker
        .add_budget("Food", dec("500000"), Period::Monthly, None, None)
        .unwrap();
    tracker
        .add_budget("Fun", dec("500000"), Period::Monthly, None, None)
        .unwrap();
    tracker
        .add_budget("Travel", dec("500000"), Period::Yearly, None, None)
        .unwrap();
    spend(&ledger, "-500000", "Food", "2025-06-02");
    spend(&ledger, "-499999", "Fun", "2025-06-02");

    let alerts = tracker.check_alerts_on(day("2025-06-30")).unwrap();
    let cats: Vec<&str> = alerts.iter().map(|a| a.category.as_str()).collect();
    assert_eq!(cats, vec!["Food"]);
}

#[test]
fn ended_budgets_are_ignored() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    tracker
        .add_budget(
            "Food",
            dec("100"),
            Period::Monthly,
            Some(day("2025-01-01")),
            Some(day("2025-06-10")),
        )
        .unwrap();
    spend(&ledger, "-1000", "Food", "2025-06-05");

    assert_eq!(tracker.check_alerts_on(day("2025-06-10")).unwrap().len(), 1);
    assert!(tracker.check_alerts_on(day("2025-06-11")).unwrap().is_empty());
}

#[test]
fn checking_is_stateless() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    tracker
        .add_budget("Food", dec("10"), Period::Daily, Some(day("2025-01-01")), None)
        .unwrap();
    spend(&ledger, "-20", "Food", "2025-02-01");

    let first = tracker.check_alerts_on(day("2025-02-01")).unwrap();
    let second = tracker.check_alerts_on(day("2025-02-01")).unwrap();
    assert_eq!(first, second);
    assert!(tracker.unread_alerts().unwrap().is_empty());
}

#[test]
fn invalid_budgets_are_rejected() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    assert!(
        tracker
            .add_budget("Food", Decimal::ZERO, Period::Monthly, None, None)
            .unwrap_err()
            .is_validation()
    );
    assert!(
        tracker
            .add_budget("Food", dec("-5"), Period::Monthly, None, None)
            .unwrap_err()
            .is_validation()
    );
    assert!(
        tracker
            .add_budget("  ", dec("5"), Period::Monthly, None, None)
            .unwrap_err()
            .is_validation()
    );
    assert!(tracker.budgets().unwrap().is_empty());
}

#[test]
fn budgets_list_round_trips() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    let id = tracker
        .add_budget(
            "Food",
            dec("1500000"),
            Period::Weekly,
            Some(day("2025-01-06")),
            Some(day("2025-12-28")),
        )
        .unwrap();
    let all = tracker.budgets().unwrap();
    assert_eq!(all.len(), 1);
    let b = &all[0];
    assert_eq!(b.id, id);
    assert_eq!(b.category, "Food");
    assert_eq!(b.amount, dec("1500000"));
    assert_eq!(b.period, Period::Weekly);
    assert_eq!(b.start_date, day("2025-01-06"));
    assert_eq!(b.end_date, Some(day("2025-12-28")));
}

#[test]
fn alerts_are_read_newest_first_and_marked() {
    let conn = setup();
    let ledger = Ledger::new(&conn, &Config::default()).unwrap();
    let tracker = BudgetTracker::new(&conn, &ledger);
    let first = tracker.record_alert(BUDGET_ALERT, "first").unwrap();
    let second = tracker.record_alert(BUDGET_ALERT, "second").unwrap();

    let unread = tracker.unread_alerts().unwrap();
    let ids: Vec<i64> = unread.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert!(unread.iter().all(|a| !a.read && a.r#type == "budget"));

    assert!(tracker.mark_read(first).unwrap());
    assert!(!tracker.mark_read(first + 100).unwrap());
    let unread = tracker.unread_alerts().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].message, "second");
}
