// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finitor::amount::{AmountFormatter, parse_amount, parse_amount_typed};
use finitor::error::FinitorError;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn shorthand_suffixes_scale() {
    assert_eq!(parse_amount("30k", "VND").unwrap(), (dec("30000"), "VND".into()));
    assert_eq!(parse_amount("1.5m", "VND").unwrap(), (dec("1500000"), "VND".into()));
    assert_eq!(parse_amount("2B", "VND").unwrap(), (dec("2000000000"), "VND".into()));
    assert_eq!(parse_amount(" 250 ", "VND").unwrap(), (dec("250"), "VND".into()));
}

#[test]
fn symbols_and_codes_pick_the_currency() {
    assert_eq!(parse_amount("$100", "VND").unwrap(), (dec("100"), "USD".into()));
    assert_eq!(parse_amount("€12.50", "VND").unwrap(), (dec("12.50"), "EUR".into()));
    assert_eq!(parse_amount("100USD", "VND").unwrap(), (dec("100"), "USD".into()));
    assert_eq!(parse_amount("20k JPY", "VND").unwrap(), (dec("20000"), "JPY".into()));
    // the trailing code wins over a leading symbol
    assert_eq!(parse_amount("$5 EUR", "VND").unwrap(), (dec("5"), "EUR".into()));
}

#[test]
fn sign_is_kept_as_typed() {
    assert_eq!(parse_amount("-30k", "VND").unwrap(), (dec("-30000"), "VND".into()));
    assert_eq!(parse_amount("$-5", "VND").unwrap(), (dec("-5"), "USD".into()));
}

#[test]
fn sign_may_come_before_the_symbol() {
    assert_eq!(parse_amount("-$5", "VND").unwrap(), (dec("-5"), "USD".into()));
    assert_eq!(parse_amount("+€3", "VND").unwrap(), (dec("3"), "EUR".into()));
    assert_eq!(parse_amount("- $1.5k", "VND").unwrap(), (dec("-1500"), "USD".into()));
    assert!(matches!(
        parse_amount("-$-5", "VND").unwrap_err(),
        FinitorError::InvalidAmount(_)
    ));
}

#[test]
fn typed_currency_is_reported_only_when_present() {
    assert_eq!(parse_amount_typed("30k").unwrap(), (dec("30000"), None));
    assert_eq!(
        parse_amount_typed("-$5").unwrap(),
        (dec("-5"), Some("USD".to_string()))
    );
    assert_eq!(
        parse_amount_typed("100VND").unwrap(),
        (dec("100"), Some("VND".to_string()))
    );
}

#[test]
fn garbage_is_rejected() {
    for bad in ["abc", "", "1.2.3", "k", "12x", "$"] {
        let err = parse_amount(bad, "VND").unwrap_err();
        assert!(
            matches!(err, FinitorError::InvalidAmount(_)),
            "{:?} should be an invalid amount, got {:?}",
            bad,
            err
        );
    }
}

#[test]
fn reference_currency_abbreviates_unless_full() {
    let fmt = AmountFormatter::new("VND");
    assert_eq!(fmt.format(dec("1500000"), "VND", false), "1.5m VND");
    assert_eq!(fmt.format(dec("1500000"), "VND", true), "1,500,000 VND");
    assert_eq!(fmt.format(dec("30000"), "VND", false), "30.0k VND");
    assert_eq!(fmt.format(dec("2500000000"), "VND", false), "2.5b VND");
    assert_eq!(fmt.format(dec("950"), "VND", false), "950 VND");
    assert_eq!(fmt.format(dec("-1200000"), "VND", false), "-1.2m VND");
}

#[test]
fn major_and_other_currencies() {
    let fmt = AmountFormatter::new("VND");
    assert_eq!(fmt.format(dec("100"), "USD", false), "$100.00");
    assert_eq!(fmt.format(dec("1234.5"), "EUR", true), "€1,234.50");
    assert_eq!(fmt.format(dec("-20.833"), "USD", false), "-$20.83");
    assert_eq!(fmt.format(dec("1234.5"), "JPY", false), "1,234.50 JPY");
}
