// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Free-form amount parsing (`30k`, `1.5m`, `$100`, `100USD`) and
//! currency-aware display.

use crate::error::{FinitorError, Result};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

// Trailing ISO-style code right after the numeric part (digit, dot or shorthand letter).
static CODE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<num>.*[0-9.kKmMbB])\s*(?P<code>[A-Z]{3,4})$").expect("static regex")
});

fn symbol_currency(c: char) -> Option<&'static str> {
    match c {
        '$' => Some("USD"),
        '€' => Some("EUR"),
        '£' => Some("GBP"),
        '¥' => Some("JPY"),
        _ => None,
    }
}

fn major_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Parse user text into an amount and a currency code.
///
/// A leading symbol sets the currency, a trailing code overrides it, and a
/// trailing `k`/`m`/`b` scales the number. The sign is left as typed and may
/// come before the symbol (`-$5`); turning an entry into an expense is the
/// caller's business.
pub fn parse_amount(text: &str, default_currency: &str) -> Result<(Decimal, String)> {
    let (amount, typed) = parse_amount_typed(text)?;
    let currency = typed.unwrap_or_else(|| default_currency.trim().to_uppercase());
    Ok((amount, currency))
}

/// Like `parse_amount`, but reports the currency only when the text names
/// one through a symbol or a code.
pub fn parse_amount_typed(text: &str) -> Result<(Decimal, Option<String>)> {
    let trimmed = text.trim();
    let invalid = || FinitorError::InvalidAmount(trimmed.to_string());

    let mut rest = trimmed;
    let mut currency = None;

    // a sign written ahead of a symbol: -$5, +€3
    let mut sign = None;
    if let Some(after) = rest.strip_prefix(['-', '+']) {
        let after = after.trim_start();
        if after.chars().next().and_then(symbol_currency).is_some() {
            sign = rest.chars().next();
            rest = after;
        }
    }

    if let Some(first) = rest.chars().next() {
        if let Some(code) = symbol_currency(first) {
            currency = Some(code.to_string());
            rest = rest[first.len_utf8()..].trim_start();
        }
    }

    if let Some(caps) = CODE_SUFFIX.captures(rest) {
        currency = Some(caps["code"].to_string());
        rest = caps.name("num").map_or("", |m| m.as_str()).trim_end();
    }

    let (digits, multiplier) = match rest.char_indices().last() {
        Some((i, 'k' | 'K')) => (&rest[..i], 1_000_i64),
        Some((i, 'm' | 'M')) => (&rest[..i], 1_000_000),
        Some((i, 'b' | 'B')) => (&rest[..i], 1_000_000_000),
        _ => (rest, 1),
    };
    let digits = digits.trim_end();

    if digits.is_empty()
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return Err(invalid());
    }
    // one sign only: -$-5 is not an amount
    if sign.is_some() && digits.starts_with(['-', '+']) {
        return Err(invalid());
    }
    let value = digits.parse::<Decimal>().map_err(|_| invalid())?;
    let amount = value
        .checked_mul(Decimal::from(multiplier))
        .ok_or_else(invalid)?;
    Ok((if sign == Some('-') { -amount } else { amount }, currency))
}

/// Renders amounts for display. The reference currency (the configured
/// default) gets `k`/`m`/`b` abbreviations unless `full` is requested.
#[derive(Debug, Clone)]
pub struct AmountFormatter {
    reference: String,
}

impl AmountFormatter {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into().trim().to_uppercase(),
        }
    }

    pub fn format(&self, amount: Decimal, currency: &str, full: bool) -> String {
        let code = currency.trim().to_uppercase();
        if code == self.reference {
            if !full {
                if let Some(short) = abbreviate(amount) {
                    return format!("{} {}", short, code);
                }
            }
            return format!("{} {}", group(amount, 0), code);
        }
        if let Some(symbol) = major_symbol(&code) {
            let body = group(amount, 2);
            return match body.strip_prefix('-') {
                Some(unsigned) => format!("-{}{}", symbol, unsigned),
                None => format!("{}{}", symbol, body),
            };
        }
        format!("{} {}", group(amount, 2), code)
    }
}

fn abbreviate(amount: Decimal) -> Option<String> {
    let magnitude = amount.abs();
    [
        (Decimal::from(1_000_000_000_i64), "b"),
        (Decimal::from(1_000_000_i64), "m"),
        (Decimal::from(1_000_i64), "k"),
    ]
    .into_iter()
    .find(|(threshold, _)| magnitude >= *threshold)
    .map(|(threshold, suffix)| {
        let scaled =
            (amount / threshold).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.1}{}", scaled, suffix)
    })
}

/// en-locale grouping with a fixed number of decimals: `-1,234.50`.
fn group(amount: Decimal, dp: u32) -> String {
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();
    let int_part = magnitude
        .trunc()
        .to_u128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::en);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    if dp == 0 {
        return format!("{}{}", sign, int_part);
    }
    let frac = (magnitude.fract() * Decimal::from(10_u64.pow(dp)))
        .trunc()
        .to_u64()
        .unwrap_or_default();
    format!(
        "{}{}.{:0width$}",
        sign,
        int_part,
        frac,
        width = dp as usize
    )
}
