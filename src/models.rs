// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinitorError;

/// Cadence shared by budgets and recurring transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// One step forward. Month steps clamp to the last day of a shorter month
    /// (Jan 31 -> Feb 28/29).
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.occurrence(date, 1)
    }

    /// The `n`-th step after `anchor`, measured from the anchor itself so a
    /// month-end anchor clamps only in the short months (Jan 31 -> Feb 28 -> Mar 31).
    pub fn occurrence(&self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Period::Daily => anchor.checked_add_days(Days::new(u64::from(n))),
            Period::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(n))),
            Period::Monthly => anchor.checked_add_months(Months::new(n)),
            Period::Yearly => anchor.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }

    /// First occurrence after `anchor` that falls on or after `floor`.
    pub fn first_on_or_after(&self, anchor: NaiveDate, floor: NaiveDate) -> Option<NaiveDate> {
        (1..=u32::MAX)
            .map_while(|n| self.occurrence(anchor, n))
            .find(|d| *d >= floor)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = FinitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(FinitorError::validation(format!(
                "Invalid period '{}', expected daily|weekly|monthly|yearly",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal, // > 0 income, < 0 expense
    pub description: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date: NaiveDate,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub recurrence: Option<Period>,
    pub next_date: Option<NaiveDate>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// Input for `Ledger::add`; unset date and currency fall back to today and
/// the configured default.
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date: Option<NaiveDate>,
    pub currency: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub recurrence: Option<Period>,
}

impl NewTransaction {
    pub fn new(amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            amount,
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` keeps the stored value. `recurrence: Some(None)`
/// turns a recurring template back into an ordinary transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date: Option<NaiveDate>,
    pub currency: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub recurrence: Option<Option<Period>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub exchange_rate: Decimal, // units of this currency per reference unit
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub amount: Decimal,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Budget {
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| end >= day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub r#type: String,
    pub message: String,
    pub created_at: NaiveDateTime,
    pub read: bool,
}

/// Candidate produced by `BudgetTracker::check_alerts`; not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub category: String,
    pub threshold: Decimal,
    pub spent: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonthlySummary {
    pub total: Decimal,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// Flattened row handed to the export encoders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: i64,
    pub date: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub category: String,
    pub source: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub recurrence: String,
    pub next_date: String,
    pub created_at: String,
}

impl From<Transaction> for ExportRecord {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            date: t.date.to_string(),
            amount: t.amount,
            currency: t.currency,
            description: t.description,
            category: t.category.unwrap_or_default(),
            source: t.source.unwrap_or_default(),
            tags: t.tags,
            notes: t.notes.unwrap_or_default(),
            recurrence: t.recurrence.map(|p| p.to_string()).unwrap_or_default(),
            next_date: t.next_date.map(|d| d.to_string()).unwrap_or_default(),
            created_at: t.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
