// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::currency::{ConversionWarning, CurrencyTable};
use crate::db::{decimal_at, period_at, tags_at};
use crate::error::{FinitorError, Result};
use crate::models::{
    ExportRecord, MonthlySummary, NewTransaction, Transaction, TransactionUpdate,
};
use chrono::{Local, Months, NaiveDate};
use rusqlite::{Connection, Params, Row, params};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNSPECIFIED: &str = "Unspecified";

const SELECT_TRANSACTIONS: &str = "SELECT id, amount, description, category, source, date, currency, \
     created_at, tags, notes, recurrence, next_date FROM transactions";

/// Most recent first; ties fall back to insertion order.
const NEWEST_FIRST: &str = " ORDER BY date DESC, id DESC";

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        amount: decimal_at(r, 1)?,
        description: r.get(2)?,
        category: r.get(3)?,
        source: r.get(4)?,
        date: r.get(5)?,
        currency: r.get(6)?,
        created_at: r.get(7)?,
        tags: tags_at(r, 8)?,
        notes: r.get(9)?,
        recurrence: period_at(r, 10)?,
        next_date: r.get(11)?,
    })
}

fn label(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

fn group_sum<F>(txns: Vec<Transaction>, key: F) -> BTreeMap<String, Decimal>
where
    F: Fn(&Transaction) -> String,
{
    let mut out = BTreeMap::new();
    for t in &txns {
        *out.entry(key(t)).or_insert(Decimal::ZERO) += t.amount;
    }
    out
}

/// Balance in one display currency, with any conversions that fell back to
/// the unconverted amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub total: Decimal,
    pub currency: String,
    pub warnings: Vec<ConversionWarning>,
}

pub struct Ledger<'a> {
    conn: &'a Connection,
    currencies: CurrencyTable<'a>,
    list_limit: usize,
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a Connection, config: &Config) -> Result<Self> {
        Ok(Self {
            conn,
            currencies: CurrencyTable::open(conn, &config.default_currency)?,
            list_limit: config.list_limit,
        })
    }

    pub fn currencies(&self) -> &CurrencyTable<'a> {
        &self.currencies
    }

    pub fn default_currency(&self) -> &str {
        self.currencies.default_currency()
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit
    }

    // Rows exactly as stored.
    fn query_stored<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Transaction>> {
        let sql = format!("{}{}", SELECT_TRANSACTIONS, clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, transaction_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // Rows as seen by readers: a currency the table does not know reads as
    // the default currency.
    fn query<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Transaction>> {
        let mut txns = self.query_stored(clause, params)?;
        let known: HashSet<String> = self
            .currencies
            .list()?
            .into_iter()
            .map(|c| c.code)
            .collect();
        for t in &mut txns {
            if !known.contains(&t.currency) {
                tracing::debug!(
                    "Transaction {} has unknown currency '{}', reading as {}",
                    t.id,
                    t.currency,
                    self.default_currency()
                );
                t.currency = self.default_currency().to_string();
            }
        }
        Ok(txns)
    }

    pub fn add(&self, new: NewTransaction) -> Result<i64> {
        if new.description.trim().is_empty() {
            return Err(FinitorError::validation("description must not be empty"));
        }
        let date = new.date.unwrap_or_else(today);
        let currency = label(new.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| self.default_currency().to_string());
        if !self.currencies.contains(&currency)? {
            tracing::warn!(
                "Currency {} has no exchange rate yet; it will read as {}",
                currency,
                self.default_currency()
            );
        }
        let next_date = match new.recurrence {
            Some(p) => Some(p.advance(date).ok_or_else(|| {
                FinitorError::validation(format!("cannot schedule {} after {}", p, date))
            })?),
            None => None,
        };
        self.conn.execute(
            "INSERT INTO transactions(amount, description, category, source, date, currency,
                created_at, recurrence, next_date, tags, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                new.amount.to_string(),
                new.description,
                label(new.category),
                label(new.source),
                date,
                currency,
                Local::now().naive_local(),
                new.recurrence.map(|p| p.as_str()),
                next_date,
                serde_json::to_string(&new.tags)?,
                label(new.notes),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.query(" WHERE id=?1", params![id])?.into_iter().next())
    }

    pub fn list(&self) -> Result<Vec<Transaction>> {
        self.query(NEWEST_FIRST, params![])
    }

    /// Newest transactions, capped at `limit` or the configured list limit.
    pub fn recent(&self, limit: Option<usize>) -> Result<Vec<Transaction>> {
        let limit = limit.unwrap_or(self.list_limit) as i64;
        self.query(&format!("{} LIMIT ?1", NEWEST_FIRST), params![limit])
    }

    /// Inclusive on both ends.
    pub fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
        self.query(
            &format!(" WHERE date BETWEEN ?1 AND ?2{}", NEWEST_FIRST),
            params![start, end],
        )
    }

    fn list_between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        match (start, end) {
            (Some(s), Some(e)) => self.list_by_date_range(s, e),
            (Some(s), None) => {
                self.query(&format!(" WHERE date >= ?1{}", NEWEST_FIRST), params![s])
            }
            (None, Some(e)) => {
                self.query(&format!(" WHERE date <= ?1{}", NEWEST_FIRST), params![e])
            }
            (None, None) => self.list(),
        }
    }

    /// Case-insensitive substring match on description, category and source.
    pub fn search(&self, query: &str) -> Result<Vec<Transaction>> {
        let needle = query.trim().to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| {
                hit(&t.description)
                    || t.category.as_deref().is_some_and(|c| hit(c))
                    || t.source.as_deref().is_some_and(|s| hit(s))
            })
            .collect())
    }

    /// Partial update. Returns false when `id` does not exist.
    pub fn update(&self, id: i64, changes: TransactionUpdate) -> Result<bool> {
        if let Some(d) = &changes.description {
            if d.trim().is_empty() {
                return Err(FinitorError::validation("description must not be empty"));
            }
        }
        let Some(mut t) = self
            .query_stored(" WHERE id=?1", params![id])?
            .into_iter()
            .next()
        else {
            return Ok(false);
        };

        if let Some(amount) = changes.amount {
            t.amount = amount;
        }
        if let Some(description) = changes.description {
            t.description = description;
        }
        if let Some(category) = changes.category {
            t.category = label(Some(category));
        }
        if let Some(source) = changes.source {
            t.source = label(Some(source));
        }
        let rescheduled = changes.date.is_some_and(|d| d != t.date)
            || changes.recurrence.is_some_and(|r| r != t.recurrence);
        if let Some(date) = changes.date {
            t.date = date;
        }
        if let Some(currency) = label(changes.currency) {
            t.currency = currency.to_uppercase();
        }
        if let Some(tags) = changes.tags {
            t.tags = tags;
        }
        if let Some(notes) = changes.notes {
            t.notes = label(Some(notes));
        }
        if let Some(recurrence) = changes.recurrence {
            t.recurrence = recurrence;
        }
        match t.recurrence {
            None => t.next_date = None,
            // occurrences before the stored next_date were already posted
            Some(p) if rescheduled => {
                let floor = t.next_date.unwrap_or(t.date);
                t.next_date = p.first_on_or_after(t.date, floor);
            }
            Some(_) => {}
        }

        let n = self.conn.execute(
            "UPDATE transactions SET amount=?1, description=?2, category=?3, source=?4, date=?5,
                currency=?6, tags=?7, notes=?8, recurrence=?9, next_date=?10
             WHERE id=?11",
            params![
                t.amount.to_string(),
                t.description,
                t.category,
                t.source,
                t.date,
                t.currency,
                serde_json::to_string(&t.tags)?,
                t.notes,
                t.recurrence.map(|p| p.as_str()),
                t.next_date,
                id
            ],
        )?;
        Ok(n > 0)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        Ok(n > 0)
    }

    pub fn count(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Sum of all transactions, each converted from its own currency into
    /// `display_currency` (default currency when `None`).
    pub fn balance(&self, display_currency: Option<&str>) -> Result<Decimal> {
        Ok(self.balance_report(display_currency)?.total)
    }

    pub fn balance_report(&self, display_currency: Option<&str>) -> Result<Balance> {
        let target = display_currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_currency().to_string());
        let mut total = Decimal::ZERO;
        let mut warnings: Vec<ConversionWarning> = Vec::new();
        for t in self.list()? {
            let (value, warning) =
                self.currencies
                    .convert_reporting(t.amount, &t.currency, &target)?;
            total += value;
            if let Some(w) = warning {
                if !warnings.contains(&w) {
                    tracing::warn!("{}", w);
                    warnings.push(w);
                }
            }
        }
        Ok(Balance {
            total,
            currency: target,
            warnings,
        })
    }

    /// Per-category sums in each transaction's own currency (not converted).
    pub fn category_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BTreeMap<String, Decimal>> {
        Ok(group_sum(self.list_between(start, end)?, |t| {
            t.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string())
        }))
    }

    /// Per-source sums in each transaction's own currency (not converted).
    pub fn source_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BTreeMap<String, Decimal>> {
        Ok(group_sum(self.list_between(start, end)?, |t| {
            t.source.clone().unwrap_or_else(|| UNSPECIFIED.to_string())
        }))
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> Result<MonthlySummary> {
        let (start, end) = month_bounds(year, month).ok_or_else(|| {
            FinitorError::validation(format!("invalid month {}-{:02}", year, month))
        })?;
        let mut summary = MonthlySummary::default();
        for t in self.list_by_date_range(start, end)? {
            summary.total += t.amount;
            if t.amount > Decimal::ZERO {
                summary.income += t.amount;
            } else {
                summary.expenses += -t.amount;
            }
        }
        Ok(summary)
    }

    pub fn export(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ExportRecord>> {
        Ok(self
            .list_between(start, end)?
            .into_iter()
            .map(ExportRecord::from)
            .collect())
    }

    /// Recurring templates with an occurrence due on or before `as_of`.
    pub fn due_recurring(&self, as_of: NaiveDate) -> Result<Vec<Transaction>> {
        self.query_stored(
            " WHERE recurrence IS NOT NULL AND next_date IS NOT NULL AND next_date <= ?1
              ORDER BY next_date, id",
            params![as_of],
        )
    }

    /// Post every occurrence due up to `as_of` as an ordinary transaction and
    /// move each template's `next_date` past `as_of`. Occurrences are counted
    /// from the template's own date. Returns the new ids.
    pub fn post_recurring(&self, as_of: NaiveDate) -> Result<Vec<i64>> {
        let due = self.due_recurring(as_of)?;
        if due.is_empty() {
            return Ok(Vec::new());
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut posted = Vec::new();
        for template in due {
            let (Some(period), Some(floor)) = (template.recurrence, template.next_date) else {
                continue;
            };
            let schedule = (1..=u32::MAX)
                .map_while(|n| period.occurrence(template.date, n))
                .skip_while(|d| *d < floor);
            let mut next = None;
            for date in schedule {
                if date > as_of {
                    next = Some(date);
                    break;
                }
                let id = self.add(NewTransaction {
                    amount: template.amount,
                    description: template.description.clone(),
                    category: template.category.clone(),
                    source: template.source.clone(),
                    date: Some(date),
                    currency: Some(template.currency.clone()),
                    tags: template.tags.clone(),
                    notes: template.notes.clone(),
                    recurrence: None,
                })?;
                posted.push(id);
            }
            self.conn.execute(
                "UPDATE transactions SET next_date=?1 WHERE id=?2",
                params![next, template.id],
            )?;
            tracing::debug!(
                "Template {} posted through {}, next due {:?}",
                template.id,
                as_of,
                next
            );
        }
        tx.commit()?;
        Ok(posted)
    }
}
