// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{decimal_at, period_at};
use crate::error::{FinitorError, Result};
use crate::ledger::{Ledger, month_bounds, today};
use crate::models::{Alert, Budget, BudgetAlert, Period};
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

pub const BUDGET_ALERT: &str = "budget";

fn budget_from_row(r: &Row<'_>) -> rusqlite::Result<Budget> {
    let period = period_at(r, 3)?
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(3, "period".into(), Type::Null))?;
    Ok(Budget {
        id: r.get(0)?,
        category: r.get(1)?,
        amount: decimal_at(r, 2)?,
        period,
        start_date: r.get(4)?,
        end_date: r.get(5)?,
        created_at: r.get(6)?,
    })
}

/// Budget thresholds and the alerts they raise. Spending comes from the
/// ledger's category totals, never from the transactions table directly.
pub struct BudgetTracker<'a> {
    conn: &'a Connection,
    ledger: &'a Ledger<'a>,
}

impl<'a> BudgetTracker<'a> {
    pub fn new(conn: &'a Connection, ledger: &'a Ledger<'a>) -> Self {
        Self { conn, ledger }
    }

    pub fn add_budget(
        &self,
        category: &str,
        amount: Decimal,
        period: Period,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<i64> {
        let category = category.trim();
        if category.is_empty() {
            return Err(FinitorError::validation("budget category must not be empty"));
        }
        if amount <= Decimal::ZERO {
            return Err(FinitorError::validation(format!(
                "budget amount must be positive, got {}",
                amount
            )));
        }
        let start = start_date.unwrap_or_else(today);
        if let Some(end) = end_date {
            if end < start {
                return Err(FinitorError::validation(format!(
                    "budget ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }
        self.conn.execute(
            "INSERT INTO budgets(category, amount, period, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                category,
                amount.to_string(),
                period.as_str(),
                start,
                end_date,
                Local::now().naive_local()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, amount, period, start_date, end_date, created_at
             FROM budgets ORDER BY category, id",
        )?;
        let rows = stmt.query_map([], budget_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn check_alerts(&self) -> Result<Vec<BudgetAlert>> {
        self.check_alerts_on(today())
    }

    /// Compare each budget active on `day` with its category's total for the
    /// calendar month containing `day`. The budget's period is not consulted.
    pub fn check_alerts_on(&self, day: NaiveDate) -> Result<Vec<BudgetAlert>> {
        let (start, end) = month_bounds(day.year(), day.month()).ok_or_else(|| {
            FinitorError::validation(format!("no calendar month for {}", day))
        })?;
        let totals = self.ledger.category_summary(Some(start), Some(end))?;

        let mut alerts = Vec::new();
        for budget in self.budgets()? {
            if !budget.is_active_on(day) {
                continue;
            }
            let Some(total) = totals.get(&budget.category) else {
                continue;
            };
            if total.abs() >= budget.amount {
                alerts.push(BudgetAlert {
                    category: budget.category.clone(),
                    threshold: budget.amount,
                    spent: *total,
                    message: format!(
                        "Budget limit of {} reached for {} ({})",
                        budget.amount, budget.category, total
                    ),
                });
            }
        }
        Ok(alerts)
    }

    pub fn record_alert(&self, r#type: &str, message: &str) -> Result<i64> {
        if message.trim().is_empty() {
            return Err(FinitorError::validation("alert message must not be empty"));
        }
        self.conn.execute(
            "INSERT INTO alerts(type, message, created_at) VALUES (?1, ?2, ?3)",
            params![r#type, message, Local::now().naive_local()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Newest first.
    pub fn unread_alerts(&self) -> Result<Vec<Alert>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, message, created_at, read FROM alerts
             WHERE read = 0 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(Alert {
                id: r.get(0)?,
                r#type: r.get(1)?,
                message: r.get(2)?,
                created_at: r.get(3)?,
                read: r.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn mark_read(&self, alert_id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("UPDATE alerts SET read = 1 WHERE id=?1", params![alert_id])?;
        Ok(n > 0)
    }
}
