use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::models::{Budget, BudgetStatus};
use crate::domain::repository::BudgetRepository;
use crate::infra::repository::{is_unique_violation, sum_to_decimal};
use crate::service::error::AppError;

#[derive(Clone)]
pub struct SqliteBudgetRepository {
    pool: Pool<Sqlite>,
}

impl SqliteBudgetRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        SqliteBudgetRepository { pool }
    }
}

#[async_trait]
impl BudgetRepository for SqliteBudgetRepository {
    async fn insert(
        &self,
        user_id: i64,
        category_id: i64,
        amount: Decimal,
        month: String,
    ) -> Result<Budget> {
        let row = sqlx::query(
            "INSERT INTO budgets (user_id, category_id, amount, month) VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(user_id)
        .bind(category_id)
        .bind(amount.to_string())
        .bind(&month)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                anyhow::Error::new(AppError::DuplicateBudget)
            } else {
                err.into()
            }
        })?;

        Ok(Budget {
            id: row.try_get("id")?,
            user_id,
            category_id,
            amount,
            month,
        })
    }

    async fn list_with_spend(&self, user_id: i64, month: &str) -> Result<Vec<BudgetStatus>> {
        // LEFT JOIN so a budget with no transactions still reports spent = 0.
        let rows = sqlx::query(
            "SELECT b.id, b.category_id, b.month,
                    b.amount AS budget_amount,
                    c.name AS category_name, c.color AS category_color,
                    CAST(COALESCE(SUM(t.amount), 0) AS TEXT) AS spent
             FROM budgets b
             JOIN categories c ON b.category_id = c.id
             LEFT JOIN transactions t ON t.category_id = c.id
                 AND t.user_id = b.user_id
                 AND strftime('%Y-%m', t.date) = b.month
             WHERE b.user_id = ? AND b.month = ?
             GROUP BY b.id",
        )
        .bind(user_id)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let budget_amount: String = row.try_get("budget_amount")?;
                let spent: String = row.try_get("spent")?;

                Ok(BudgetStatus {
                    id: row.try_get("id")?,
                    category_id: row.try_get("category_id")?,
                    category_name: row.try_get("category_name")?,
                    category_color: row.try_get("category_color")?,
                    month: row.try_get("month")?,
                    budget_amount: Decimal::from_str(&budget_amount)?,
                    spent: sum_to_decimal(&spent)?,
                })
            })
            .collect()
    }
}
