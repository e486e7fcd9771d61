use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::models::{
    CategorySpend, MonthlyTotals, Transaction, TransactionFilter, TransactionWithCategory,
};
use crate::domain::repository::TransactionRepository;
use crate::infra::repository::sum_to_decimal;

const SELECT_WITH_CATEGORY: &str = "SELECT t.id, t.user_id, t.category_id, t.amount, \
     t.description, t.date, t.created_at, \
     c.name AS category_name, c.type AS category_type, c.color AS category_color \
     FROM transactions t JOIN categories c ON t.category_id = c.id \
     WHERE t.user_id = ?";

// Within one created_at second the rowid is the entry order, so id breaks
// ties toward the most recently entered row.
const ORDER_RECENT_FIRST: &str = " ORDER BY t.date DESC, t.created_at DESC, t.id DESC";

#[derive(Clone)]
pub struct SqliteTransactionRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTransactionRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        SqliteTransactionRepository { pool }
    }
}

fn with_category_from_row(row: &SqliteRow) -> Result<TransactionWithCategory> {
    let amount: String = row.try_get("amount")?;

    Ok(TransactionWithCategory {
        transaction: Transaction {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            category_id: row.try_get("category_id")?,
            amount: Decimal::from_str(&amount)?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            created_at: row.try_get("created_at")?,
        },
        category_name: row.try_get("category_name")?,
        category_kind: row.try_get("category_type")?,
        category_color: row.try_get("category_color")?,
    })
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let text: String = row.try_get(column)?;
    sum_to_decimal(&text)
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn insert(
        &self,
        user_id: i64,
        category_id: i64,
        amount: Decimal,
        description: Option<String>,
        date: NaiveDate,
    ) -> Result<Transaction> {
        let row = sqlx::query(
            "INSERT INTO transactions (user_id, category_id, amount, description, date)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, created_at",
        )
        .bind(user_id)
        .bind(category_id)
        .bind(amount.to_string())
        .bind(&description)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        let created_at: NaiveDateTime = row.try_get("created_at")?;

        Ok(Transaction {
            id,
            user_id,
            category_id,
            amount,
            description,
            date,
            created_at,
        })
    }

    async fn delete_for_user(&self, user_id: i64, transaction_id: i64) -> Result<()> {
        // Zero rows affected means nothing to delete for this user; that is
        // not an error.
        sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(transaction_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionWithCategory>> {
        let mut sql = String::from(SELECT_WITH_CATEGORY);
        if filter.category_id.is_some() {
            sql.push_str(" AND t.category_id = ?");
        }
        if filter.kind.is_some() {
            sql.push_str(" AND c.type = ?");
        }
        if filter.month.is_some() {
            sql.push_str(" AND strftime('%Y-%m', t.date) = ?");
        }
        sql.push_str(ORDER_RECENT_FIRST);

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(category_id) = filter.category_id {
            query = query.bind(category_id);
        }
        if let Some(kind) = filter.kind {
            query = query.bind(kind);
        }
        if let Some(month) = filter.month {
            query = query.bind(month);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(with_category_from_row).collect()
    }

    async fn recent_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransactionWithCategory>> {
        let sql = format!("{SELECT_WITH_CATEGORY}{ORDER_RECENT_FIRST} LIMIT ?");
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(with_category_from_row).collect()
    }

    async fn month_totals(&self, user_id: i64, month: &str) -> Result<(Decimal, Decimal)> {
        let row = sqlx::query(
            "SELECT
                CAST(COALESCE(SUM(CASE WHEN c.type = 'income' THEN t.amount END), 0) AS TEXT)
                    AS income,
                CAST(COALESCE(SUM(CASE WHEN c.type = 'expense' THEN t.amount END), 0) AS TEXT)
                    AS expenses
             FROM transactions t
             JOIN categories c ON t.category_id = c.id
             WHERE t.user_id = ? AND strftime('%Y-%m', t.date) = ?",
        )
        .bind(user_id)
        .bind(month)
        .fetch_one(&self.pool)
        .await?;

        Ok((
            decimal_column(&row, "income")?,
            decimal_column(&row, "expenses")?,
        ))
    }

    async fn expense_breakdown(&self, user_id: i64, month: &str) -> Result<Vec<CategorySpend>> {
        let rows = sqlx::query(
            "SELECT c.name, c.color, CAST(SUM(t.amount) AS TEXT) AS total
             FROM transactions t
             JOIN categories c ON t.category_id = c.id
             WHERE t.user_id = ? AND c.type = 'expense' AND strftime('%Y-%m', t.date) = ?
             GROUP BY c.id
             ORDER BY SUM(t.amount) DESC",
        )
        .bind(user_id)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CategorySpend {
                    name: row.try_get("name")?,
                    color: row.try_get("color")?,
                    total: decimal_column(row, "total")?,
                })
            })
            .collect()
    }

    async fn monthly_totals(&self, user_id: i64, limit: i64) -> Result<Vec<MonthlyTotals>> {
        let rows = sqlx::query(
            "SELECT strftime('%Y-%m', t.date) AS month,
                CAST(COALESCE(SUM(CASE WHEN c.type = 'income' THEN t.amount END), 0) AS TEXT)
                    AS income,
                CAST(COALESCE(SUM(CASE WHEN c.type = 'expense' THEN t.amount END), 0) AS TEXT)
                    AS expenses
             FROM transactions t
             JOIN categories c ON t.category_id = c.id
             WHERE t.user_id = ?
             GROUP BY month
             ORDER BY month DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut months: Vec<MonthlyTotals> = rows
            .iter()
            .map(|row| {
                Ok(MonthlyTotals {
                    month: row.try_get("month")?,
                    income: decimal_column(row, "income")?,
                    expenses: decimal_column(row, "expenses")?,
                })
            })
            .collect::<Result<_>>()?;

        // Charted oldest first.
        months.reverse();
        Ok(months)
    }
}
