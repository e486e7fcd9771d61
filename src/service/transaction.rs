use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::models::{Transaction, TransactionFilter, TransactionWithCategory};
use crate::domain::repository::{CategoryRepository, TransactionRepository};
use crate::service::error::AppError;

pub struct TransactionService {
    transaction_repo: Arc<dyn TransactionRepository>,
    category_repo: Arc<dyn CategoryRepository>,
}

impl TransactionService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepository>,
        category_repo: Arc<dyn CategoryRepository>,
    ) -> Self {
        TransactionService {
            transaction_repo,
            category_repo,
        }
    }

    /// The sign of `amount` is stored as given; whether it counts as income
    /// or expense in aggregates is decided by the category type alone.
    pub async fn add(
        &self,
        user_id: i64,
        category_id: i64,
        amount: &str,
        description: Option<String>,
        date: &str,
    ) -> Result<Transaction> {
        let amount = Decimal::from_str(amount.trim()).map_err(|_| AppError::InvalidAmount)?;
        let date =
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| AppError::InvalidDate)?;

        // The foreign key alone would accept another user's category.
        self.category_repo
            .find_for_user(user_id, category_id)
            .await?
            .ok_or(AppError::InvalidCategory)?;

        self.transaction_repo
            .insert(user_id, category_id, amount, description, date)
            .await
    }

    pub async fn delete(&self, user_id: i64, transaction_id: i64) -> Result<()> {
        self.transaction_repo
            .delete_for_user(user_id, transaction_id)
            .await
    }

    pub async fn list(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionWithCategory>> {
        self.transaction_repo.list_for_user(user_id, filter).await
    }
}
