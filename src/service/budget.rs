use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::models::{Budget, BudgetStatus, Category};
use crate::domain::repository::{BudgetRepository, CategoryRepository};
use crate::service::error::AppError;

pub struct BudgetService {
    budget_repo: Arc<dyn BudgetRepository>,
    category_repo: Arc<dyn CategoryRepository>,
}

impl BudgetService {
    pub fn new(
        budget_repo: Arc<dyn BudgetRepository>,
        category_repo: Arc<dyn CategoryRepository>,
    ) -> Self {
        BudgetService {
            budget_repo,
            category_repo,
        }
    }

    pub async fn set(
        &self,
        user_id: i64,
        category_id: i64,
        amount: &str,
        month: &str,
    ) -> Result<Budget> {
        let amount = Decimal::from_str(amount.trim()).map_err(|_| AppError::InvalidAmount)?;
        let month = parse_month_key(month)?;

        self.category_repo
            .find_for_user(user_id, category_id)
            .await?
            .ok_or(AppError::InvalidCategory)?;

        self.budget_repo
            .insert(user_id, category_id, amount, month)
            .await
    }

    pub async fn list_with_spend(&self, user_id: i64, month: &str) -> Result<Vec<BudgetStatus>> {
        self.budget_repo.list_with_spend(user_id, month).await
    }

    pub async fn categories_without_budget(
        &self,
        user_id: i64,
        month: &str,
    ) -> Result<Vec<Category>> {
        self.category_repo.expense_without_budget(user_id, month).await
    }
}

/// Budget rows are keyed by zero-padded `YYYY-MM`; anything else would never
/// match `strftime('%Y-%m', date)` and produce a budget no spend can reach.
pub(crate) fn parse_month_key(month: &str) -> Result<String, AppError> {
    let valid = month.len() == 7
        && NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok();

    if valid {
        Ok(month.to_string())
    } else {
        Err(AppError::InvalidDate)
    }
}
