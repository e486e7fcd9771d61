use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::{DashboardSummary, MonthlyTotals};
use crate::domain::repository::TransactionRepository;

pub const RECENT_LIMIT: i64 = 10;
pub const TREND_MONTHS: i64 = 6;

pub struct ReportService {
    transaction_repo: Arc<dyn TransactionRepository>,
}

impl ReportService {
    pub fn new(transaction_repo: Arc<dyn TransactionRepository>) -> Self {
        ReportService { transaction_repo }
    }

    /// Totals and breakdown are restricted to `month`; the recent list spans
    /// all time.
    pub async fn dashboard_summary(&self, user_id: i64, month: &str) -> Result<DashboardSummary> {
        let (income, expenses) = self.transaction_repo.month_totals(user_id, month).await?;
        let recent_transactions = self
            .transaction_repo
            .recent_for_user(user_id, RECENT_LIMIT)
            .await?;
        let category_breakdown = self
            .transaction_repo
            .expense_breakdown(user_id, month)
            .await?;

        Ok(DashboardSummary {
            income,
            expenses,
            balance: income - expenses,
            recent_transactions,
            category_breakdown,
        })
    }

    pub async fn monthly_trend(&self, user_id: i64, months: i64) -> Result<Vec<MonthlyTotals>> {
        self.transaction_repo.monthly_totals(user_id, months).await
    }
}
