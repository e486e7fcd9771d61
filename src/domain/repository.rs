use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use rust_decimal::Decimal;

use crate::domain::models::*;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user row and its seed categories in one transaction;
    /// either both persist or neither does.
    async fn create_user(
        &self,
        username: String,
        password_hash: String,
        email: Option<String>,
        seed: Vec<CategorySeed>,
    ) -> Result<User>;

    async fn find(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: i64,
        name: String,
        kind: CategoryType,
        color: String,
    ) -> Result<Category>;

    /// All categories of the user, ordered by (type, name) ascending.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Category>>;

    async fn find_for_user(&self, user_id: i64, category_id: i64) -> Result<Option<Category>>;

    /// Expense categories of the user with no budget row for the month,
    /// ordered by name.
    async fn expense_without_budget(&self, user_id: i64, month: &str) -> Result<Vec<Category>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: i64,
        category_id: i64,
        amount: Decimal,
        description: Option<String>,
        date: NaiveDate,
    ) -> Result<Transaction>;

    /// Scoped by (id AND user_id); deleting a row that does not exist or
    /// belongs to someone else is a silent no-op.
    async fn delete_for_user(&self, user_id: i64, transaction_id: i64) -> Result<()>;

    /// Ordered by date desc, then insertion recency desc.
    async fn list_for_user(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionWithCategory>>;

    async fn recent_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransactionWithCategory>>;

    /// (income, expenses) sums for the month, zero when empty.
    async fn month_totals(&self, user_id: i64, month: &str) -> Result<(Decimal, Decimal)>;

    /// Per-expense-category sums for the month, largest total first.
    async fn expense_breakdown(&self, user_id: i64, month: &str) -> Result<Vec<CategorySpend>>;

    /// Income/expense sums of the most recent `limit` distinct months,
    /// returned oldest first.
    async fn monthly_totals(&self, user_id: i64, limit: i64) -> Result<Vec<MonthlyTotals>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: i64,
        category_id: i64,
        amount: Decimal,
        month: String,
    ) -> Result<Budget>;

    async fn list_with_spend(&self, user_id: i64, month: &str) -> Result<Vec<BudgetStatus>>;
}
