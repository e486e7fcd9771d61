use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Classifies a category as income-producing or expense-incurring. Every
/// aggregate (dashboard totals, breakdowns, trends) keys its sign logic off
/// this, never off the sign of the amounts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: CategoryType,
    pub color: String,
}

/// A default category created for every new user at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorySeed {
    pub name: &'static str,
    pub kind: CategoryType,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// A transaction joined with the category it was booked against, the shape
/// every listing returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category_name: String,
    #[serde(rename = "category_type")]
    pub category_kind: CategoryType,
    pub category_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub month: String,
}

/// A budget row with the month's actual spend against it. `spent` is zero
/// when the month has no matching transactions, never absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub category_color: String,
    pub month: String,
    pub budget_amount: Decimal,
    pub spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub name: String,
    pub color: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub recent_transactions: Vec<TransactionWithCategory>,
    pub category_breakdown: Vec<CategorySpend>,
}

/// Conjunctive filters for transaction listings. `None` means "no
/// constraint"; `month` matches the `YYYY-MM` component of the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub category_id: Option<i64>,
    pub kind: Option<CategoryType>,
    pub month: Option<String>,
}
