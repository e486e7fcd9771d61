use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::models::{Category, CategoryType};
use crate::domain::repository::CategoryRepository;
use crate::infra::repository::is_unique_violation;
use crate::service::error::AppError;

#[derive(Clone)]
pub struct SqliteCategoryRepository {
    pool: Pool<Sqlite>,
}

impl SqliteCategoryRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        SqliteCategoryRepository { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn insert(
        &self,
        user_id: i64,
        name: String,
        kind: CategoryType,
        color: String,
    ) -> Result<Category> {
        let row = sqlx::query(
            "INSERT INTO categories (user_id, name, type, color) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(&name)
        .bind(kind)
        .bind(&color)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                anyhow::Error::new(AppError::DuplicateCategory)
            } else {
                err.into()
            }
        })?;

        Ok(Category {
            id: row.try_get("id")?,
            user_id,
            name,
            kind,
            color,
        })
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, user_id, name, type, color FROM categories
             WHERE user_id = ?
             ORDER BY type, name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_for_user(&self, user_id: i64, category_id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, user_id, name, type, color FROM categories
             WHERE id = ? AND user_id = ?",
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn expense_without_budget(&self, user_id: i64, month: &str) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, user_id, name, type, color FROM categories
             WHERE user_id = ? AND type = 'expense'
               AND id NOT IN (SELECT category_id FROM budgets WHERE user_id = ? AND month = ?)
             ORDER BY name",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
