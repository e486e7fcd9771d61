use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::models::{CategorySeed, User};
use crate::domain::repository::UserRepository;
use crate::infra::repository::is_unique_violation;
use crate::service::error::AppError;

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        SqliteUserRepository { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        username: String,
        password_hash: String,
        email: Option<String>,
        seed: Vec<CategorySeed>,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO users (username, password_hash, email) VALUES (?, ?, ?)
             RETURNING id, created_at",
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(&email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                anyhow::Error::new(AppError::DuplicateUsername)
            } else {
                err.into()
            }
        })?;

        let id: i64 = row.try_get("id")?;
        let created_at: NaiveDateTime = row.try_get("created_at")?;

        for category in &seed {
            sqlx::query("INSERT INTO categories (user_id, name, type, color) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(category.name)
                .bind(category.kind)
                .bind(category.color)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(User {
            id,
            username,
            password_hash,
            email,
            created_at,
        })
    }

    async fn find(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, email, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, email, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
