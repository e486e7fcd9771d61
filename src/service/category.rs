use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::{Category, CategoryType};
use crate::domain::repository::CategoryRepository;
use crate::service::error::AppError;

pub const DEFAULT_COLOR: &str = "#3B82F6";

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepository>) -> Self {
        CategoryService { category_repo }
    }

    pub async fn add(
        &self,
        user_id: i64,
        name: String,
        kind: &str,
        color: Option<String>,
    ) -> Result<Category> {
        let kind: CategoryType = kind.parse().map_err(|_| AppError::InvalidType)?;
        let color = color.unwrap_or_else(|| DEFAULT_COLOR.to_string());

        self.category_repo.insert(user_id, name, kind, color).await
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Category>> {
        self.category_repo.list_for_user(user_id).await
    }
}
