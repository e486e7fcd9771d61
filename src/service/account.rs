use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::{CategorySeed, CategoryType, User};
use crate::domain::repository::UserRepository;
use crate::domain::service::PasswordHasher;
use crate::service::error::AppError;

/// Categories every new account starts with, matching what the dashboard
/// and budget screens expect to find.
pub const DEFAULT_CATEGORIES: [CategorySeed; 7] = [
    CategorySeed {
        name: "Salary",
        kind: CategoryType::Income,
        color: "#10B981",
    },
    CategorySeed {
        name: "Freelance",
        kind: CategoryType::Income,
        color: "#34D399",
    },
    CategorySeed {
        name: "Food",
        kind: CategoryType::Expense,
        color: "#EF4444",
    },
    CategorySeed {
        name: "Transport",
        kind: CategoryType::Expense,
        color: "#F59E0B",
    },
    CategorySeed {
        name: "Entertainment",
        kind: CategoryType::Expense,
        color: "#8B5CF6",
    },
    CategorySeed {
        name: "Utilities",
        kind: CategoryType::Expense,
        color: "#6366F1",
    },
    CategorySeed {
        name: "Shopping",
        kind: CategoryType::Expense,
        color: "#EC4899",
    },
];

pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    pub fn new(user_repo: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        AccountService { user_repo, hasher }
    }

    pub async fn register(
        &self,
        username: String,
        password: String,
        email: Option<String>,
    ) -> Result<User> {
        let password_hash = self.hasher.hash(&password)?;
        self.user_repo
            .create_user(username, password_hash, email, DEFAULT_CATEGORIES.to_vec())
            .await
    }

    /// Unknown user and wrong password must be indistinguishable to the
    /// caller, in result and in timing.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        match self.user_repo.find_by_username(username).await? {
            Some(user) => {
                if self.hasher.verify(password, &user.password_hash) {
                    Ok(user)
                } else {
                    Err(AppError::AuthFailure.into())
                }
            }
            None => {
                // Burn a hash so this path costs about as much as a failed
                // verification.
                let _ = self.hasher.hash(password);
                Err(AppError::AuthFailure.into())
            }
        }
    }

    pub async fn me(&self, id: i64) -> Result<User> {
        self.user_repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::AuthFailure.into())
    }
}
