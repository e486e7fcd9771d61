use thiserror::Error;

/// Expected, user-facing failures. Everything else bubbles up as an opaque
/// internal error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("category name already exists")]
    DuplicateCategory,
    #[error("budget already exists for this category and month")]
    DuplicateBudget,
    #[error("category type must be 'income' or 'expense'")]
    InvalidType,
    #[error("unknown category")]
    InvalidCategory,
    #[error("amount must be a decimal number")]
    InvalidAmount,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid username or password")]
    AuthFailure,
}
