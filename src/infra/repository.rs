use std::str::FromStr;

use rust_decimal::Decimal;

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use budget::SqliteBudgetRepository;
pub use category::SqliteCategoryRepository;
pub use transaction::SqliteTransactionRepository;
pub use user::SqliteUserRepository;

/// Uniqueness is enforced by attempting the insert and classifying the
/// constraint violation, so concurrent writers race on the index instead of
/// on a check-then-insert window.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// SQLite SUM coerces the TEXT amounts to REAL, and very large totals come
/// back in exponent notation, which plain `from_str` rejects.
pub(crate) fn sum_to_decimal(text: &str) -> anyhow::Result<Decimal> {
    match Decimal::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Decimal::from_scientific(text)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sums_parse_in_plain_and_exponent_notation() {
        assert_eq!(sum_to_decimal("45.5").unwrap(), dec!(45.5));
        assert_eq!(sum_to_decimal("0").unwrap(), dec!(0));
        assert_eq!(
            sum_to_decimal("1.0e+19").unwrap(),
            Decimal::from_str("10000000000000000000").unwrap()
        );
        assert!(sum_to_decimal("not-a-number").is_err());
    }
}
