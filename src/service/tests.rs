#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    use crate::domain::models::{Category, CategoryType, Transaction, User};
    use crate::domain::repository::{
        MockBudgetRepository, MockCategoryRepository, MockTransactionRepository,
        MockUserRepository,
    };
    use crate::domain::service::MockPasswordHasher;
    use crate::service::account::{AccountService, DEFAULT_CATEGORIES};
    use crate::service::budget::{parse_month_key, BudgetService};
    use crate::service::category::{CategoryService, DEFAULT_COLOR};
    use crate::service::error::AppError;
    use crate::service::report::ReportService;
    use crate::service::transaction::TransactionService;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn stored_user(id: i64, username: &str, password_hash: &str) -> User {
        User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: None,
            created_at: timestamp(),
        }
    }

    fn fake_hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|password| Ok(format!("hashed:{password}")));
        hasher
            .expect_verify()
            .returning(|password, hash| hash == format!("hashed:{password}"));
        hasher
    }

    #[test]
    fn default_categories_match_the_seeded_set() {
        let names: Vec<_> = DEFAULT_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "Salary",
                "Freelance",
                "Food",
                "Transport",
                "Entertainment",
                "Utilities",
                "Shopping"
            ]
        );

        let income: Vec<_> = DEFAULT_CATEGORIES
            .iter()
            .filter(|c| c.kind == CategoryType::Income)
            .map(|c| c.name)
            .collect();
        assert_eq!(income, ["Salary", "Freelance"]);
    }

    #[tokio::test]
    async fn register_hashes_the_password_and_seeds_defaults() -> Result<()> {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_create_user()
            .withf(|username, hash, email, seed| {
                username == "alice"
                    && hash == "hashed:pw123"
                    && email.is_none()
                    && seed.len() == 7
                    && seed.as_slice() == DEFAULT_CATEGORIES.as_slice()
            })
            .returning(|username, password_hash, email, _| {
                Ok(User {
                    id: 1,
                    username,
                    password_hash,
                    email,
                    created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(12, 0, 0)
                        .unwrap(),
                })
            });

        let service = AccountService::new(Arc::new(user_repo), Arc::new(fake_hasher()));
        let user = service
            .register("alice".to_string(), "pw123".to_string(), None)
            .await?;

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_hides_whether_the_user_exists() -> Result<()> {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .with(eq("alice"))
            .returning(|_| Ok(Some(stored_user(1, "alice", "hashed:pw123"))));
        user_repo
            .expect_find_by_username()
            .with(eq("ghost"))
            .returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(user_repo), Arc::new(fake_hasher()));

        let wrong_password = service.authenticate("alice", "nope").await.unwrap_err();
        let unknown_user = service.authenticate("ghost", "nope").await.unwrap_err();

        assert_eq!(
            wrong_password.downcast_ref::<AppError>(),
            Some(&AppError::AuthFailure)
        );
        assert_eq!(
            unknown_user.downcast_ref::<AppError>(),
            Some(&AppError::AuthFailure)
        );
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        let user = service.authenticate("alice", "pw123").await?;
        assert_eq!(user.id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn category_add_rejects_unknown_type() {
        let service = CategoryService::new(Arc::new(MockCategoryRepository::new()));

        let err = service
            .add(1, "Stuff".to_string(), "savings", None)
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<AppError>(), Some(&AppError::InvalidType));
    }

    #[tokio::test]
    async fn category_add_defaults_the_color() -> Result<()> {
        let mut category_repo = MockCategoryRepository::new();
        category_repo
            .expect_insert()
            .withf(|user_id, name, kind, color| {
                *user_id == 1
                    && name == "Books"
                    && *kind == CategoryType::Expense
                    && color == DEFAULT_COLOR
            })
            .returning(|user_id, name, kind, color| {
                Ok(Category {
                    id: 8,
                    user_id,
                    name,
                    kind,
                    color,
                })
            });

        let service = CategoryService::new(Arc::new(category_repo));
        let category = service.add(1, "Books".to_string(), "expense", None).await?;

        assert_eq!(category.color, DEFAULT_COLOR);
        Ok(())
    }

    #[tokio::test]
    async fn transaction_add_rejects_unparseable_amount() {
        let service = TransactionService::new(
            Arc::new(MockTransactionRepository::new()),
            Arc::new(MockCategoryRepository::new()),
        );

        let err = service
            .add(1, 3, "12.3.4", None, "2024-03-10")
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<AppError>(),
            Some(&AppError::InvalidAmount)
        );
    }

    #[tokio::test]
    async fn transaction_add_rejects_impossible_date() {
        let service = TransactionService::new(
            Arc::new(MockTransactionRepository::new()),
            Arc::new(MockCategoryRepository::new()),
        );

        let err = service
            .add(1, 3, "10.00", None, "2024-02-30")
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<AppError>(), Some(&AppError::InvalidDate));
    }

    #[tokio::test]
    async fn transaction_add_rejects_another_users_category() {
        let mut category_repo = MockCategoryRepository::new();
        category_repo
            .expect_find_for_user()
            .with(eq(1), eq(9))
            .returning(|_, _| Ok(None));

        let service = TransactionService::new(
            Arc::new(MockTransactionRepository::new()),
            Arc::new(category_repo),
        );

        let err = service
            .add(1, 9, "10.00", None, "2024-03-10")
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<AppError>(),
            Some(&AppError::InvalidCategory)
        );
    }

    #[tokio::test]
    async fn transaction_add_stores_the_amount_sign_as_given() -> Result<()> {
        let mut category_repo = MockCategoryRepository::new();
        category_repo.expect_find_for_user().returning(|user_id, category_id| {
            Ok(Some(Category {
                id: category_id,
                user_id,
                name: "Food".to_string(),
                kind: CategoryType::Expense,
                color: "#EF4444".to_string(),
            }))
        });

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_insert()
            .withf(|_, _, amount, _, _| *amount == dec!(-20.50))
            .returning(|user_id, category_id, amount, description, date| {
                Ok(Transaction {
                    id: 77,
                    user_id,
                    category_id,
                    amount,
                    description,
                    date,
                    created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(12, 0, 0)
                        .unwrap(),
                })
            });

        let service = TransactionService::new(Arc::new(transaction_repo), Arc::new(category_repo));
        let transaction = service.add(1, 3, "-20.50", None, "2024-03-10").await?;

        assert_eq!(transaction.amount, dec!(-20.50));
        Ok(())
    }

    #[test]
    fn month_keys_must_be_zero_padded_year_month() {
        assert_eq!(parse_month_key("2024-03").unwrap(), "2024-03");
        assert_eq!(parse_month_key("2024-3"), Err(AppError::InvalidDate));
        assert_eq!(parse_month_key("2024-13"), Err(AppError::InvalidDate));
        assert_eq!(parse_month_key("202403"), Err(AppError::InvalidDate));
    }

    #[tokio::test]
    async fn budget_set_rejects_malformed_month() {
        let service = BudgetService::new(
            Arc::new(MockBudgetRepository::new()),
            Arc::new(MockCategoryRepository::new()),
        );

        let err = service.set(1, 3, "200", "2024-13").await.unwrap_err();

        assert_eq!(err.downcast_ref::<AppError>(), Some(&AppError::InvalidDate));
    }

    #[tokio::test]
    async fn dashboard_balance_is_income_minus_expenses() -> Result<()> {
        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_month_totals()
            .with(eq(1), eq("2024-03"))
            .returning(|_, _| Ok((dec!(100), dec!(45.50))));
        transaction_repo
            .expect_recent_for_user()
            .with(eq(1), eq(10))
            .returning(|_, _| Ok(vec![]));
        transaction_repo
            .expect_expense_breakdown()
            .with(eq(1), eq("2024-03"))
            .returning(|_, _| Ok(vec![]));

        let service = ReportService::new(Arc::new(transaction_repo));
        let summary = service.dashboard_summary(1, "2024-03").await?;

        assert_eq!(summary.income, dec!(100));
        assert_eq!(summary.expenses, dec!(45.50));
        assert_eq!(summary.balance, dec!(54.50));
        assert!(summary.recent_transactions.is_empty());
        assert!(summary.category_breakdown.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn dashboard_treats_an_empty_month_as_zero() -> Result<()> {
        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_month_totals()
            .returning(|_, _| Ok((dec!(0), dec!(0))));
        transaction_repo
            .expect_recent_for_user()
            .returning(|_, _| Ok(vec![]));
        transaction_repo
            .expect_expense_breakdown()
            .returning(|_, _| Ok(vec![]));

        let service = ReportService::new(Arc::new(transaction_repo));
        let summary = service.dashboard_summary(1, "1999-01").await?;

        assert_eq!(summary.balance, dec!(0));
        Ok(())
    }
}
