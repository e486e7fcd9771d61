use std::sync::Arc;

use actix_web::web;
use actix_web::web::ServiceConfig;
use sqlx::{Pool, Sqlite};

use crate::api::routes::{
    add_budget, add_category, add_transaction, dashboard, delete_transaction, list_budgets,
    list_categories, list_transactions, login, me, monthly_report, register,
};
use crate::infra::auth::jwt::JwtManager;
use crate::infra::auth::password::Argon2Hasher;
use crate::infra::repository::{
    SqliteBudgetRepository, SqliteCategoryRepository, SqliteTransactionRepository,
    SqliteUserRepository,
};
use crate::service::account::AccountService;
use crate::service::budget::BudgetService;
use crate::service::category::CategoryService;
use crate::service::report::ReportService;
use crate::service::transaction::TransactionService;

pub fn create_app(pool: Pool<Sqlite>, secret_key: String) -> Box<dyn Fn(&mut ServiceConfig)> {
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let category_repo = Arc::new(SqliteCategoryRepository::new(pool.clone()));
    let transaction_repo = Arc::new(SqliteTransactionRepository::new(pool.clone()));
    let budget_repo = Arc::new(SqliteBudgetRepository::new(pool));
    let hasher = Arc::new(Argon2Hasher);

    Box::new(move |cfg: &mut ServiceConfig| {
        let jwt_manager = web::Data::new(JwtManager::new(&secret_key));

        let accounts = web::Data::new(AccountService::new(
            Arc::clone(&user_repo) as Arc<_>,
            Arc::clone(&hasher) as Arc<_>,
        ));
        let categories = web::Data::new(CategoryService::new(Arc::clone(&category_repo) as Arc<_>));
        let transactions = web::Data::new(TransactionService::new(
            Arc::clone(&transaction_repo) as Arc<_>,
            Arc::clone(&category_repo) as Arc<_>,
        ));
        let budgets = web::Data::new(BudgetService::new(
            Arc::clone(&budget_repo) as Arc<_>,
            Arc::clone(&category_repo) as Arc<_>,
        ));
        let reports = web::Data::new(ReportService::new(Arc::clone(&transaction_repo) as Arc<_>));

        cfg.app_data(jwt_manager)
            .app_data(accounts)
            .app_data(categories)
            .app_data(transactions)
            .app_data(budgets)
            .app_data(reports)
            .service(register)
            .service(login)
            .service(me)
            .service(list_categories)
            .service(add_category)
            .service(list_transactions)
            .service(add_transaction)
            .service(delete_transaction)
            .service(list_budgets)
            .service(add_budget)
            .service(dashboard)
            .service(monthly_report);
    })
}
