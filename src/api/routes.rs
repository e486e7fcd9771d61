use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::domain::models::{BudgetStatus, Category, TransactionFilter};
use crate::infra::auth::jwt::JwtManager;
use crate::service::account::AccountService;
use crate::service::budget::BudgetService;
use crate::service::category::CategoryService;
use crate::service::error::AppError;
use crate::service::report::{ReportService, TREND_MONTHS};
use crate::service::transaction::TransactionService;

#[derive(Deserialize, Serialize, Debug)]
struct RegisterBody {
    username: String,
    password: String,
    email: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
struct CategoryBody {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    color: Option<String>,
}

#[derive(Deserialize)]
struct TransactionBody {
    category_id: i64,
    amount: String,
    description: Option<String>,
    date: String,
}

#[derive(Deserialize)]
struct TransactionQuery {
    category: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    month: Option<String>,
}

#[derive(Deserialize)]
struct BudgetBody {
    category_id: i64,
    amount: String,
    month: String,
}

#[derive(Serialize)]
pub struct BudgetsResponse {
    pub month: String,
    pub budgets: Vec<BudgetStatus>,
    pub unbudgeted: Vec<Category>,
}

#[derive(Deserialize)]
struct MonthQuery {
    month: Option<String>,
}

#[derive(Deserialize)]
struct TrendQuery {
    months: Option<i64>,
}

fn current_month() -> String {
    chrono::Utc::now().format("%Y-%m").to_string()
}

/// Expected failures keep their message; anything else is an opaque 500.
fn error_response(err: anyhow::Error) -> HttpResponse {
    match err.downcast_ref::<AppError>() {
        Some(app_err) => match app_err {
            AppError::DuplicateUsername
            | AppError::DuplicateCategory
            | AppError::DuplicateBudget => HttpResponse::Conflict().body(app_err.to_string()),
            AppError::AuthFailure => HttpResponse::Unauthorized().body(app_err.to_string()),
            _ => HttpResponse::BadRequest().body(app_err.to_string()),
        },
        None => {
            log::error!(err:? = err; "Unhandled error");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn authenticated(req: &HttpRequest, jwt: &JwtManager) -> Result<i64, HttpResponse> {
    jwt.user_id_from_req(req)
        .map_err(|_| HttpResponse::Unauthorized().body("invalid or missing token"))
}

#[post("/register")]
async fn register(
    req_body: String,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtManager>,
) -> impl Responder {
    let body = match serde_json::from_str::<RegisterBody>(&req_body) {
        Ok(body) => body,
        Err(err) => return HttpResponse::BadRequest().body(format!("err: {err:?}")),
    };
    if body.username.trim().is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().body("username and password are required");
    }

    let user = match accounts
        .register(body.username, body.password, body.email)
        .await
    {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    log::info!(user:? = user.username; "User registered");

    match jwt.issue_user_token(user.id) {
        Ok(token) => HttpResponse::Ok().json(&TokenResponse { token }),
        Err(err) => error_response(err),
    }
}

#[post("/login")]
async fn login(
    req_body: String,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtManager>,
) -> impl Responder {
    let body = match serde_json::from_str::<LoginBody>(&req_body) {
        Ok(body) => body,
        Err(err) => return HttpResponse::BadRequest().body(format!("err: {err:?}")),
    };

    let user = match accounts.authenticate(&body.username, &body.password).await {
        Ok(user) => user,
        Err(err) => {
            log::info!(username:? = body.username; "Failed login attempt");
            return error_response(err);
        }
    };

    log::info!(user:? = user.username; "User authenticated");

    match jwt.issue_user_token(user.id) {
        Ok(token) => HttpResponse::Ok().json(&TokenResponse { token }),
        Err(err) => error_response(err),
    }
}

#[get("/me")]
async fn me(
    req: HttpRequest,
    jwt: web::Data<JwtManager>,
    accounts: web::Data<AccountService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match accounts.me(user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_response(err),
    }
}

#[get("/categories")]
async fn list_categories(
    req: HttpRequest,
    jwt: web::Data<JwtManager>,
    categories: web::Data<CategoryService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match categories.list(user_id).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => error_response(err),
    }
}

#[post("/categories")]
async fn add_category(
    req: HttpRequest,
    req_body: String,
    jwt: web::Data<JwtManager>,
    categories: web::Data<CategoryService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match serde_json::from_str::<CategoryBody>(&req_body) {
        Ok(body) => body,
        Err(err) => return HttpResponse::BadRequest().body(format!("err: {err:?}")),
    };
    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().body("name is required");
    }

    match categories
        .add(user_id, body.name, &body.kind, body.color)
        .await
    {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => error_response(err),
    }
}

#[get("/transactions")]
async fn list_transactions(
    req: HttpRequest,
    query: web::Query<TransactionQuery>,
    jwt: web::Data<JwtManager>,
    transactions: web::Data<TransactionService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let query = query.into_inner();
    // Empty query values mean "no filter".
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        None => None,
        Some(k) => match k.parse() {
            Ok(kind) => Some(kind),
            Err(()) => return error_response(AppError::InvalidType.into()),
        },
    };
    let filter = TransactionFilter {
        category_id: query.category,
        kind,
        month: query.month.filter(|m| !m.is_empty()),
    };

    match transactions.list(user_id, filter).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => error_response(err),
    }
}

#[post("/transactions")]
async fn add_transaction(
    req: HttpRequest,
    req_body: String,
    jwt: web::Data<JwtManager>,
    transactions: web::Data<TransactionService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match serde_json::from_str::<TransactionBody>(&req_body) {
        Ok(body) => body,
        Err(err) => return HttpResponse::BadRequest().body(format!("err: {err:?}")),
    };

    match transactions
        .add(
            user_id,
            body.category_id,
            &body.amount,
            body.description,
            &body.date,
        )
        .await
    {
        Ok(transaction) => HttpResponse::Ok().json(transaction),
        Err(err) => error_response(err),
    }
}

#[delete("/transactions/{id}")]
async fn delete_transaction(
    req: HttpRequest,
    path: web::Path<i64>,
    jwt: web::Data<JwtManager>,
    transactions: web::Data<TransactionService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // Deleting someone else's transaction, or a missing one, is a no-op.
    match transactions.delete(user_id, path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[get("/budgets")]
async fn list_budgets(
    req: HttpRequest,
    query: web::Query<MonthQuery>,
    jwt: web::Data<JwtManager>,
    budgets: web::Data<BudgetService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let month = query
        .into_inner()
        .month
        .filter(|m| !m.is_empty())
        .unwrap_or_else(current_month);

    let with_spend = match budgets.list_with_spend(user_id, &month).await {
        Ok(list) => list,
        Err(err) => return error_response(err),
    };
    let unbudgeted = match budgets.categories_without_budget(user_id, &month).await {
        Ok(list) => list,
        Err(err) => return error_response(err),
    };

    HttpResponse::Ok().json(&BudgetsResponse {
        month,
        budgets: with_spend,
        unbudgeted,
    })
}

#[post("/budgets")]
async fn add_budget(
    req: HttpRequest,
    req_body: String,
    jwt: web::Data<JwtManager>,
    budgets: web::Data<BudgetService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match serde_json::from_str::<BudgetBody>(&req_body) {
        Ok(body) => body,
        Err(err) => return HttpResponse::BadRequest().body(format!("err: {err:?}")),
    };

    match budgets
        .set(user_id, body.category_id, &body.amount, &body.month)
        .await
    {
        Ok(budget) => HttpResponse::Ok().json(budget),
        Err(err) => error_response(err),
    }
}

#[get("/dashboard")]
async fn dashboard(
    req: HttpRequest,
    query: web::Query<MonthQuery>,
    jwt: web::Data<JwtManager>,
    reports: web::Data<ReportService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let month = query
        .into_inner()
        .month
        .filter(|m| !m.is_empty())
        .unwrap_or_else(current_month);

    match reports.dashboard_summary(user_id, &month).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err),
    }
}

#[get("/reports/monthly")]
async fn monthly_report(
    req: HttpRequest,
    query: web::Query<TrendQuery>,
    jwt: web::Data<JwtManager>,
    reports: web::Data<ReportService>,
) -> impl Responder {
    let user_id = match authenticated(&req, &jwt) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let months = query
        .into_inner()
        .months
        .filter(|m| *m > 0)
        .unwrap_or(TREND_MONTHS);

    match reports.monthly_trend(user_id, months).await {
        Ok(trend) => HttpResponse::Ok().json(trend),
        Err(err) => error_response(err),
    }
}
