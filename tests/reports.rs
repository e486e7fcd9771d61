use std::str::FromStr;

use actix_http::Request;
use actix_web::body::to_bytes;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::http::header::ContentType;
use actix_web::{test, App};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};

use finance_tracker::api::app::create_app;
use finance_tracker::api::routes::TokenResponse;
use finance_tracker::infra::db;

const SECRET_KEY: &str = "53b65289550252052c61406f0f3dad24";

async fn spawn() -> (
    Pool<Sqlite>,
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
) {
    let pool = db::memory().await.unwrap();
    let app = test::init_service(
        App::new().configure(create_app(pool.clone(), SECRET_KEY.to_string())),
    )
    .await;
    (pool, app)
}

async fn register_user<S>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .insert_header(ContentType::json())
        .set_payload(format!(
            r#"{{"username": "{username}", "password": "pw123"}}"#
        ))
        .uri("/register")
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let dto: TokenResponse = serde_json::from_slice(&body).unwrap();
    dto.token
}

async fn get_json<S>(app: &S, uri: &str, token: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200, "GET {uri}");

    let body = to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn category_id<S>(app: &S, token: &str, name: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let categories = get_json(app, "/categories", token).await;
    categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .unwrap_or_else(|| panic!("no category named {name}"))["id"]
        .as_i64()
        .unwrap()
}

async fn add_transaction<S>(app: &S, token: &str, category_id: i64, amount: &str, date: &str)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/transactions")
        .insert_header(ContentType::json())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_payload(
            json!({"category_id": category_id, "amount": amount, "date": date}).to_string(),
        )
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[actix_web::test]
async fn monthly_trend_is_ascending_distinct_and_capped() {
    let (_pool, app) = spawn().await;
    let token = register_user(&app, "paula").await;
    let food = category_id(&app, &token, "Food").await;
    let salary = category_id(&app, &token, "Salary").await;

    // Eight distinct months of spending, two entries in some of them.
    for month in 1..=8 {
        let date = format!("2024-{month:02}-15");
        let amount = format!("{}", month * 10);
        add_transaction(&app, &token, food, &amount, &date).await;
    }
    add_transaction(&app, &token, food, "5", "2024-08-20").await;
    add_transaction(&app, &token, salary, "100", "2024-08-01").await;

    let trend = get_json(&app, "/reports/monthly", &token).await;
    let trend = trend.as_array().unwrap();
    assert_eq!(trend.len(), 6);

    let months: Vec<_> = trend
        .iter()
        .map(|m| m["month"].as_str().unwrap())
        .collect();
    assert_eq!(
        months,
        ["2024-03", "2024-04", "2024-05", "2024-06", "2024-07", "2024-08"]
    );
    assert!(months.windows(2).all(|pair| pair[0] < pair[1]));

    let august = &trend[5];
    assert_eq!(decimal(&august["income"]), dec!(100));
    assert_eq!(decimal(&august["expenses"]), dec!(85));

    // Months with no income still report zero, not null.
    let july = &trend[4];
    assert_eq!(decimal(&july["income"]), dec!(0));
    assert_eq!(decimal(&july["expenses"]), dec!(70));

    let shorter = get_json(&app, "/reports/monthly?months=3", &token).await;
    let months: Vec<_> = shorter
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["month"].as_str().unwrap())
        .collect();
    assert_eq!(months, ["2024-06", "2024-07", "2024-08"]);
}

#[actix_web::test]
async fn monthly_trend_is_empty_for_a_fresh_account() {
    let (_pool, app) = spawn().await;
    let token = register_user(&app, "quinn").await;

    let trend = get_json(&app, "/reports/monthly", &token).await;
    assert!(trend.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn trend_and_dashboard_are_scoped_to_the_requesting_user() {
    let (_pool, app) = spawn().await;
    let spender = register_user(&app, "rita").await;
    let food = category_id(&app, &spender, "Food").await;
    add_transaction(&app, &spender, food, "45.50", "2024-03-10").await;

    let bystander = register_user(&app, "sven").await;

    let trend = get_json(&app, "/reports/monthly", &bystander).await;
    assert!(trend.as_array().unwrap().is_empty());

    let summary = get_json(&app, "/dashboard?month=2024-03", &bystander).await;
    assert_eq!(decimal(&summary["income"]), dec!(0));
    assert_eq!(decimal(&summary["expenses"]), dec!(0));
    assert_eq!(decimal(&summary["balance"]), dec!(0));
    assert!(summary["recent_transactions"].as_array().unwrap().is_empty());
    assert!(summary["category_breakdown"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn dashboard_breakdown_orders_categories_by_total_descending() {
    let (_pool, app) = spawn().await;
    let token = register_user(&app, "tess").await;
    let food = category_id(&app, &token, "Food").await;
    let transport = category_id(&app, &token, "Transport").await;
    let utilities = category_id(&app, &token, "Utilities").await;

    add_transaction(&app, &token, transport, "15", "2024-03-02").await;
    add_transaction(&app, &token, food, "30", "2024-03-05").await;
    add_transaction(&app, &token, food, "20", "2024-03-07").await;
    add_transaction(&app, &token, utilities, "120", "2024-03-01").await;

    let summary = get_json(&app, "/dashboard?month=2024-03", &token).await;
    let breakdown: Vec<_> = summary["category_breakdown"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| (c["name"].as_str().unwrap().to_string(), decimal(&c["total"])))
        .collect();

    assert_eq!(
        breakdown,
        [
            ("Utilities".to_string(), dec!(120)),
            ("Food".to_string(), dec!(50)),
            ("Transport".to_string(), dec!(15))
        ]
    );
}
