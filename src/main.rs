use std::env;

use actix_cors::Cors;
use actix_web::{App, HttpServer};

use finance_tracker::api::app::create_app;
use finance_tracker::infra::db;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let pool = db::sqlite().await?;

    let port = env::var_os("HTTP_PORT")
        .map(|val| {
            val.to_str()
                .expect("invalid port")
                .to_string()
                .parse::<u16>()
                .expect("invalid port")
        })
        .unwrap_or(8080);
    let secret_key = env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());

    log::info!(port; "Starting server");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .configure(create_app(pool.clone(), secret_key.clone()))
            .wrap(cors)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await?;

    Ok(())
}
