pub mod app;
pub mod routes;
