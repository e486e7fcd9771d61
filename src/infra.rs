pub mod auth;
pub mod db;
pub mod repository;
