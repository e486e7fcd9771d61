pub mod account;
pub mod budget;
pub mod category;
pub mod error;
pub mod report;
pub mod transaction;

mod tests;
