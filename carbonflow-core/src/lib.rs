pub mod common;
pub mod database;
pub mod domain;
pub mod storage;

pub use domain::*;

pub use database::DatabaseManager;
