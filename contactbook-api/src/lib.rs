pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod services;
pub mod storage;

pub use database::Database;
pub use services::InterchangeService;
