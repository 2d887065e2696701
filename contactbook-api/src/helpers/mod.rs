pub mod database;
pub mod multipart;
