//! Database models and queries

pub mod accounts;
pub mod init;
pub mod models;
pub mod records;
pub mod sessions;

pub use init::*;
pub use models::*;
