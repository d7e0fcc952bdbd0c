//! HTTP API handlers for tsuzuri-api

pub mod accounts;
pub mod health;
pub mod prompt;
pub mod records;
pub mod session;

pub use accounts::account_routes;
pub use health::health_routes;
pub use prompt::prompt_routes;
pub use records::record_routes;
pub use session::{csrf_protect, CurrentAccount};
