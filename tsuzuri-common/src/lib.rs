//! # Tsuzuri Common Library
//!
//! Shared code for the tsuzuri typing-practice service:
//! - Configuration loading (TOML + environment)
//! - Database schema and queries (accounts, sessions, typing records)
//! - Password hashing and session/CSRF token generation
//! - Kana to Hepburn romaji transliteration

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod romaji;

pub use error::{Error, Result};
