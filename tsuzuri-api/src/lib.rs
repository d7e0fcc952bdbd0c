//! tsuzuri-api library - typing practice backend
//!
//! Accounts and sessions, practice records, and generated practice
//! sentences with romaji. Exposed as a library for integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware, Router,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use tsuzuri_common::config::{HttpConfig, PracticeConfig, TomlConfig};

use crate::services::{GenerationSettings, TextGenerator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Generative text service
    pub generator: Arc<dyn TextGenerator>,
    /// Model and output budget for practice sets
    pub generation: GenerationSettings,
    /// Category default and history size
    pub practice: PracticeConfig,
    /// Cookie and CORS settings
    pub http: HttpConfig,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, generator: Arc<dyn TextGenerator>, config: &TomlConfig) -> Self {
        Self {
            db,
            generator,
            generation: GenerationSettings {
                model: config.generative.model.clone(),
                max_output_tokens: config.generative.max_output_tokens,
            },
            practice: config.practice.clone(),
            http: config.http.clone(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Every route lives under `/api`. Unsafe methods pass the CSRF check first.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(api::health_routes())
        .merge(api::prompt_routes())
        .merge(api::record_routes())
        .nest("/auth", api::account_routes());

    let cors = cors_layer(&state.http.cors_allowed_origins);

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(api::csrf_protect))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured origins; permissive when none are set
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(api::session::CSRF_HEADER),
        ])
}
