//! Account endpoints under `/api/auth`
//!
//! Signup and login start a session; logout and delete end it.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use tsuzuri_common::auth;
use tsuzuri_common::db::{accounts, records, sessions, Account, AccountProfile, PracticeRecord};

use crate::api::session::{
    clear_session_cookie, cookie_value, csrf_cookie, parse_json, session_cookie, CurrentAccount,
    CSRF_COOKIE, SESSION_COOKIE,
};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Profile plus recent typing history
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: AccountProfile,
    pub records: Vec<PracticeRecord>,
}

/// GET /api/auth/csrf
///
/// Keeps an existing token, otherwise issues a new one.
pub async fn csrf(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = cookie_value(&headers, CSRF_COOKIE).unwrap_or_else(auth::generate_csrf_token);

    (
        [(header::SET_COOKIE, csrf_cookie(&token, state.http.secure_cookies))],
        Json(json!({ "detail": "CSRF cookie set" })),
    )
        .into_response()
}

/// POST /api/auth/signup
pub async fn signup(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: SignupRequest = parse_json(&body)?;

    let email = request
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = request.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }

    let local_part = match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => local.to_string(),
        _ => return Err(ApiError::BadRequest("invalid email address".to_string())),
    };

    auth::validate_password(&password).map_err(ApiError::PasswordPolicy)?;

    if accounts::email_exists(&state.db, &email).await? {
        return Err(ApiError::BadRequest("email already registered".to_string()));
    }

    let base = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or(local_part);
    let username = accounts::unique_username(&state.db, &base).await?;

    let password_hash = auth::hash_password(&password)?;
    let account = accounts::create_account(&state.db, &username, &email, &password_hash).await?;

    start_session(&state, &account, StatusCode::CREATED).await
}

/// POST /api/auth/login
///
/// An identifier containing `@` is an email, anything else a username.
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: LoginRequest = parse_json(&body)?;

    let identifier = request.identifier.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.unwrap_or_default();

    if identifier.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("identifier and password are required".to_string()));
    }

    let account = if identifier.contains('@') {
        accounts::find_by_email(&state.db, identifier).await?
    } else {
        accounts::find_by_username(&state.db, identifier).await?
    };

    match account {
        Some(account) if auth::verify_password(&password, &account.password_hash) => {
            info!(account_id = account.id, "Login succeeded");
            start_session(&state, &account, StatusCode::OK).await
        }
        _ => {
            warn!("Login failed");
            Err(ApiError::BadRequest("invalid credentials".to_string()))
        }
    }
}

/// POST /api/auth/logout
///
/// Succeeds with or without a session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        sessions::delete_session(&state.db, &token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.http.secure_cookies))],
        Json(json!({ "detail": "logged_out" })),
    )
        .into_response())
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> ApiResult<Json<MeResponse>> {
    let history = records::recent_records(
        &state.db,
        current.account.id,
        state.practice.history_limit,
    )
    .await?;

    Ok(Json(MeResponse {
        profile: AccountProfile::from(&current.account),
        records: history,
    }))
}

/// POST /api/auth/delete
///
/// Removes the account, its sessions and its records.
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> ApiResult<Response> {
    accounts::delete_account(&state.db, current.account.id).await?;

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.http.secure_cookies))],
        Json(json!({ "detail": "account_deleted" })),
    )
        .into_response())
}

async fn start_session(state: &AppState, account: &Account, status: StatusCode) -> ApiResult<Response> {
    let token =
        sessions::create_session(&state.db, account.id, state.http.session_max_age()).await?;
    let cookie = session_cookie(
        &token,
        state.http.session_max_age_secs,
        state.http.secure_cookies,
    );

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AccountProfile::from(account)),
    )
        .into_response())
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/csrf", get(csrf))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/delete", post(delete_account))
}
