//! Session cookies, the logged-in account extractor, and CSRF protection
//!
//! Sessions ride in the `sessionid` cookie. Unsafe methods must echo the
//! `csrftoken` cookie in the `X-CSRFToken` header (double-submit).

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use serde::de::DeserializeOwned;
use tracing::warn;
use tsuzuri_common::db::{sessions, Account};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// CSRF cookie lifetime (one year)
const CSRF_MAX_AGE_SECS: u64 = 31_449_600;

/// Value of cookie `name` from the request's `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value starting a session that lasts `max_age_secs`
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    with_secure(
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token, max_age_secs
        ),
        secure,
    )
}

/// `Set-Cookie` value ending a session
pub fn clear_session_cookie(secure: bool) -> String {
    with_secure(
        format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE),
        secure,
    )
}

/// `Set-Cookie` value for the CSRF token (readable by scripts)
pub fn csrf_cookie(token: &str, secure: bool) -> String {
    with_secure(
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            CSRF_COOKIE, token, CSRF_MAX_AGE_SECS
        ),
        secure,
    )
}

fn with_secure(cookie: String, secure: bool) -> String {
    if secure {
        format!("{}; Secure", cookie)
    } else {
        cookie
    }
}

/// Parse a JSON request body, mapping any failure to 400
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))
}

/// The account behind the request's session cookie.
///
/// Rejects with 401 when there is no cookie or the session is unknown or expired.
pub struct CurrentAccount {
    pub account: Account,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE)
            .ok_or_else(|| ApiError::Unauthorized("not logged in".to_string()))?;

        let max_age = state.http.session_max_age();
        let account = sessions::account_for_session(&state.db, &token, max_age)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("not logged in".to_string()))?;

        Ok(Self { account })
    }
}

/// Double-submit CSRF check on every unsafe method
pub async fn csrf_protect(request: Request, next: Next) -> Result<Response, ApiError> {
    if is_safe_method(request.method()) {
        return Ok(next.run(request).await);
    }

    let cookie = cookie_value(request.headers(), CSRF_COOKIE);
    let header = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match (cookie, header) {
        (Some(cookie), Some(header)) if cookie == header => Ok(next.run(request).await),
        (None, _) => {
            warn!(uri = %request.uri(), "CSRF cookie not set");
            Err(ApiError::Forbidden("CSRF cookie not set".to_string()))
        }
        _ => {
            warn!(uri = %request.uri(), "CSRF token missing or incorrect");
            Err(ApiError::Forbidden("CSRF token missing or incorrect".to_string()))
        }
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; csrftoken=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("sessionid=xyz"));

        assert_eq!(cookie_value(&headers, CSRF_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid="));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn session_cookie_carries_max_age() {
        let cookie = session_cookie("abc", 1_209_600, false);
        assert!(cookie.starts_with("sessionid=abc;"));
        assert!(cookie.contains("; Max-Age=1209600;"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn secure_flag_is_optional() {
        assert!(session_cookie("t", 60, true).ends_with("; Secure"));
        assert!(!session_cookie("t", 60, false).contains("Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
        assert!(!csrf_cookie("t", false).contains("HttpOnly"));
    }
}
