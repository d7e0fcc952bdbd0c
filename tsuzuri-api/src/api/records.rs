//! Typing result endpoint

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;
use tsuzuri_common::db::{records, NewPracticeRecord, PracticeRecord};

use crate::api::session::{parse_json, CurrentAccount};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Body of `POST /api/result`. Both fields are JSON numbers.
#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    pub cps: Option<f64>,
    pub accuracy: Option<f64>,
}

/// Round to the nearest integer; the `as` cast saturates out-of-range values
fn round_score(value: f64) -> i64 {
    value.round() as i64
}

/// POST /api/result
///
/// Stores one attempt for the logged-in account. Values are clamped,
/// never rejected for being out of range.
pub async fn save_result(
    State(state): State<AppState>,
    current: CurrentAccount,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PracticeRecord>)> {
    let request: ResultRequest = parse_json(&body)?;

    let (cps, accuracy) = match (request.cps, request.accuracy) {
        (Some(cps), Some(accuracy)) => (cps, accuracy),
        _ => return Err(ApiError::BadRequest("cps and accuracy are required".to_string())),
    };

    let record = NewPracticeRecord::clamped(round_score(cps), round_score(accuracy));
    let stored = records::insert_record(&state.db, current.account.id, record).await?;
    let total = records::count_records(&state.db, current.account.id).await?;

    info!(
        account_id = current.account.id,
        cps = stored.cps,
        accuracy = stored.accuracy,
        total,
        "Typing result saved"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

pub fn record_routes() -> Router<AppState> {
    Router::new().route("/result", post(save_result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_round_half_away_from_zero() {
        assert_eq!(round_score(12.5), 13);
        assert_eq!(round_score(99.4), 99);
        assert_eq!(round_score(-0.6), -1);
        assert_eq!(round_score(1e30), i64::MAX);
    }
}
