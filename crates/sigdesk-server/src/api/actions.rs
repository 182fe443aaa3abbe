//! Triage action handlers.
//!
//! Actions are append-only; the latest action per signal decides its
//! metrics bucket.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use sigdesk_core::UserAction;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_USER: &str = "default-user";

#[derive(Debug, Deserialize)]
pub(in crate::api) struct RecordActionRequest {
    pub signal_id: Uuid,
    pub action: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RecordActionResponse {
    pub signal_id: Uuid,
    pub action: &'static str,
}

/// Triage metrics in the shape the dashboard consumes. `precision` is the
/// share of triaged signals judged worth surfacing, as a whole percentage.
#[derive(Debug, Serialize)]
pub(in crate::api) struct MetricsResponse {
    pub total_signals: i64,
    pub acted: i64,
    pub useful: i64,
    pub ignored: i64,
    pub no_action: i64,
    pub precision: i64,
    pub avg_score_acted: f64,
    pub avg_score_ignored: f64,
}

/// POST /api/v1/signals/actions
pub(in crate::api) async fn record_action(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RecordActionRequest>,
) -> Result<Json<ApiResponse<RecordActionResponse>>, ApiError> {
    let rid = &req_id.0;

    let Some(action) = UserAction::parse(&body.action) else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!(
                "invalid action '{}'; must be 'acted', 'useful', or 'ignore'",
                body.action
            ),
        ));
    };

    let signal = sigdesk_db::get_signal(&state.pool, body.signal_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid.clone(), "not_found", "signal not found"))?;

    sigdesk_db::append_action(
        &state.pool,
        signal.id,
        DEFAULT_USER,
        action,
        body.notes.as_deref().unwrap_or(""),
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(
        action = action.as_str(),
        headline = %signal.headline,
        score = signal.score,
        "signal triaged"
    );

    Ok(Json(ApiResponse {
        data: RecordActionResponse {
            signal_id: signal.id,
            action: action.as_str(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/signals/actions/metrics
pub(in crate::api) async fn action_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<MetricsResponse>>, ApiError> {
    let metrics = sigdesk_db::action_metrics(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: MetricsResponse {
            total_signals: metrics.total_signals,
            acted: metrics.acted,
            useful: metrics.useful,
            ignored: metrics.ignored,
            no_action: metrics.no_action,
            precision: metrics.precision_pct,
            avg_score_acted: metrics.avg_score_acted,
            avg_score_ignored: metrics.avg_score_ignored,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
