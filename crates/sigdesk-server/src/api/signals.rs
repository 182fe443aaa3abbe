//! Signal CRUD handlers.
//!
//! The default listing mirrors the triage feed: published signals only,
//! best score first. `?status=all` lifts the filter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sigdesk_core::score::clamp_score;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SignalListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateSignalRequest {
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source_link: String,
    #[serde(default)]
    pub why_it_matters: String,
    #[serde(default)]
    pub recommended_action: String,
    pub score: Option<i64>,
    pub credibility: Option<String>,
    pub signal_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub company_name: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateSignalRequest {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub source_link: Option<String>,
    pub why_it_matters: Option<String>,
    pub recommended_action: Option<String>,
    pub score: Option<i64>,
    pub credibility: Option<String>,
    pub signal_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub status: Option<String>,
}

fn validate_status(req_id: &str, value: &str) -> Result<(), ApiError> {
    match value {
        "draft" | "published" | "archived" => Ok(()),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("status must be 'draft', 'published', or 'archived', got '{value}'"),
        )),
    }
}

fn validate_credibility(req_id: &str, value: &str) -> Result<(), ApiError> {
    match value {
        "low" | "medium" | "high" => Ok(()),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("credibility must be 'low', 'medium', or 'high', got '{value}'"),
        )),
    }
}

/// GET /api/v1/signals
pub(in crate::api) async fn list_signals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SignalListParams>,
) -> Result<Json<ApiResponse<Vec<sigdesk_db::SignalRow>>>, ApiError> {
    let status = params.status.as_deref().unwrap_or("published");
    let filter = if status == "all" { None } else { Some(status) };

    let mut rows = sigdesk_db::list_signals(&state.pool, filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    rows.truncate(normalize_limit(params.limit));

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/signals
pub(in crate::api) async fn create_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSignalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<sigdesk_db::SignalRow>>), ApiError> {
    let rid = &req_id.0;

    let headline = body.headline.trim().to_owned();
    if headline.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "headline must not be empty",
        ));
    }

    let status = body.status.unwrap_or_else(|| "draft".to_owned());
    validate_status(rid, &status)?;
    let credibility = body.credibility.unwrap_or_else(|| "medium".to_owned());
    validate_credibility(rid, &credibility)?;

    let summary = if body.summary.trim().is_empty() {
        headline.clone()
    } else {
        body.summary
    };

    let signal = sigdesk_db::NewSignal {
        headline,
        summary,
        source_link: body.source_link,
        why_it_matters: body.why_it_matters,
        recommended_action: body.recommended_action,
        score: clamp_score(body.score.unwrap_or(5)),
        credibility,
        signal_type: body.signal_type.unwrap_or_else(|| "general".to_owned()),
        tags: body.tags,
        company_id: body.company_id,
        company_name: body.company_name,
        company_ids: body.company_id.into_iter().collect(),
        person_ids: Vec::new(),
        status,
        source: "manual".to_owned(),
        source_ref: String::new(),
        source_meta: serde_json::json!({}),
    };

    let row = sigdesk_db::insert_signal(&state.pool, &signal)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/signals/{id}
pub(in crate::api) async fn get_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<sigdesk_db::SignalRow>>, ApiError> {
    let row = sigdesk_db::get_signal(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "signal not found"))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/signals/{id}
pub(in crate::api) async fn update_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSignalRequest>,
) -> Result<Json<ApiResponse<sigdesk_db::SignalRow>>, ApiError> {
    let rid = &req_id.0;
    if let Some(ref status) = body.status {
        validate_status(rid, status)?;
    }
    if let Some(ref credibility) = body.credibility {
        validate_credibility(rid, credibility)?;
    }

    let patch = sigdesk_db::SignalPatch {
        headline: body.headline,
        summary: body.summary,
        source_link: body.source_link,
        why_it_matters: body.why_it_matters,
        recommended_action: body.recommended_action,
        score: body.score.map(clamp_score),
        credibility: body.credibility,
        signal_type: body.signal_type,
        tags: body.tags,
        company_id: body.company_id,
        company_name: body.company_name,
        status: body.status,
    };

    let row = sigdesk_db::patch_signal(&state.pool, id, &patch)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/signals/{id}
pub(in crate::api) async fn delete_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let removed = sigdesk_db::delete_signal(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if !removed {
        return Err(ApiError::new(req_id.0, "not_found", "signal not found"));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
