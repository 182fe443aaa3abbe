//! Person CRUD handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sigdesk_core::PersonCandidate;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::companies::ListParams;
use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreatePersonRequest {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdatePersonRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub social_links: Option<BTreeMap<String, String>>,
}

fn validate_name(req_id: &str, name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "name must be 1-200 characters",
        ));
    }
    Ok(trimmed.to_owned())
}

/// GET /api/v1/people
pub(in crate::api) async fn list_people(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<sigdesk_db::PersonRow>>>, ApiError> {
    let mut rows = sigdesk_db::list_people(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    rows.truncate(normalize_limit(params.limit));

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/people
pub(in crate::api) async fn create_person(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<sigdesk_db::PersonRow>>), ApiError> {
    let rid = &req_id.0;
    let name = validate_name(rid, &body.name)?;

    let candidate = PersonCandidate {
        name,
        title: body.title,
        bio: body.bio,
        email: body.email,
        avatar_url: body.avatar_url,
        company_id: body.company_id,
        company_name: body.company_name,
        tags: body.tags,
        social_links: body.social_links,
    };

    let row = sigdesk_db::insert_person(&state.pool, &candidate)
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

/// GET /api/v1/people/{id}
pub(in crate::api) async fn get_person(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<sigdesk_db::PersonRow>>, ApiError> {
    let row = sigdesk_db::get_person(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "person not found"))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/people/{id}
pub(in crate::api) async fn update_person(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePersonRequest>,
) -> Result<Json<ApiResponse<sigdesk_db::PersonRow>>, ApiError> {
    let rid = &req_id.0;
    let name = match body.name {
        Some(raw) => Some(validate_name(rid, &raw)?),
        None => None,
    };

    let patch = sigdesk_db::PersonPatch {
        name,
        title: body.title,
        bio: body.bio,
        email: body.email,
        avatar_url: body.avatar_url,
        company_id: body.company_id,
        company_name: body.company_name,
        tags: body.tags,
        social_links: body.social_links,
    };

    let row = sigdesk_db::patch_person(&state.pool, id, &patch)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/people/{id}
pub(in crate::api) async fn delete_person(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let removed = sigdesk_db::delete_person(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if !removed {
        return Err(ApiError::new(req_id.0, "not_found", "person not found"));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
