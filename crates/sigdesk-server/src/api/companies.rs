//! Company CRUD handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sigdesk_core::CompanyCandidate;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employee_count: String,
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub employee_count: Option<String>,
    pub founded_year: Option<i32>,
    pub logo_url: Option<String>,
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

/// GET /api/v1/companies
pub(in crate::api) async fn list_companies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<sigdesk_db::CompanyRow>>>, ApiError> {
    let mut rows = sigdesk_db::list_companies(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    rows.truncate(normalize_limit(params.limit));

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/companies
pub(in crate::api) async fn create_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<sigdesk_db::CompanyRow>>), ApiError> {
    let rid = &req_id.0;
    let name = validate_name(rid, &body.name)?;

    let candidate = CompanyCandidate {
        name,
        description: body.description,
        website: body.website,
        industry: body.industry,
        location: body.location,
        employee_count: body.employee_count,
        logo_url: body.logo_url,
        founded_year: body.founded_year,
        tags: body.tags,
        social_links: body.social_links,
    };

    let row = sigdesk_db::insert_company(&state.pool, &candidate)
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

/// GET /api/v1/companies/{id}
pub(in crate::api) async fn get_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<sigdesk_db::CompanyRow>>, ApiError> {
    let row = sigdesk_db::get_company(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "company not found"))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/companies/{id}
pub(in crate::api) async fn update_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCompanyRequest>,
) -> Result<Json<ApiResponse<sigdesk_db::CompanyRow>>, ApiError> {
    let rid = &req_id.0;
    let name = match body.name {
        Some(raw) => Some(validate_name(rid, &raw)?),
        None => None,
    };

    let patch = sigdesk_db::CompanyPatch {
        name,
        description: body.description,
        website: body.website,
        industry: body.industry,
        location: body.location,
        employee_count: body.employee_count,
        founded_year: body.founded_year,
        logo_url: body.logo_url,
        tags: body.tags,
        social_links: body.social_links,
    };

    let row = sigdesk_db::patch_company(&state.pool, id, &patch)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/companies/{id}
pub(in crate::api) async fn delete_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let removed = sigdesk_db::delete_company(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if !removed {
        return Err(ApiError::new(req_id.0, "not_found", "company not found"));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
