//! Database operations for the `companies` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigdesk_core::CompanyCandidate;
use sqlx::{types::Json, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::DbError;

const COMPANY_COLUMNS: &str = "id, name, description, website, industry, location, \
     employee_count, founded_year, logo_url, tags, social_links, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `companies` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website: String,
    pub industry: String,
    pub location: String,
    pub employee_count: String,
    pub founded_year: Option<i32>,
    pub logo_url: String,
    pub tags: Vec<String>,
    pub social_links: Json<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a company. `Some` fields overlay the existing row,
/// `None` fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct CompanyPatch {
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

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all companies, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_companies(pool: &PgPool) -> Result<Vec<CompanyRow>, DbError> {
    let rows = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single company by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the company whose name matches `name` case-insensitively, if any.
///
/// The `idx_companies_name_ci` index backs this lookup, so resolution stays
/// exact-match: "ACME corp" finds "Acme Corp" but never "Acme".
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_company_by_name_ci(
    pool: &PgPool,
    name: &str,
) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE LOWER(name) = LOWER($1)"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns companies whose name contains `fragment`, case-insensitively.
///
/// This is a review helper for spotting near-duplicate names; it is never
/// used for automatic resolution.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_similar_companies(
    pool: &PgPool,
    fragment: &str,
) -> Result<Vec<CompanyRow>, DbError> {
    let pattern = format!("%{fragment}%");
    let rows = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE name ILIKE $1 ORDER BY name"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a new company row from a candidate profile and returns the full
/// inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_company(
    pool: &PgPool,
    candidate: &CompanyCandidate,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "INSERT INTO companies \
           (name, description, website, industry, location, employee_count, \
            founded_year, logo_url, tags, social_links) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(&candidate.name)
    .bind(&candidate.description)
    .bind(&candidate.website)
    .bind(&candidate.industry)
    .bind(&candidate.location)
    .bind(&candidate.employee_count)
    .bind(candidate.founded_year)
    .bind(&candidate.logo_url)
    .bind(&candidate.tags)
    .bind(Json(&candidate.social_links))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites every profile column of an existing company with a merged
/// profile and returns the updated row.
///
/// Callers compute the merged profile first; this function just persists it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn update_company_merged(
    pool: &PgPool,
    id: Uuid,
    merged: &CompanyCandidate,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "UPDATE companies \
         SET name = $2, description = $3, website = $4, industry = $5, \
             location = $6, employee_count = $7, founded_year = $8, \
             logo_url = $9, tags = $10, social_links = $11, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(id)
    .bind(&merged.name)
    .bind(&merged.description)
    .bind(&merged.website)
    .bind(&merged.industry)
    .bind(&merged.location)
    .bind(&merged.employee_count)
    .bind(merged.founded_year)
    .bind(&merged.logo_url)
    .bind(&merged.tags)
    .bind(Json(&merged.social_links))
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Applies a partial update to a company and returns the updated row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn patch_company(
    pool: &PgPool,
    id: Uuid,
    patch: &CompanyPatch,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "UPDATE companies \
         SET name           = COALESCE($2, name), \
             description    = COALESCE($3, description), \
             website        = COALESCE($4, website), \
             industry       = COALESCE($5, industry), \
             location       = COALESCE($6, location), \
             employee_count = COALESCE($7, employee_count), \
             founded_year   = COALESCE($8, founded_year), \
             logo_url       = COALESCE($9, logo_url), \
             tags           = COALESCE($10, tags), \
             social_links   = COALESCE($11, social_links), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.name.as_deref())
    .bind(patch.description.as_deref())
    .bind(patch.website.as_deref())
    .bind(patch.industry.as_deref())
    .bind(patch.location.as_deref())
    .bind(patch.employee_count.as_deref())
    .bind(patch.founded_year)
    .bind(patch.logo_url.as_deref())
    .bind(patch.tags.as_ref())
    .bind(patch.social_links.as_ref().map(Json))
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a company by id. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_company(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
