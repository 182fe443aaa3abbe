//! Database operations for the `people` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigdesk_core::PersonCandidate;
use sqlx::{types::Json, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::DbError;

const PERSON_COLUMNS: &str = "id, name, title, bio, email, avatar_url, company_id, \
     company_name, tags, social_links, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `people` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PersonRow {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub avatar_url: String,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub tags: Vec<String>,
    pub social_links: Json<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a person. `Some` fields overlay the existing row,
/// `None` fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
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

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all people, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_people(pool: &PgPool) -> Result<Vec<PersonRow>, DbError> {
    let rows = sqlx::query_as::<_, PersonRow>(&format!(
        "SELECT {PERSON_COLUMNS} FROM people ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single person by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_person(pool: &PgPool, id: Uuid) -> Result<Option<PersonRow>, DbError> {
    let row = sqlx::query_as::<_, PersonRow>(&format!(
        "SELECT {PERSON_COLUMNS} FROM people WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the person whose name matches `name` case-insensitively, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_person_by_name_ci(
    pool: &PgPool,
    name: &str,
) -> Result<Option<PersonRow>, DbError> {
    let row = sqlx::query_as::<_, PersonRow>(&format!(
        "SELECT {PERSON_COLUMNS} FROM people WHERE LOWER(name) = LOWER($1)"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new person row from a candidate profile and returns the full
/// inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_person(
    pool: &PgPool,
    candidate: &PersonCandidate,
) -> Result<PersonRow, DbError> {
    let row = sqlx::query_as::<_, PersonRow>(&format!(
        "INSERT INTO people \
           (name, title, bio, email, avatar_url, company_id, company_name, \
            tags, social_links) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {PERSON_COLUMNS}"
    ))
    .bind(&candidate.name)
    .bind(&candidate.title)
    .bind(&candidate.bio)
    .bind(&candidate.email)
    .bind(&candidate.avatar_url)
    .bind(candidate.company_id)
    .bind(&candidate.company_name)
    .bind(&candidate.tags)
    .bind(Json(&candidate.social_links))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites every profile column of an existing person with a merged
/// profile and returns the updated row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn update_person_merged(
    pool: &PgPool,
    id: Uuid,
    merged: &PersonCandidate,
) -> Result<PersonRow, DbError> {
    let row = sqlx::query_as::<_, PersonRow>(&format!(
        "UPDATE people \
         SET name = $2, title = $3, bio = $4, email = $5, avatar_url = $6, \
             company_id = $7, company_name = $8, tags = $9, social_links = $10, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PERSON_COLUMNS}"
    ))
    .bind(id)
    .bind(&merged.name)
    .bind(&merged.title)
    .bind(&merged.bio)
    .bind(&merged.email)
    .bind(&merged.avatar_url)
    .bind(merged.company_id)
    .bind(&merged.company_name)
    .bind(&merged.tags)
    .bind(Json(&merged.social_links))
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Applies a partial update to a person and returns the updated row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn patch_person(
    pool: &PgPool,
    id: Uuid,
    patch: &PersonPatch,
) -> Result<PersonRow, DbError> {
    let row = sqlx::query_as::<_, PersonRow>(&format!(
        "UPDATE people \
         SET name         = COALESCE($2, name), \
             title        = COALESCE($3, title), \
             bio          = COALESCE($4, bio), \
             email        = COALESCE($5, email), \
             avatar_url   = COALESCE($6, avatar_url), \
             company_id   = COALESCE($7, company_id), \
             company_name = COALESCE($8, company_name), \
             tags         = COALESCE($9, tags), \
             social_links = COALESCE($10, social_links), \
             updated_at   = NOW() \
         WHERE id = $1 \
         RETURNING {PERSON_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.name.as_deref())
    .bind(patch.title.as_deref())
    .bind(patch.bio.as_deref())
    .bind(patch.email.as_deref())
    .bind(patch.avatar_url.as_deref())
    .bind(patch.company_id)
    .bind(patch.company_name.as_deref())
    .bind(patch.tags.as_ref())
    .bind(patch.social_links.as_ref().map(Json))
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a person by id. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_person(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM people WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
