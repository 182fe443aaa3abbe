//! Database operations for the `signals` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const SIGNAL_COLUMNS: &str = "id, headline, summary, source_link, why_it_matters, \
     recommended_action, score, credibility, signal_type, tags, company_id, \
     company_name, company_ids, person_ids, status, source, source_ref, \
     source_meta, published_at, created_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `signals` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SignalRow {
    pub id: Uuid,
    pub headline: String,
    pub summary: String,
    pub source_link: String,
    pub why_it_matters: String,
    pub recommended_action: String,
    pub score: i32,
    pub credibility: String,
    pub signal_type: String,
    pub tags: Vec<String>,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub company_ids: Vec<Uuid>,
    pub person_ids: Vec<Uuid>,
    pub status: String,
    pub source: String,
    pub source_ref: String,
    pub source_meta: serde_json::Value,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// All fields needed to create a signal.
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub headline: String,
    pub summary: String,
    pub source_link: String,
    pub why_it_matters: String,
    pub recommended_action: String,
    pub score: i32,
    pub credibility: String,
    pub signal_type: String,
    pub tags: Vec<String>,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub company_ids: Vec<Uuid>,
    pub person_ids: Vec<Uuid>,
    pub status: String,
    pub source: String,
    pub source_ref: String,
    pub source_meta: serde_json::Value,
}

/// Partial update for a signal. `Some` fields overlay the existing row,
/// `None` fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct SignalPatch {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub source_link: Option<String>,
    pub why_it_matters: Option<String>,
    pub recommended_action: Option<String>,
    pub score: Option<i32>,
    pub credibility: Option<String>,
    pub signal_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns signals ordered by score (highest first), then recency.
///
/// Passing `Some(status)` filters to that lifecycle state; `None` returns
/// every signal.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_signals(
    pool: &PgPool,
    status: Option<&str>,
) -> Result<Vec<SignalRow>, DbError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, SignalRow>(&format!(
                "SELECT {SIGNAL_COLUMNS} FROM signals \
                 WHERE status = $1 \
                 ORDER BY score DESC, created_at DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SignalRow>(&format!(
                "SELECT {SIGNAL_COLUMNS} FROM signals \
                 ORDER BY score DESC, created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Returns a single signal by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_signal(pool: &PgPool, id: Uuid) -> Result<Option<SignalRow>, DbError> {
    let row = sqlx::query_as::<_, SignalRow>(&format!(
        "SELECT {SIGNAL_COLUMNS} FROM signals WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns `true` if a signal from `source` with this upstream reference
/// already exists.
///
/// Used by sync orchestrators to skip duplicates before spending any
/// analysis effort on an item. Empty references never match anything, so
/// manually created signals are exempt.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn signal_exists(
    pool: &PgPool,
    source: &str,
    source_ref: &str,
) -> Result<bool, DbError> {
    if source_ref.is_empty() {
        return Ok(false);
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM signals WHERE source = $1 AND source_ref = $2)",
    )
    .bind(source)
    .bind(source_ref)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Creates a new signal row and returns the full inserted row.
///
/// `published_at` is stamped immediately when the signal starts out in the
/// `published` state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including unique violations
/// on `(source, source_ref)` when two syncs race on the same item.
pub async fn insert_signal(pool: &PgPool, signal: &NewSignal) -> Result<SignalRow, DbError> {
    let row = sqlx::query_as::<_, SignalRow>(&format!(
        "INSERT INTO signals \
           (headline, summary, source_link, why_it_matters, recommended_action, \
            score, credibility, signal_type, tags, company_id, company_name, \
            company_ids, person_ids, status, source, source_ref, source_meta, \
            published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, \
                 CASE WHEN $14 = 'published' THEN NOW() ELSE NULL END) \
         RETURNING {SIGNAL_COLUMNS}"
    ))
    .bind(&signal.headline)
    .bind(&signal.summary)
    .bind(&signal.source_link)
    .bind(&signal.why_it_matters)
    .bind(&signal.recommended_action)
    .bind(signal.score)
    .bind(&signal.credibility)
    .bind(&signal.signal_type)
    .bind(&signal.tags)
    .bind(signal.company_id)
    .bind(&signal.company_name)
    .bind(&signal.company_ids)
    .bind(&signal.person_ids)
    .bind(&signal.status)
    .bind(&signal.source)
    .bind(&signal.source_ref)
    .bind(&signal.source_meta)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies a partial update to a signal and returns the updated row.
///
/// A transition into the `published` state stamps `published_at` the first
/// time it happens; later status changes never clear or overwrite it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn patch_signal(
    pool: &PgPool,
    id: Uuid,
    patch: &SignalPatch,
) -> Result<SignalRow, DbError> {
    let row = sqlx::query_as::<_, SignalRow>(&format!(
        "UPDATE signals \
         SET headline           = COALESCE($2, headline), \
             summary            = COALESCE($3, summary), \
             source_link        = COALESCE($4, source_link), \
             why_it_matters     = COALESCE($5, why_it_matters), \
             recommended_action = COALESCE($6, recommended_action), \
             score              = COALESCE($7, score), \
             credibility        = COALESCE($8, credibility), \
             signal_type        = COALESCE($9, signal_type), \
             tags               = COALESCE($10, tags), \
             company_id         = COALESCE($11, company_id), \
             company_name       = COALESCE($12, company_name), \
             status             = COALESCE($13, status), \
             published_at       = CASE \
               WHEN $13 = 'published' AND published_at IS NULL THEN NOW() \
               ELSE published_at END \
         WHERE id = $1 \
         RETURNING {SIGNAL_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.headline.as_deref())
    .bind(patch.summary.as_deref())
    .bind(patch.source_link.as_deref())
    .bind(patch.why_it_matters.as_deref())
    .bind(patch.recommended_action.as_deref())
    .bind(patch.score)
    .bind(patch.credibility.as_deref())
    .bind(patch.signal_type.as_deref())
    .bind(patch.tags.as_ref())
    .bind(patch.company_id)
    .bind(patch.company_name.as_deref())
    .bind(patch.status.as_deref())
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a signal by id. Returns `true` if a row was removed.
///
/// Associated rows in `signal_actions` go with it via `ON DELETE CASCADE`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_signal(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM signals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
