//! Database operations for the `signal_actions` table.
//!
//! Actions are append-only: every triage decision a user makes is recorded
//! as a new row, and the most recent row per signal is that user's current
//! stance. Nothing here rewrites history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigdesk_core::UserAction;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `signal_actions` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActionRow {
    pub id: i64,
    pub signal_id: Uuid,
    pub user_id: String,
    pub action: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// The latest action recorded against a signal, joined with its score.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LastActionRow {
    pub signal_id: Uuid,
    pub action: String,
    pub score: i32,
}

/// Aggregate triage metrics across all published signals.
#[derive(Debug, Clone, Serialize)]
pub struct ActionMetrics {
    pub total_signals: i64,
    pub acted: i64,
    pub useful: i64,
    pub ignored: i64,
    pub no_action: i64,
    /// Share of triaged signals that were worth surfacing, as a rounded
    /// whole percentage. Zero when nothing has been triaged yet.
    pub precision_pct: i64,
    /// Mean score of signals whose latest action is `acted` or `useful`.
    pub avg_score_acted: f64,
    /// Mean score of signals whose latest action is `ignore`.
    pub avg_score_ignored: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Records a triage action against a signal and returns the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including foreign key
/// violations when the signal does not exist.
pub async fn append_action(
    pool: &PgPool,
    signal_id: Uuid,
    user_id: &str,
    action: UserAction,
    notes: &str,
) -> Result<ActionRow, DbError> {
    let row = sqlx::query_as::<_, ActionRow>(
        "INSERT INTO signal_actions (signal_id, user_id, action, notes) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, signal_id, user_id, action, notes, created_at",
    )
    .bind(signal_id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent action for a signal, or `None` if it has never
/// been triaged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn current_action(
    pool: &PgPool,
    signal_id: Uuid,
) -> Result<Option<ActionRow>, DbError> {
    let row = sqlx::query_as::<_, ActionRow>(
        "SELECT id, signal_id, user_id, action, notes, created_at \
         FROM signal_actions \
         WHERE signal_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(signal_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the full action history for a signal, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_actions(pool: &PgPool, signal_id: Uuid) -> Result<Vec<ActionRow>, DbError> {
    let rows = sqlx::query_as::<_, ActionRow>(
        "SELECT id, signal_id, user_id, action, notes, created_at \
         FROM signal_actions \
         WHERE signal_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(signal_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the latest action per triaged signal, joined with the signal's
/// score. Signals without any action are absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn last_actions_with_scores(pool: &PgPool) -> Result<Vec<LastActionRow>, DbError> {
    let rows = sqlx::query_as::<_, LastActionRow>(
        "SELECT DISTINCT ON (a.signal_id) a.signal_id, a.action, s.score \
         FROM signal_actions a \
         JOIN signals s ON s.id = a.signal_id \
         ORDER BY a.signal_id, a.created_at DESC, a.id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Computes [`ActionMetrics`] from the total signal count and the latest
/// action per triaged signal.
///
/// Each signal is bucketed by its latest action only. Signals marked
/// `useful` count toward precision and toward the acted-score average.
#[must_use]
pub fn compute_action_metrics(total_signals: i64, last_actions: &[LastActionRow]) -> ActionMetrics {
    let mut acted = 0i64;
    let mut useful = 0i64;
    let mut ignored = 0i64;
    let mut acted_score_sum = 0i64;
    let mut acted_score_count = 0i64;
    let mut ignored_score_sum = 0i64;

    for row in last_actions {
        match row.action.as_str() {
            "acted" => {
                acted += 1;
                acted_score_sum += i64::from(row.score);
                acted_score_count += 1;
            }
            "useful" => {
                useful += 1;
                acted_score_sum += i64::from(row.score);
                acted_score_count += 1;
            }
            "ignore" => {
                ignored += 1;
                ignored_score_sum += i64::from(row.score);
            }
            _ => {}
        }
    }

    let triaged = acted + useful + ignored;
    let precision_pct = if triaged > 0 {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        {
            (((acted + useful) as f64 / triaged as f64) * 100.0).round() as i64
        }
    } else {
        0
    };
    let avg_score_acted = if acted_score_count > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            acted_score_sum as f64 / acted_score_count as f64
        }
    } else {
        0.0
    };
    let avg_score_ignored = if ignored > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            ignored_score_sum as f64 / ignored as f64
        }
    } else {
        0.0
    };

    ActionMetrics {
        total_signals,
        acted,
        useful,
        ignored,
        no_action: (total_signals - triaged).max(0),
        precision_pct,
        avg_score_acted,
        avg_score_ignored,
    }
}

/// Loads the current triage metrics for the whole signal table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn action_metrics(pool: &PgPool) -> Result<ActionMetrics, DbError> {
    let total_signals = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM signals")
        .fetch_one(pool)
        .await?;
    let last_actions = last_actions_with_scores(pool).await?;

    Ok(compute_action_metrics(total_signals, &last_actions))
}
