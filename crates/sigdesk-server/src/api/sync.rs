//! Sync trigger handlers.
//!
//! Per-item failures are already folded into the report by the pipeline;
//! only a missing credential or a top-level failure turns into a non-2xx
//! response here.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sigdesk_pipeline::{PipelineError, SyncReport};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_REPORTED_ERRORS: usize = 5;

/// POST /api/v1/sync/{source}
pub(in crate::api) async fn trigger_sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(source): Path<String>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let rid = &req_id.0;
    let pool = &state.pool;
    let config = state.config.as_ref();

    let result = match source.as_str() {
        "hackernews" => sigdesk_pipeline::sync_hackernews(pool, config).await,
        "producthunt" => sigdesk_pipeline::sync_producthunt(pool, config).await,
        "github" => sigdesk_pipeline::sync_github(pool, config).await,
        "yc" => sigdesk_pipeline::sync_yc(pool, config).await,
        "reddit" => sigdesk_pipeline::sync_reddit(pool, config).await,
        "jobs" => sigdesk_pipeline::sync_jobs(pool, config).await,
        _ => {
            return Err(ApiError::new(
                rid,
                "not_found",
                format!("unknown sync source '{source}'"),
            ))
        }
    };

    let mut report = result.map_err(|e| match e {
        PipelineError::Config(message) => ApiError::new(rid, "bad_request", message),
        other => {
            tracing::error!(source = %source, error = %other, "sync failed");
            ApiError::new(rid, "internal_error", format!("{source} sync failed"))
        }
    })?;

    truncate_errors(&mut report.errors);

    tracing::info!(
        source = %source,
        imported = report.imported,
        skipped = report.skipped,
        "sync finished"
    );

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn truncate_errors(errors: &mut Vec<String>) {
    if errors.len() > MAX_REPORTED_ERRORS {
        let hidden = errors.len() - MAX_REPORTED_ERRORS;
        errors.truncate(MAX_REPORTED_ERRORS);
        errors.push(format!("+{hidden} more"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_error_lists_are_untouched() {
        let mut errors = vec!["a".to_owned(), "b".to_owned()];
        truncate_errors(&mut errors);
        assert_eq!(errors, vec!["a", "b"]);
    }

    #[test]
    fn long_error_lists_get_a_more_marker() {
        let mut errors: Vec<String> = (0..9).map(|i| format!("error {i}")).collect();
        truncate_errors(&mut errors);
        assert_eq!(errors.len(), 6);
        assert_eq!(errors[5], "+4 more");
    }
}
