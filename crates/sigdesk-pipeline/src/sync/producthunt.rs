//! Product Hunt sync: today's launches, AI-required pipeline.

use std::time::Instant;

use sqlx::PgPool;

use sigdesk_core::{AppConfig, SourceKind};
use sigdesk_db::signal_exists;
use sigdesk_sources::{producthunt, FetchConfig, PhClient, PhPost};

use super::{process_ai_item, require_gate, run_batches, AiItem, SyncReport};
use crate::error::PipelineError;

/// Runs a full Product Hunt sync. Requires both the developer token and a
/// usable AI credential.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] when either credential is missing and
/// [`PipelineError::Source`] when the posts fetch fails outright.
pub async fn sync_producthunt(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<SyncReport, PipelineError> {
    let gate = require_gate(config)?;
    let token = config
        .producthunt_api_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            PipelineError::Config("PRODUCT_HUNT_API_TOKEN is not configured".to_owned())
        })?;

    let client = PhClient::new(token, &FetchConfig::from_app_config(config))?;

    tracing::info!("fetching product hunt launches");
    let posts = client.posts().await?;
    let total = posts.len();

    // Every fetched launch is a candidate; the posts query is already
    // ordered by votes.
    let filtered = total;

    let mut fresh: Vec<PhPost> = Vec::new();
    let mut skipped = 0;
    for post in posts {
        if signal_exists(pool, SourceKind::ProductHunt.as_str(), &post.id).await? {
            skipped += 1;
        } else {
            fresh.push(post);
        }
    }
    tracing::info!(new = fresh.len(), skipped, "product hunt dedup complete");

    let started = Instant::now();
    let gate = &gate;
    let outcomes = run_batches(
        fresh,
        config.analysis_batch_size,
        config.analysis_batch_delay_ms,
        |post| async move {
            let item = AiItem {
                candidate: producthunt::candidate(&post),
                source_ref: post.id.clone(),
                signal_type: "product_launch".to_owned(),
                base_score: producthunt::score(&post),
                source_meta: producthunt::source_meta(&post),
                fallback_company: post.name.clone(),
                author_fallback: None,
            };
            process_ai_item(pool, gate, SourceKind::ProductHunt, item).await
        },
    )
    .await;

    Ok(SyncReport::finish(total, filtered, skipped, true, started, outcomes))
}
