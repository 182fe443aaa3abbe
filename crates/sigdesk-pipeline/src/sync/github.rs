//! GitHub sync: trending search ladder, AI-required pipeline.

use std::time::Instant;

use sqlx::PgPool;

use sigdesk_core::{AppConfig, SourceKind};
use sigdesk_db::signal_exists;
use sigdesk_sources::{github, FetchConfig, GithubClient, TrendingRepo};

use super::{process_ai_item, require_gate, run_batches, AiItem, SyncReport};
use crate::error::PipelineError;

/// Runs a full GitHub trending sync. Requires a usable AI credential.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] without an AI key and
/// [`PipelineError::Source`] when the search fetch fails outright.
pub async fn sync_github(pool: &PgPool, config: &AppConfig) -> Result<SyncReport, PipelineError> {
    let gate = require_gate(config)?;
    let client = GithubClient::new(&FetchConfig::from_app_config(config))?;

    tracing::info!("fetching github trending repos");
    let repos = client.trending(chrono::Utc::now()).await?;
    let total = repos.len();

    let worthy: Vec<TrendingRepo> = repos
        .into_iter()
        .filter(github::is_signal_worthy)
        .collect();
    let filtered = worthy.len();

    let mut fresh = Vec::new();
    let mut skipped = 0;
    for repo in worthy {
        if signal_exists(pool, SourceKind::Github.as_str(), &repo.url).await? {
            skipped += 1;
        } else {
            fresh.push(repo);
        }
    }
    tracing::info!(new = fresh.len(), skipped, "github dedup complete");

    let started = Instant::now();
    let gate = &gate;
    let outcomes = run_batches(
        fresh,
        config.analysis_batch_size,
        config.analysis_batch_delay_ms,
        |repo| async move {
            let item = ai_item(&repo);
            process_ai_item(pool, gate, SourceKind::Github, item).await
        },
    )
    .await;

    Ok(SyncReport::finish(total, filtered, skipped, true, started, outcomes))
}

fn ai_item(repo: &TrendingRepo) -> AiItem {
    AiItem {
        candidate: github::candidate(repo),
        source_ref: repo.url.clone(),
        signal_type: github::categorize(repo).to_owned(),
        base_score: github::score(repo),
        source_meta: serde_json::json!({
            "stars": repo.stars,
            "forks": repo.forks,
            "today_stars": repo.today_stars,
            "language": repo.language,
            "author": repo.author,
        }),
        // The derived project name reads better than "owner/repo" when no
        // company is extracted.
        fallback_company: github::project_name(&repo.name),
        author_fallback: None,
    }
}
