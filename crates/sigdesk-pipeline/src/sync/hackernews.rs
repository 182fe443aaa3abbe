//! Hacker News sync: top stories, signal filter, AI-required pipeline.

use std::time::Instant;

use sqlx::PgPool;

use sigdesk_core::{AppConfig, PersonCandidate, SourceKind};
use sigdesk_db::signal_exists;
use sigdesk_sources::{hackernews, FetchConfig, HnClient, HnStory};

use super::{process_ai_item, require_gate, run_batches, AiItem, SyncReport};
use crate::error::PipelineError;

const TOP_STORY_LIMIT: usize = 200;
const FALLBACK_COMPANY: &str = "Hacker News Community";

/// Runs a full Hacker News sync. Requires a usable AI credential.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] without an AI key and
/// [`PipelineError::Source`] when the story fetch fails outright.
pub async fn sync_hackernews(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<SyncReport, PipelineError> {
    let gate = require_gate(config)?;
    let client = HnClient::new(&FetchConfig::from_app_config(config))?;

    tracing::info!(limit = TOP_STORY_LIMIT, "fetching hacker news top stories");
    let ids = client.top_stories(TOP_STORY_LIMIT).await?;
    let stories = client.items(&ids).await;
    let total = stories.len();

    let worthy: Vec<HnStory> = stories
        .into_iter()
        .filter(hackernews::is_signal_worthy)
        .collect();
    let filtered = worthy.len();

    let mut fresh = Vec::new();
    let mut skipped = 0;
    for story in worthy {
        let source_ref = story.id.to_string();
        if signal_exists(pool, SourceKind::HackerNews.as_str(), &source_ref).await? {
            skipped += 1;
        } else {
            fresh.push(story);
        }
    }
    tracing::info!(new = fresh.len(), skipped, "hacker news dedup complete");

    let started = Instant::now();
    let gate = &gate;
    let outcomes = run_batches(
        fresh,
        config.analysis_batch_size,
        config.analysis_batch_delay_ms,
        |story| async move {
            let item = ai_item(&story);
            process_ai_item(pool, gate, SourceKind::HackerNews, item).await
        },
    )
    .await;

    Ok(SyncReport::finish(total, filtered, skipped, true, started, outcomes))
}

fn ai_item(story: &HnStory) -> AiItem {
    let author_fallback = if story.by.is_empty() {
        None
    } else {
        Some(PersonCandidate {
            name: story.by.clone(),
            title: "Developer".to_owned(),
            tags: vec!["developer".to_owned(), "hacker_news_author".to_owned()],
            social_links: [("hacker_news".to_owned(), story.by.clone())].into(),
            ..PersonCandidate::default()
        })
    };

    AiItem {
        candidate: hackernews::candidate(story),
        source_ref: story.id.to_string(),
        signal_type: hackernews::categorize(&story.title).to_owned(),
        base_score: hackernews::score(story, chrono::Utc::now()),
        source_meta: serde_json::json!({
            "points": story.score,
            "comments": story.descendants.unwrap_or(0),
            "author": story.by,
            "discussion_url": hackernews::discussion_url(story),
            "category": hackernews::categorize(&story.title),
        }),
        fallback_company: FALLBACK_COMPANY.to_owned(),
        author_fallback,
    }
}
