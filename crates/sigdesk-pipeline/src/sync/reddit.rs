//! Reddit sync: founder-subreddit sweep, purely template-driven.

use std::time::Instant;

use sqlx::PgPool;

use sigdesk_core::{AppConfig, RefinedSignal, SourceKind};
use sigdesk_db::{insert_signal, signal_exists};
use sigdesk_sources::{reddit, FetchConfig, RedditClient, RedditPost};

use super::SyncReport;
use crate::assembler::{assemble, SignalSeed};
use crate::error::PipelineError;

/// Runs a full Reddit sync. Never uses AI; the narrative comes from the
/// signal-type templates.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] only when the HTTP client cannot be
/// built; per-subreddit fetch failures are skipped inside the sweep.
pub async fn sync_reddit(pool: &PgPool, config: &AppConfig) -> Result<SyncReport, PipelineError> {
    let client = RedditClient::new(&FetchConfig::from_app_config(config))?;

    tracing::info!("sweeping founder subreddits");
    let posts = client.all_signals().await;
    // all_signals already keeps only signal-worthy posts.
    let total = posts.len();
    let filtered = total;

    let mut fresh: Vec<RedditPost> = Vec::new();
    let mut skipped = 0;
    for post in posts {
        if signal_exists(pool, SourceKind::Reddit.as_str(), &post.id).await? {
            skipped += 1;
        } else {
            fresh.push(post);
        }
    }
    tracing::info!(new = fresh.len(), skipped, "reddit dedup complete");

    let started = Instant::now();
    let mut outcomes = Vec::with_capacity(fresh.len());
    for post in &fresh {
        outcomes.push(store_post(pool, post).await);
    }

    Ok(SyncReport::finish(total, filtered, skipped, false, started, outcomes))
}

async fn store_post(pool: &PgPool, post: &RedditPost) -> Result<(), String> {
    let refined = RefinedSignal {
        headline: reddit::headline(post),
        summary: reddit::summary(post),
        why_it_matters: reddit::why_it_matters(post),
        recommended_action: reddit::recommended_action(post),
        tags: reddit::tags(post),
    };

    let seed = SignalSeed {
        refined,
        source: SourceKind::Reddit,
        source_ref: post.id.clone(),
        source_link: post.url.clone(),
        signal_type: "community".to_owned(),
        credibility: reddit::credibility(post),
        base_score: reddit::score(post),
        ai_refined: false,
        source_meta: serde_json::json!({
            "subreddit": post.subreddit,
            "author": post.author,
            "upvotes": post.score,
            "comments": post.num_comments,
            "pattern": post.signal_type.as_str(),
        }),
    };
    let signal = assemble(seed, None, Vec::new(), "Reddit Community");

    insert_signal(pool, &signal)
        .await
        .map_err(|e| format!("{}: {e}", post.title))?;
    Ok(())
}
