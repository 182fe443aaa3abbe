//! Per-source sync orchestrators.
//!
//! Every orchestrator follows the same shape: fetch, filter, dedup against
//! stored signals, then analyze/resolve/assemble/insert per item. AI-required
//! sources refuse to run without a usable key; template sources degrade and
//! report `ai_enabled: false`. Per-item failures are collected as strings and
//! never abort the run.

mod github;
mod hackernews;
mod jobs;
mod producthunt;
mod reddit;
mod yc;

pub use github::sync_github;
pub use hackernews::sync_hackernews;
pub use jobs::sync_jobs;
pub use producthunt::sync_producthunt;
pub use reddit::sync_reddit;
pub use yc::sync_yc;

use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::PgPool;

use sigdesk_analyze::{AnalysisBackend, ExtractionGate};
use sigdesk_core::{AppConfig, Candidate, PersonCandidate, SourceKind};
use sigdesk_db::insert_signal;

use crate::assembler::{assemble, SignalSeed};
use crate::error::PipelineError;
use crate::resolver::{resolve_company, resolve_person};

/// Outcome of one sync run, returned to the caller and serialized by the
/// HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub imported: usize,
    pub skipped: usize,
    /// Items fetched from the source before any filtering.
    pub total: usize,
    /// Items that passed the signal-worthiness filter.
    pub filtered: usize,
    /// New items actually run through the pipeline.
    pub processed: usize,
    pub processing_time_ms: u64,
    pub avg_time_per_item_ms: u64,
    pub ai_enabled: bool,
    pub errors: Vec<String>,
}

impl SyncReport {
    fn finish(
        total: usize,
        filtered: usize,
        skipped: usize,
        ai_enabled: bool,
        started: Instant,
        outcomes: Vec<Result<(), String>>,
    ) -> Self {
        let processed = outcomes.len();
        let mut imported = 0;
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(()) => imported += 1,
                Err(reason) => errors.push(reason),
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let processing_time_ms = started.elapsed().as_millis() as u64;
        let avg_time_per_item_ms = if processed > 0 {
            processing_time_ms / processed as u64
        } else {
            0
        };

        Self {
            imported,
            skipped,
            total,
            filtered,
            processed,
            processing_time_ms,
            avg_time_per_item_ms,
            ai_enabled,
            errors,
        }
    }
}

/// Resolves the extraction gate for sources that cannot run without AI.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] when no usable key is configured.
pub(crate) fn require_gate(config: &AppConfig) -> Result<ExtractionGate, PipelineError> {
    match AnalysisBackend::from_config(config)? {
        AnalysisBackend::Enabled(gate) => Ok(gate),
        AnalysisBackend::Disabled => Err(PipelineError::Config(
            "AI analysis is required for this source but ANTHROPIC_API_KEY is not configured"
                .to_owned(),
        )),
    }
}

/// Runs `op` over `items` in fixed-size parallel batches with a pause
/// between batches, collecting every outcome in order.
pub(crate) async fn run_batches<T, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    delay_ms: u64,
    op: F,
) -> Vec<Result<(), String>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let batch_size = batch_size.max(1);
    let mut queue: VecDeque<T> = items.into();
    let mut results = Vec::with_capacity(queue.len());

    while !queue.is_empty() {
        let take = batch_size.min(queue.len());
        let batch: Vec<T> = queue.drain(..take).collect();
        let futures = batch.into_iter().map(&op);
        results.extend(futures::future::join_all(futures).await);

        if !queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    results
}

/// One AI-refined item ready for the analyze/resolve/assemble/insert path.
pub(crate) struct AiItem {
    pub candidate: Candidate,
    pub source_ref: String,
    pub signal_type: String,
    pub base_score: i32,
    pub source_meta: serde_json::Value,
    /// Display name used when no company resolves.
    pub fallback_company: String,
    /// A person to credit when extraction yields nobody, typically the
    /// submitting author.
    pub author_fallback: Option<PersonCandidate>,
}

/// The shared AI path: extract entities, resolve them, assemble, insert.
/// Failures reduce to an "item: reason" string for the report.
pub(crate) async fn process_ai_item(
    pool: &PgPool,
    gate: &ExtractionGate,
    source: SourceKind,
    item: AiItem,
) -> Result<(), String> {
    let title = item.candidate.title.clone();
    let fail = |reason: String| format!("{title}: {reason}");

    let analysis = gate
        .analyze(&item.candidate)
        .await
        .map_err(|e| fail(e.to_string()))?;

    let company = match &analysis.company {
        Some(candidate) => resolve_company(pool, candidate).await,
        None => None,
    };

    let mut person_ids = Vec::new();
    for mut person in analysis.people {
        if let Some(resolved) = &company {
            person.company_id = Some(resolved.id);
            if person.company_name.is_empty() {
                person.company_name = resolved.name.clone();
            }
        }
        if let Some(id) = resolve_person(pool, &person).await {
            person_ids.push(id);
        }
    }
    if person_ids.is_empty() {
        if let Some(author) = item.author_fallback {
            if let Some(id) = resolve_person(pool, &author).await {
                person_ids.push(id);
            }
        }
    }

    let seed = SignalSeed {
        refined: analysis.signal,
        source,
        source_ref: item.source_ref,
        source_link: item.candidate.url.clone(),
        signal_type: item.signal_type,
        credibility: sigdesk_core::Credibility::High,
        base_score: item.base_score,
        ai_refined: true,
        source_meta: item.source_meta,
    };
    let signal = assemble(seed, company.as_ref(), person_ids, &item.fallback_company);

    insert_signal(pool, &signal)
        .await
        .map_err(|e| fail(e.to_string()))?;
    Ok(())
}
