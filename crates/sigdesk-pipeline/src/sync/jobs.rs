//! Jobs sync: grouped hiring signals per company, template-driven.

use std::time::Instant;

use sqlx::PgPool;

use sigdesk_core::{AppConfig, CompanyCandidate, Credibility, RefinedSignal, SourceKind};
use sigdesk_db::{insert_signal, signal_exists};
use sigdesk_sources::{jobs, HiringSignal};

use super::SyncReport;
use crate::assembler::{assemble, SignalSeed};
use crate::error::PipelineError;
use crate::resolver::resolve_company;

/// Fixed so every run regenerates the same board and dedup holds.
const BOARD_SEED: u64 = 2203;
const BOARD_SIZE: usize = 60;

/// Runs a full job-board sync. One signal per hiring company, never one
/// per posting.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] when the dedup check fails.
pub async fn sync_jobs(pool: &PgPool, _config: &AppConfig) -> Result<SyncReport, PipelineError> {
    let postings = jobs::postings(BOARD_SEED, BOARD_SIZE);
    let total = postings.len();

    let grouped = jobs::group_hiring_signals(&postings);
    let filtered = grouped.len();

    let mut fresh: Vec<HiringSignal> = Vec::new();
    let mut skipped = 0;
    for signal in grouped {
        if signal_exists(pool, SourceKind::Jobs.as_str(), &signal.source_url).await? {
            skipped += 1;
        } else {
            fresh.push(signal);
        }
    }
    tracing::info!(new = fresh.len(), skipped, "jobs dedup complete");

    let started = Instant::now();
    let mut outcomes = Vec::with_capacity(fresh.len());
    for hiring in &fresh {
        outcomes.push(store_hiring_signal(pool, hiring).await);
    }

    Ok(SyncReport::finish(total, filtered, skipped, false, started, outcomes))
}

async fn store_hiring_signal(pool: &PgPool, hiring: &HiringSignal) -> Result<(), String> {
    let company_candidate = CompanyCandidate {
        name: hiring.company_name.clone(),
        description: jobs::summary(hiring),
        website: hiring.source_url.clone(),
        employee_count: hiring.team_size.clone(),
        tags: jobs::tags(hiring),
        ..CompanyCandidate::default()
    };
    let resolved = resolve_company(pool, &company_candidate).await;

    let refined = RefinedSignal {
        headline: jobs::headline(hiring),
        summary: jobs::summary(hiring),
        why_it_matters: jobs::why_it_matters(hiring),
        recommended_action: jobs::recommended_action(hiring),
        tags: jobs::tags(hiring),
    };

    let seed = SignalSeed {
        refined,
        source: SourceKind::Jobs,
        source_ref: hiring.source_url.clone(),
        source_link: hiring.source_url.clone(),
        signal_type: hiring.signal_type.as_str().to_owned(),
        credibility: Credibility::High,
        base_score: jobs::score(hiring),
        ai_refined: false,
        source_meta: serde_json::json!({
            "job_count": hiring.job_count,
            "departments": hiring.departments,
            "seniority_levels": hiring.seniority_levels,
            "growth_indicator": hiring.growth_indicator,
            "funding_stage": hiring.funding_stage,
        }),
    };
    let signal = assemble(seed, resolved.as_ref(), Vec::new(), &hiring.company_name);

    insert_signal(pool, &signal)
        .await
        .map_err(|e| format!("{}: {e}", hiring.company_name))?;
    Ok(())
}
