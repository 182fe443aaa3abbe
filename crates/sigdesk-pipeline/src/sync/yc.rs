//! Y Combinator sync: directory dataset with graceful AI degradation.
//!
//! Unlike the AI-required sources, this sync always runs. With a gate it
//! refines each company through extraction; without one it falls back to
//! deterministic templates and reports `ai_enabled: false`.

use std::time::Instant;

use chrono::Datelike;
use sqlx::PgPool;

use sigdesk_analyze::{AnalysisBackend, ExtractionGate};
use sigdesk_core::{
    AppConfig, CompanyCandidate, Credibility, PersonCandidate, RefinedSignal, SourceKind,
};
use sigdesk_db::{insert_signal, signal_exists};
use sigdesk_sources::{yc, YcCompany};

use super::{run_batches, SyncReport};
use crate::assembler::{assemble, SignalSeed};
use crate::error::PipelineError;
use crate::resolver::{resolve_company, resolve_person};

/// Fixed so every run regenerates the same directory and dedup holds.
const DIRECTORY_SEED: u64 = 1701;

/// Runs a full YC directory sync.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] when the dedup check fails.
pub async fn sync_yc(pool: &PgPool, config: &AppConfig) -> Result<SyncReport, PipelineError> {
    let backend = AnalysisBackend::from_config(config)?;
    let ai_enabled = backend.is_enabled();
    let current_year = chrono::Utc::now().year();

    let companies = yc::directory(DIRECTORY_SEED, current_year);
    let total = companies.len();

    let worthy: Vec<YcCompany> = companies
        .into_iter()
        .filter(|c| yc::is_signal_worthy(c, current_year))
        .collect();
    let filtered = worthy.len();

    let mut fresh = Vec::new();
    let mut skipped = 0;
    for company in worthy {
        if signal_exists(pool, SourceKind::Yc.as_str(), &company.id).await? {
            skipped += 1;
        } else {
            fresh.push(company);
        }
    }
    tracing::info!(new = fresh.len(), skipped, ai_enabled, "yc dedup complete");

    let started = Instant::now();
    let gate = backend.gate();
    let outcomes = run_batches(
        fresh,
        config.analysis_batch_size,
        config.analysis_batch_delay_ms,
        |company| async move { process_company(pool, gate, &company, current_year).await },
    )
    .await;

    Ok(SyncReport::finish(total, filtered, skipped, ai_enabled, started, outcomes))
}

async fn process_company(
    pool: &PgPool,
    gate: Option<&ExtractionGate>,
    company: &YcCompany,
    current_year: i32,
) -> Result<(), String> {
    let fail = |reason: String| format!("{}: {reason}", company.name);

    // AI refinement is best effort here. A failed analysis falls back to
    // templates instead of losing the company.
    let analysis = match gate {
        Some(gate) => match gate.analyze(&yc::candidate(company)).await {
            Ok(analysis) => Some(analysis),
            Err(err) => {
                tracing::warn!(company = %company.name, error = %err, "yc analysis failed, using templates");
                None
            }
        },
        None => None,
    };
    let ai_refined = analysis.is_some();

    let company_candidate = analysis
        .as_ref()
        .and_then(|a| a.company.clone())
        .unwrap_or_else(|| directory_company(company));
    let resolved = resolve_company(pool, &company_candidate).await;

    let people = analysis
        .as_ref()
        .map(|a| a.people.clone())
        .filter(|people| !people.is_empty())
        .unwrap_or_else(|| founder_candidates(company));

    let mut person_ids = Vec::new();
    for mut person in people {
        if person.title.is_empty() {
            person.title = "Founder".to_owned();
        }
        if let Some(resolved) = &resolved {
            person.company_id = Some(resolved.id);
            if person.company_name.is_empty() {
                person.company_name = resolved.name.clone();
            }
        }
        if let Some(id) = resolve_person(pool, &person).await {
            person_ids.push(id);
        }
    }

    let refined = analysis.map_or_else(|| template_refined(company, current_year), |a| a.signal);

    let seed = SignalSeed {
        refined,
        source: SourceKind::Yc,
        source_ref: company.id.clone(),
        source_link: company.url.clone(),
        signal_type: yc::categorize(company).to_owned(),
        credibility: Credibility::High,
        base_score: yc::score(company, current_year),
        ai_refined,
        source_meta: serde_json::json!({
            "batch": company.batch,
            "vertical": company.vertical,
            "team_size": company.team_size,
            "is_hiring": company.is_hiring,
            "funding_stage": company.funding_stage,
            "location": company.location,
        }),
    };
    let signal = assemble(seed, resolved.as_ref(), person_ids, &company.name);

    insert_signal(pool, &signal)
        .await
        .map_err(|e| fail(e.to_string()))?;
    Ok(())
}

fn directory_company(company: &YcCompany) -> CompanyCandidate {
    CompanyCandidate {
        name: company.name.clone(),
        description: company.description.clone(),
        website: company.website.clone(),
        industry: company.vertical.clone(),
        location: company.location.clone(),
        employee_count: company.team_size.to_string(),
        tags: yc::tags(company),
        ..CompanyCandidate::default()
    }
}

fn founder_candidates(company: &YcCompany) -> Vec<PersonCandidate> {
    company
        .founders
        .iter()
        .map(|founder| PersonCandidate {
            name: founder.name.clone(),
            title: founder.title.clone(),
            company_name: company.name.clone(),
            tags: vec!["founder".to_owned(), "yc_founder".to_owned()],
            social_links: [
                ("linkedin".to_owned(), founder.linkedin.clone()),
                ("twitter".to_owned(), founder.twitter.clone()),
            ]
            .into(),
            ..PersonCandidate::default()
        })
        .collect()
}

fn template_refined(company: &YcCompany, current_year: i32) -> RefinedSignal {
    RefinedSignal {
        headline: yc::headline(company, current_year),
        summary: company.description.clone(),
        why_it_matters: yc::why_it_matters(company, current_year),
        recommended_action: yc::recommended_action(company),
        tags: yc::tags(company),
    }
}
