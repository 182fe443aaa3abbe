//! Signal assembly: narrative + entity links + score into a storable row.

use uuid::Uuid;

use sigdesk_core::{
    score::{clamp_score, AI_ANALYSIS_BONUS},
    Credibility, RefinedSignal, SignalStatus, SourceKind,
};
use sigdesk_db::NewSignal;

use crate::resolver::ResolvedCompany;

/// Everything a sync orchestrator knows about one item before entity links
/// are attached.
#[derive(Debug, Clone)]
pub struct SignalSeed {
    pub refined: RefinedSignal,
    pub source: SourceKind,
    /// Source-native identity used for dedup. Empty only for manual signals.
    pub source_ref: String,
    pub source_link: String,
    pub signal_type: String,
    pub credibility: Credibility,
    /// The source formula's score, before the AI bonus.
    pub base_score: i32,
    /// Whether the narrative came from the extraction gate rather than
    /// templates. Grants the score bonus.
    pub ai_refined: bool,
    pub source_meta: serde_json::Value,
}

/// Builds the insertable signal from a seed and resolved entities.
///
/// Imported signals are born published. When no company resolved, the
/// source's fallback display name is used with no id link.
#[must_use]
pub fn assemble(
    seed: SignalSeed,
    company: Option<&ResolvedCompany>,
    person_ids: Vec<Uuid>,
    fallback_company_name: &str,
) -> NewSignal {
    let bonus = if seed.ai_refined { AI_ANALYSIS_BONUS } else { 0 };
    let score = clamp_score(i64::from(seed.base_score) + bonus);

    let mut tags = seed.refined.tags;
    if tags.is_empty() {
        tags.push(seed.signal_type.clone());
    }

    let (company_id, company_name) = match company {
        Some(resolved) => (Some(resolved.id), resolved.name.clone()),
        None => (None, fallback_company_name.to_owned()),
    };

    NewSignal {
        headline: seed.refined.headline,
        summary: seed.refined.summary,
        source_link: seed.source_link,
        why_it_matters: seed.refined.why_it_matters,
        recommended_action: seed.refined.recommended_action,
        score,
        credibility: seed.credibility.as_str().to_owned(),
        signal_type: seed.signal_type,
        tags,
        company_id,
        company_name,
        company_ids: company_id.into_iter().collect(),
        person_ids,
        status: SignalStatus::Published.as_str().to_owned(),
        source: seed.source.as_str().to_owned(),
        source_ref: seed.source_ref,
        source_meta: seed.source_meta,
    }
}
