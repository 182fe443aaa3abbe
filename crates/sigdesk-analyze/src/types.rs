//! Output shapes for the extraction gate and the search digest.
//!
//! `Raw*` types mirror the JSON the model is asked to emit, with every field
//! defaulted so a partially filled response still deserializes. The
//! sanitisation pass in `gate.rs` turns them into the strict core types.

use serde::Deserialize;
use sigdesk_core::{CompanyCandidate, PersonCandidate, RefinedSignal};
use std::collections::BTreeMap;

/// The sanitised result of analysing one candidate item.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub signal: RefinedSignal,
    pub company: Option<CompanyCandidate>,
    pub people: Vec<PersonCandidate>,
}

/// Model output for the refined signal, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSignal {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub why_it_matters: String,
    #[serde(default)]
    pub recommended_action: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Model output for an extracted company, before the plausibility filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompany {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employee_count: String,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

/// Model output for an extracted person, before the plausibility filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

/// The full analysis object as the model emits it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    pub signal: Option<RawSignal>,
    #[serde(default)]
    pub company: Option<RawCompany>,
    #[serde(default)]
    pub people: Vec<RawPerson>,
}

/// AI-written digest of search results, layered on top of the keyword
/// scorer's hit list.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct SearchDigest {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub relevant_ids: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
