//! Search over stored signals, companies, and people.
//!
//! When the analysis backend is enabled the keyword hits are handed to the
//! model for a conversational digest; any failure on that path degrades to
//! the plain keyword ranking, never to an error.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use sigdesk_db::{CompanyRow, PersonRow, SignalRow};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MIN_QUERY_LEN: usize = 3;
const MAX_HITS_PER_ENTITY: usize = 15;
const MAX_CORPUS_LINES_PER_ENTITY: usize = 100;
const MAX_FIELD_LEN: usize = 500;

const PHRASE_WEIGHT: i64 = 10;
const KEYWORD_WEIGHT: i64 = 3;
const TAG_PHRASE_WEIGHT: i64 = 5;
const TAG_KEYWORD_WEIGHT: i64 = 2;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SearchData {
    pub ai_powered: bool,
    pub query: String,
    pub summary: String,
    pub key_findings: Vec<String>,
    pub has_results: bool,
    pub results: SearchResults,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SearchResults {
    pub signals: Vec<SignalRow>,
    pub companies: Vec<CompanyRow>,
    pub people: Vec<PersonRow>,
}

/// POST /api/v1/search
pub(in crate::api) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let rid = req_id.0.clone();
    let query = body.query.trim().to_owned();
    if query.len() < MIN_QUERY_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "query must be at least 3 characters",
        ));
    }

    let signals = sigdesk_db::list_signals(&state.pool, None)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let companies = sigdesk_db::list_companies(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let people = sigdesk_db::list_people(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if let Some(gate) = state.backend.gate() {
        let corpus = corpus_lines(&signals, &companies, &people);
        match gate.search_digest(&query, &corpus).await {
            Ok(digest) => {
                let data = digest_results(query, digest, signals, companies, people);
                return Ok(Json(ApiResponse {
                    data,
                    meta: ResponseMeta::new(req_id.0),
                }));
            }
            Err(e) => {
                tracing::warn!(error = %e, "search digest failed, using keyword ranking");
            }
        }
    }

    let data = keyword_results(query, signals, companies, people);
    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Keyword ranking
// ---------------------------------------------------------------------------

fn keywords_of(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Relevance of one item: exact phrase beats keywords, and matches inside
/// tags count extra.
fn score_item(query: &str, keywords: &[String], fields: &[&str], tags: &[String]) -> i64 {
    let text = fields.join(" ").to_lowercase();
    let mut score = 0;

    if text.contains(query) {
        score += PHRASE_WEIGHT;
    }
    for keyword in keywords {
        if text.contains(keyword.as_str()) {
            score += KEYWORD_WEIGHT;
        }
    }
    for tag in tags {
        let tag = tag.to_lowercase();
        if tag.contains(query) {
            score += TAG_PHRASE_WEIGHT;
        }
        for keyword in keywords {
            if tag.contains(keyword.as_str()) {
                score += TAG_KEYWORD_WEIGHT;
            }
        }
    }

    score
}

fn rank<T>(items: Vec<T>, mut score: impl FnMut(&T) -> i64) -> Vec<T> {
    let mut scored: Vec<(i64, T)> = items
        .into_iter()
        .filter_map(|item| {
            let s = score(&item);
            (s > 0).then_some((s, item))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(MAX_HITS_PER_ENTITY);
    scored.into_iter().map(|(_, item)| item).collect()
}

fn keyword_results(
    query: String,
    signals: Vec<SignalRow>,
    companies: Vec<CompanyRow>,
    people: Vec<PersonRow>,
) -> SearchData {
    let total_signals = signals.len();
    let total_companies = companies.len();
    let total_people = people.len();

    let q = query.to_lowercase();
    let keywords = keywords_of(&q);

    let signals = rank(signals, |s| {
        score_item(
            &q,
            &keywords,
            &[s.headline.as_str(), s.summary.as_str(), s.company_name.as_str()],
            &s.tags,
        )
    });
    let companies = rank(companies, |c| {
        score_item(&q, &keywords, &[c.name.as_str(), c.description.as_str()], &c.tags)
    });
    let people = rank(people, |p| {
        score_item(
            &q,
            &keywords,
            &[
                p.name.as_str(),
                p.title.as_str(),
                p.company_name.as_str(),
                p.bio.as_str(),
            ],
            &p.tags,
        )
    });

    let total_hits = signals.len() + companies.len() + people.len();
    let has_results = total_hits > 0;

    let summary = if has_results {
        format!(
            "Found {total_hits} results matching \"{query}\": {} signals, {} companies, and {} people, ranked by keyword relevance.",
            signals.len(),
            companies.len(),
            people.len()
        )
    } else {
        format!(
            "No results found for \"{query}\" across {total_signals} signals, {total_companies} companies, and {total_people} people. Try different keywords."
        )
    };

    let key_findings = if has_results {
        vec![
            format!("{} relevant signals found", signals.len()),
            format!("{} matching companies", companies.len()),
            format!("{} related people", people.len()),
        ]
    } else {
        Vec::new()
    };

    let suggestions = if has_results {
        Vec::new()
    } else {
        vec![
            "Try broader search terms".to_owned(),
            "Search for a company name".to_owned(),
            "Look for roles like \"founder\" or \"CEO\"".to_owned(),
        ]
    };

    SearchData {
        ai_powered: false,
        query,
        summary,
        key_findings,
        has_results,
        results: SearchResults {
            signals,
            companies,
            people,
        },
        suggestions,
    }
}

// ---------------------------------------------------------------------------
// AI digest
// ---------------------------------------------------------------------------

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    cleaned.chars().take(MAX_FIELD_LEN).collect()
}

fn corpus_lines(
    signals: &[SignalRow],
    companies: &[CompanyRow],
    people: &[PersonRow],
) -> Vec<String> {
    let mut lines = Vec::new();

    for s in signals.iter().take(MAX_CORPUS_LINES_PER_ENTITY) {
        lines.push(format!(
            "signal {} | {} | {} | company: {} | tags: {} | score: {}",
            s.id,
            sanitize(&s.headline),
            sanitize(&s.summary),
            sanitize(&s.company_name),
            s.tags.join(","),
            s.score
        ));
    }
    for c in companies.iter().take(MAX_CORPUS_LINES_PER_ENTITY) {
        lines.push(format!(
            "company {} | {} | {} | tags: {}",
            c.id,
            sanitize(&c.name),
            sanitize(&c.description),
            c.tags.join(",")
        ));
    }
    for p in people.iter().take(MAX_CORPUS_LINES_PER_ENTITY) {
        lines.push(format!(
            "person {} | {} | {} | company: {} | tags: {}",
            p.id,
            sanitize(&p.name),
            sanitize(&p.title),
            sanitize(&p.company_name),
            p.tags.join(",")
        ));
    }

    lines
}

fn digest_results(
    query: String,
    digest: sigdesk_analyze::SearchDigest,
    signals: Vec<SignalRow>,
    companies: Vec<CompanyRow>,
    people: Vec<PersonRow>,
) -> SearchData {
    let picked = |id: &uuid::Uuid| digest.relevant_ids.iter().any(|r| r == &id.to_string());

    let signals: Vec<SignalRow> = signals.into_iter().filter(|s| picked(&s.id)).collect();
    let companies: Vec<CompanyRow> = companies.into_iter().filter(|c| picked(&c.id)).collect();
    let people: Vec<PersonRow> = people.into_iter().filter(|p| picked(&p.id)).collect();

    let has_results = !signals.is_empty() || !companies.is_empty() || !people.is_empty();

    SearchData {
        ai_powered: true,
        query,
        summary: digest.summary,
        key_findings: digest.key_findings,
        has_results,
        results: SearchResults {
            signals,
            companies,
            people,
        },
        suggestions: digest.suggestions,
    }
}
