//! The entity extraction gate.
//!
//! One call per candidate item: refine the raw title/description into
//! narrative signal fields and extract any explicitly named company and
//! people. Everything the model emits passes through the plausibility
//! filters in `sigdesk_core::validate` before it can reach the resolver.

use sigdesk_core::{
    validate::{is_fake_company_name, is_valid_person_name},
    AppConfig, Candidate, CompanyCandidate, PersonCandidate, RefinedSignal,
};

use crate::client::ClaudeClient;
use crate::error::AnalyzeError;
use crate::prompt;
use crate::repair::parse_json_block;
use crate::types::{Analysis, RawAnalysis, SearchDigest};

const FALLBACK_WHY: &str = "Flagged by source-level scoring as worth a look.";
const FALLBACK_ACTION: &str = "Review the linked item and decide if follow-up is warranted.";
const MIN_KEY_LEN: usize = 20;

/// Whether AI analysis is available for this process.
///
/// Sync policies consult this: sources that require AI refuse to run
/// against [`AnalysisBackend::Disabled`], template-driven sources degrade
/// gracefully.
pub enum AnalysisBackend {
    Enabled(ExtractionGate),
    Disabled,
}

impl AnalysisBackend {
    /// Builds the backend from application config. Yields an enabled gate
    /// only when the API credential looks real: present, longer than 20
    /// characters, and not an obvious placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalyzeError> {
        match config.anthropic_api_key.as_deref() {
            Some(key) if is_usable_key(key) => {
                let gate = ExtractionGate::new(key, config.analysis_timeout_secs)?;
                Ok(Self::Enabled(gate))
            }
            _ => Ok(Self::Disabled),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    #[must_use]
    pub fn gate(&self) -> Option<&ExtractionGate> {
        match self {
            Self::Enabled(gate) => Some(gate),
            Self::Disabled => None,
        }
    }
}

fn is_usable_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    key.len() > MIN_KEY_LEN
        && !lowered.contains("your-api-key")
        && !lowered.contains("placeholder")
        && !lowered.contains("changeme")
}

/// Calls Claude to refine candidates and extract entities.
#[derive(Clone)]
pub struct ExtractionGate {
    client: ClaudeClient,
}

impl ExtractionGate {
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AnalyzeError> {
        Ok(Self {
            client: ClaudeClient::new(api_key, timeout_secs)?,
        })
    }

    /// Test constructor pointing at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalyzeError> {
        Ok(Self {
            client: ClaudeClient::with_base_url(api_key, timeout_secs, base_url)?,
        })
    }

    /// Analyses one candidate item.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError`] on API failure, unparseable output, or a
    /// response with no `signal` object.
    pub async fn analyze(&self, candidate: &Candidate) -> Result<Analysis, AnalyzeError> {
        let user = prompt::extraction_prompt(candidate);
        let text = self.client.complete(prompt::EXTRACTION_SYSTEM, &user).await?;
        let value = parse_json_block(&text)?;
        let raw: RawAnalysis =
            serde_json::from_value(value).map_err(|e| AnalyzeError::Deserialize {
                context: format!("analysis of '{}'", candidate.title),
                source: e,
            })?;

        sanitise(raw, candidate)
    }

    /// Writes a digest over the keyword scorer's hit list. Callers fall back
    /// to the plain hit list on any error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError`] on API failure or unparseable output.
    pub async fn search_digest(
        &self,
        query: &str,
        corpus_lines: &[String],
    ) -> Result<SearchDigest, AnalyzeError> {
        let user = prompt::digest_prompt(query, corpus_lines);
        let text = self.client.complete(prompt::DIGEST_SYSTEM, &user).await?;
        let value = parse_json_block(&text)?;

        serde_json::from_value(value).map_err(|e| AnalyzeError::Deserialize {
            context: format!("search digest for '{query}'"),
            source: e,
        })
    }
}

/// Applies narrative defaults and the entity plausibility filters to raw
/// model output.
///
/// # Errors
///
/// Returns [`AnalyzeError::MalformedResponse`] when the response carries no
/// `signal` object at all.
pub fn sanitise(raw: RawAnalysis, candidate: &Candidate) -> Result<Analysis, AnalyzeError> {
    let raw_signal = raw.signal.ok_or_else(|| {
        AnalyzeError::MalformedResponse("response is missing the signal object".to_string())
    })?;

    let headline = if raw_signal.headline.trim().is_empty() {
        candidate.title.clone()
    } else {
        raw_signal.headline
    };
    let summary = if raw_signal.summary.trim().is_empty() {
        headline.clone()
    } else {
        raw_signal.summary
    };
    let why_it_matters = if raw_signal.why_it_matters.trim().is_empty() {
        FALLBACK_WHY.to_string()
    } else {
        raw_signal.why_it_matters
    };
    let recommended_action = if raw_signal.recommended_action.trim().is_empty() {
        FALLBACK_ACTION.to_string()
    } else {
        raw_signal.recommended_action
    };
    let tags = if raw_signal.tags.is_empty() {
        vec!["startup".to_string()]
    } else {
        raw_signal.tags
    };

    let company = raw.company.and_then(|c| {
        if is_fake_company_name(&c.name, &candidate.title) {
            tracing::debug!(name = %c.name, "discarding implausible company name");
            return None;
        }
        Some(CompanyCandidate {
            name: c.name,
            description: c.description,
            website: c.website,
            industry: c.industry,
            location: c.location,
            employee_count: c.employee_count,
            logo_url: c.logo_url,
            founded_year: c.founded_year,
            tags: c.tags,
            social_links: c.social_links,
        })
    });

    let people = raw
        .people
        .into_iter()
        .filter_map(|p| {
            if !is_valid_person_name(&p.name) {
                tracing::debug!(name = %p.name, "discarding implausible person name");
                return None;
            }
            Some(PersonCandidate {
                name: p.name,
                title: p.title,
                bio: p.bio,
                email: p.email,
                avatar_url: p.avatar_url,
                company_id: None,
                company_name: p.company_name,
                tags: p.tags,
                social_links: p.social_links,
            })
        })
        .collect();

    Ok(Analysis {
        signal: RefinedSignal {
            headline,
            summary,
            why_it_matters,
            recommended_action,
            tags,
        },
        company,
        people,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawCompany, RawPerson, RawSignal};

    fn raw_with_signal(signal: RawSignal) -> RawAnalysis {
        RawAnalysis {
            signal: Some(signal),
            company: None,
            people: vec![],
        }
    }

    #[test]
    fn missing_signal_object_is_an_error() {
        let raw = RawAnalysis::default();
        let err = sanitise(raw, &Candidate::from_title("Item")).unwrap_err();
        assert!(matches!(err, AnalyzeError::MalformedResponse(_)));
    }

    #[test]
    fn empty_narrative_fields_get_defaults() {
        let raw = raw_with_signal(RawSignal::default());
        let analysis = sanitise(raw, &Candidate::from_title("Acme ships anvils")).unwrap();

        assert_eq!(analysis.signal.headline, "Acme ships anvils");
        assert_eq!(analysis.signal.summary, "Acme ships anvils");
        assert_eq!(analysis.signal.why_it_matters, FALLBACK_WHY);
        assert_eq!(analysis.signal.recommended_action, FALLBACK_ACTION);
        assert_eq!(analysis.signal.tags, vec!["startup".to_string()]);
    }

    #[test]
    fn generic_company_names_are_discarded() {
        let mut raw = raw_with_signal(RawSignal::default());
        raw.company = Some(RawCompany {
            name: "Example Company".to_string(),
            ..RawCompany::default()
        });

        let analysis = sanitise(raw, &Candidate::from_title("Item")).unwrap();
        assert!(analysis.company.is_none());
    }

    #[test]
    fn company_equal_to_title_is_discarded() {
        let mut raw = raw_with_signal(RawSignal::default());
        raw.company = Some(RawCompany {
            name: "Show HN: my tool".to_string(),
            ..RawCompany::default()
        });

        let analysis = sanitise(raw, &Candidate::from_title("show hn: MY TOOL")).unwrap();
        assert!(analysis.company.is_none());
    }

    #[test]
    fn plausible_company_survives() {
        let mut raw = raw_with_signal(RawSignal::default());
        raw.company = Some(RawCompany {
            name: "Anthropic".to_string(),
            website: "https://anthropic.com".to_string(),
            ..RawCompany::default()
        });

        let analysis = sanitise(raw, &Candidate::from_title("Item")).unwrap();
        let company = analysis.company.expect("company should survive");
        assert_eq!(company.name, "Anthropic");
        assert_eq!(company.website, "https://anthropic.com");
    }

    #[test]
    fn implausible_person_names_are_filtered_out() {
        let mut raw = raw_with_signal(RawSignal::default());
        raw.people = vec![
            RawPerson {
                name: "Grace Hopper".to_string(),
                ..RawPerson::default()
            },
            RawPerson {
                name: "ghopper42".to_string(),
                ..RawPerson::default()
            },
            RawPerson {
                name: "John Doe".to_string(),
                ..RawPerson::default()
            },
        ];

        let analysis = sanitise(raw, &Candidate::from_title("Item")).unwrap();
        let names: Vec<&str> = analysis.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper"]);
    }

    #[test]
    fn placeholder_keys_do_not_enable_the_backend() {
        assert!(!is_usable_key("sk-your-api-key-here-xxxxxxx"));
        assert!(!is_usable_key("short"));
        assert!(is_usable_key("sk-ant-REDACTED"));
    }
}
