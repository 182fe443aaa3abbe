//! Shared domain types flowing between the sources, the extraction gate,
//! and the resolver.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which external source produced an item. Doubles as the dedup namespace
/// for the `(source, source_ref)` uniqueness check on signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    HackerNews,
    ProductHunt,
    Github,
    Yc,
    Reddit,
    Jobs,
    Manual,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "hackernews",
            SourceKind::ProductHunt => "producthunt",
            SourceKind::Github => "github",
            SourceKind::Yc => "yc",
            SourceKind::Reddit => "reddit",
            SourceKind::Jobs => "jobs",
            SourceKind::Manual => "manual",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Draft,
    Published,
    Archived,
}

impl SignalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignalStatus::Draft => "draft",
            SignalStatus::Published => "published",
            SignalStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credibility {
    Low,
    Medium,
    High,
}

impl Credibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Credibility::Low => "low",
            Credibility::Medium => "medium",
            Credibility::High => "high",
        }
    }
}

/// A user's verdict on a signal. The last recorded action is the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Acted,
    Useful,
    Ignore,
}

impl UserAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::Acted => "acted",
            UserAction::Useful => "useful",
            UserAction::Ignore => "ignore",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "acted" => Some(UserAction::Acted),
            "useful" => Some(UserAction::Useful),
            "ignore" => Some(UserAction::Ignore),
            _ => None,
        }
    }
}

/// Raw engagement numbers carried through from the source. `primary` is the
/// source's headline metric (votes, stars, upvotes); `secondary` is usually
/// a comment count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub primary: i64,
    pub secondary: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAuthor {
    pub name: String,
    #[serde(default)]
    pub handle: Option<String>,
}

/// The common shape every source record is normalized into before analysis.
/// Purely structural; missing fields default to empty/zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub description: String,
    pub url: String,
    pub discussion_url: String,
    pub engagement: EngagementMetrics,
    pub timestamp: DateTime<Utc>,
    pub topics: Vec<String>,
    pub authors: Vec<CandidateAuthor>,
}

impl Candidate {
    /// A minimal candidate with only a title, for tests and sparse sources.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: String::new(),
            url: String::new(),
            discussion_url: String::new(),
            engagement: EngagementMetrics::default(),
            timestamp: Utc::now(),
            topics: Vec::new(),
            authors: Vec::new(),
        }
    }
}

/// A company as extracted by the gate or assembled from source metadata,
/// before resolution against the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyCandidate {
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
    pub logo_url: String,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

impl CompanyCandidate {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

/// A person as extracted by the gate, before resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonCandidate {
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
    pub company_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

impl PersonCandidate {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

/// Narrative fields for one signal, either AI-refined or template-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedSignal {
    pub headline: String,
    pub summary: String,
    pub why_it_matters: String,
    pub recommended_action: String,
    pub tags: Vec<String>,
}
