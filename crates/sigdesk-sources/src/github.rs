//! GitHub trending source: search-API ladder over widening date ranges,
//! dedup by repo URL, filter/categorize/score.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sigdesk_core::{clamp_score_f64, Candidate, CandidateAuthor, EngagementMetrics};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::FetchConfig;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const PAGES_PER_RANGE: u32 = 3;
const PER_PAGE: u32 = 30;
const TARGET_REPO_COUNT: usize = 100;
const PAGE_PAUSE_MS: u64 = 100;
const MIN_TODAY_STARS: i64 = 50;

/// Widening date windows with rising star floors. Early windows find
/// fresh breakouts, later ones backfill with established fast risers.
const DATE_RANGES: &[(i64, i64)] = &[(7, 100), (14, 200), (30, 300), (60, 500)];

/// A repo normalized out of the search API.
#[derive(Debug, Clone)]
pub struct TrendingRepo {
    pub author: String,
    pub name: String,
    pub url: String,
    pub description: String,
    pub language: String,
    pub stars: i64,
    pub forks: i64,
    /// Estimated daily star velocity: total stars over the window length.
    pub today_stars: i64,
    pub contributor_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
    created_at: DateTime<Utc>,
    owner: SearchOwner,
}

#[derive(Debug, Deserialize)]
struct SearchOwner {
    login: String,
}

/// Client for the GitHub search API. Unauthenticated; rate limits are
/// handled by the shared retry helper.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GithubClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(config: &FetchConfig, base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    async fn search_page(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchItem>, SourceError> {
        let url = format!("{}/search/repositories", self.base_url);
        let response: SearchResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
                let response = self
                    .client
                    .get(&url)
                    .query(&[
                        ("q", query),
                        ("sort", "stars"),
                        ("order", "desc"),
                        ("per_page", &PER_PAGE.to_string()),
                        ("page", &page.to_string()),
                    ])
                    .header("Accept", "application/vnd.github.v3+json")
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::Api {
                        source_name: "github",
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    });
                }
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                    context: format!("search page {page} for '{query}'"),
                    source: e,
                })
            })
            .await?;

        Ok(response.items)
    }

    /// Walks the date-range ladder collecting unique repos, stopping once
    /// the target count is reached. Repos seen in an earlier window are
    /// never replaced by a later, less fresh estimate.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when a page fetch fails after retries.
    pub async fn trending(&self, now: DateTime<Utc>) -> Result<Vec<TrendingRepo>, SourceError> {
        let mut repos: Vec<TrendingRepo> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        for &(days, min_stars) in DATE_RANGES {
            let since = (now - chrono::Duration::days(days)).format("%Y-%m-%d");
            let query = format!("created:>{since} stars:>{min_stars}");

            for page in 1..=PAGES_PER_RANGE {
                let items = self.search_page(&query, page).await?;
                if items.is_empty() {
                    break;
                }
                for item in items {
                    if seen_urls.insert(item.html_url.clone()) {
                        repos.push(normalize(item, days));
                    }
                }
                tokio::time::sleep(Duration::from_millis(PAGE_PAUSE_MS)).await;
            }

            if repos.len() >= TARGET_REPO_COUNT {
                break;
            }
        }

        repos.sort_by(|a, b| b.stars.cmp(&a.stars));
        Ok(repos)
    }
}

fn normalize(item: SearchItem, window_days: i64) -> TrendingRepo {
    TrendingRepo {
        author: item.owner.login,
        name: item.name,
        url: item.html_url,
        description: item.description.unwrap_or_default(),
        language: item.language.unwrap_or_else(|| "Unknown".to_owned()),
        stars: item.stargazers_count,
        forks: item.forks_count,
        today_stars: item.stargazers_count / window_days.max(1),
        contributor_count: 1,
        created_at: item.created_at,
    }
}

// ---------------------------------------------------------------------------
// Filtering, categorizing, scoring
// ---------------------------------------------------------------------------

const SIGNAL_KEYWORDS: &[&str] = &[
    "ai", "ml", "machine learning", "llm", "gpt", "model", "neural", "transformer", "diffusion",
    "chatbot", "framework", "library", "tool", "cli", "sdk", "api", "platform", "engine",
    "runtime", "compiler", "react", "vue", "svelte", "next", "remix", "astro", "rust", "go",
    "typescript", "python", "wasm", "kubernetes", "docker", "serverless", "edge", "devtools",
    "testing", "debugging", "monitoring", "deployment", "ci/cd", "automation", "productivity",
    "blockchain", "web3", "crypto", "defi", "nft", "quantum", "iot", "webassembly",
    "alternative", "open source", "self-hosted", "privacy", "decentralized", "p2p",
    "local-first",
];

const HIGH_SIGNAL_KEYWORDS: &[&str] = &[
    "ai", "llm", "gpt", "framework", "alternative", "self-hosted",
];

const HOT_LANGUAGES: &[&str] = &["typescript", "rust", "go", "python"];

fn repo_text(repo: &TrendingRepo) -> String {
    format!("{} {}", repo.name, repo.description).to_lowercase()
}

/// A repo is worth processing when its star velocity clears the floor and
/// its name or description mentions a signal keyword.
#[must_use]
pub fn is_signal_worthy(repo: &TrendingRepo) -> bool {
    if repo.today_stars < MIN_TODAY_STARS {
        return false;
    }
    let text = repo_text(repo);
    SIGNAL_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Buckets a repo into a signal type by name + description keywords.
#[must_use]
pub fn categorize(repo: &TrendingRepo) -> &'static str {
    let text = repo_text(repo);
    let any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if any(&["ai", "ml", "llm", "gpt", "model", "neural", "transformer", "diffusion", "chatbot"]) {
        "ai_tool"
    } else if any(&["framework", "library", "sdk", "api", "platform"]) {
        "framework_library"
    } else if any(&[
        "devtools",
        "testing",
        "debugging",
        "monitoring",
        "deployment",
        "ci/cd",
        "automation",
    ]) {
        "developer_tool"
    } else if any(&[
        "alternative",
        "open source",
        "self-hosted",
        "privacy",
        "decentralized",
    ]) {
        "open_source_alternative"
    } else if any(&["language", "compiler", "runtime", "interpreter", "transpiler"]) {
        "language_runtime"
    } else {
        "emerging_tech"
    }
}

/// Source-level score 0..=10 from star velocity, total stars, language
/// heat, keywords, and contributor count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(repo: &TrendingRepo) -> i32 {
    let mut total = (repo.today_stars as f64 / 100.0).min(4.0);
    total += (repo.stars as f64 / 1_000.0).min(2.0);

    if HOT_LANGUAGES.contains(&repo.language.to_lowercase().as_str()) {
        total += 1.0;
    }

    let text = repo_text(repo);
    if HIGH_SIGNAL_KEYWORDS.iter().any(|k| text.contains(k)) {
        total += 2.0;
    }

    if repo.contributor_count >= 3 {
        total += 1.0;
    }

    clamp_score_f64(total)
}

/// Turns a kebab-case repo name into a display-cased project name for the
/// company candidate, e.g. `vector-db` becomes `Vector Db`.
#[must_use]
pub fn project_name(repo_name: &str) -> String {
    repo_name
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a repo into the common candidate shape.
#[must_use]
pub fn candidate(repo: &TrendingRepo) -> Candidate {
    Candidate {
        title: format!("{}/{}", repo.author, repo.name),
        description: repo.description.clone(),
        url: repo.url.clone(),
        discussion_url: repo.url.clone(),
        engagement: EngagementMetrics {
            primary: repo.stars,
            secondary: repo.forks,
        },
        timestamp: repo.created_at,
        topics: vec![repo.language.clone(), categorize(repo).to_owned()],
        authors: vec![CandidateAuthor {
            name: repo.author.clone(),
            handle: Some(repo.author.clone()),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, description: &str, today_stars: i64) -> TrendingRepo {
        TrendingRepo {
            author: "octocat".to_owned(),
            name: name.to_owned(),
            url: format!("https://github.com/octocat/{name}"),
            description: description.to_owned(),
            language: "Rust".to_owned(),
            stars: 1_000,
            forks: 50,
            today_stars,
            contributor_count: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filter_requires_star_velocity_and_keywords() {
        assert!(is_signal_worthy(&repo("fastdb", "embedded database library", 60)));
        assert!(!is_signal_worthy(&repo("fastdb", "embedded database library", 40)));
        assert!(!is_signal_worthy(&repo("dotfiles", "my personal setup", 60)));
    }

    #[test]
    fn categorize_prefers_ai_over_later_buckets() {
        assert_eq!(categorize(&repo("llm-server", "fast llm inference", 60)), "ai_tool");
        assert_eq!(
            categorize(&repo("webkit", "a rendering framework", 60)),
            "framework_library"
        );
        assert_eq!(
            categorize(&repo("runcheck", "monitoring for cron jobs", 60)),
            "developer_tool"
        );
        assert_eq!(
            categorize(&repo("suprbase", "self-hosted firebase", 60)),
            "open_source_alternative"
        );
        assert_eq!(categorize(&repo("zz", "a tiny systems interpreter", 60)), "language_runtime");
    }

    #[test]
    fn score_adds_language_and_keyword_bonuses() {
        // 0.6 velocity + 1.0 stars + 1.0 hot language + 2.0 "llm" keyword.
        let r = repo("llm-server", "fast llm inference", 60);
        assert_eq!(score(&r), 5);
    }

    #[test]
    fn score_caps_at_ten() {
        let mut r = repo("llm-server", "fast llm inference framework", 10_000);
        r.stars = 50_000;
        r.contributor_count = 5;
        assert_eq!(score(&r), 10);
    }

    #[test]
    fn project_name_display_cases_kebab_names() {
        assert_eq!(project_name("vector-db"), "Vector Db");
        assert_eq!(project_name("anvil"), "Anvil");
    }
}
