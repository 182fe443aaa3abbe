//! Hacker News source: Firebase API client, signal-worthiness filter,
//! categorizer and scorer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use sigdesk_core::{clamp_score_f64, Candidate, CandidateAuthor, EngagementMetrics};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::FetchConfig;

const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";
const ITEM_BATCH_SIZE: usize = 10;
const ITEM_BATCH_PAUSE_MS: u64 = 200;
const MIN_STORY_SCORE: i64 = 50;

/// One item from the Firebase API. Fields the API omits default to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct HnStory {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Client for the Hacker News Firebase API.
pub struct HnClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HnClient {
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

    async fn get_json(&self, path: &str, context: &str) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/{path}", self.base_url);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Api {
                    source_name: "hackernews",
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }

    /// Fetches the current top-story ids, truncated to `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, API, or parse failure.
    pub async fn top_stories(&self, limit: usize) -> Result<Vec<i64>, SourceError> {
        let value = self.get_json("topstories.json", "topstories").await?;
        let mut ids: Vec<i64> =
            serde_json::from_value(value).map_err(|e| SourceError::Deserialize {
                context: "topstories".to_owned(),
                source: e,
            })?;
        ids.truncate(limit);
        Ok(ids)
    }

    /// Fetches one item. Deleted items come back as JSON `null`, which maps
    /// to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, API, or parse failure.
    pub async fn item(&self, id: i64) -> Result<Option<HnStory>, SourceError> {
        let context = format!("item {id}");
        let value = self.get_json(&format!("item/{id}.json"), &context).await?;
        serde_json::from_value(value).map_err(|e| SourceError::Deserialize {
            context,
            source: e,
        })
    }

    /// Fetches many items in batches of 10 with a 200 ms pause between
    /// batches. Individual failures are logged and skipped, never failing
    /// the whole fetch.
    pub async fn items(&self, ids: &[i64]) -> Vec<HnStory> {
        let mut stories = Vec::with_capacity(ids.len());

        for (batch_index, batch) in ids.chunks(ITEM_BATCH_SIZE).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(Duration::from_millis(ITEM_BATCH_PAUSE_MS)).await;
            }
            let fetches = batch.iter().map(|&id| self.item(id));
            for (id, result) in batch.iter().zip(futures::future::join_all(fetches).await) {
                match result {
                    Ok(Some(story)) => stories.push(story),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(id, error = %err, "skipping unfetchable HN item"),
                }
            }
        }

        stories
    }
}

// ---------------------------------------------------------------------------
// Filtering, categorizing, scoring
// ---------------------------------------------------------------------------

const SIGNAL_KEYWORDS: &[&str] = &[
    "release", "launched", "announcing", "introduces", "unveils", "open source", "github",
    "version", "v2", "v3", "beta", "framework", "library", "tool", "api", "sdk", "platform",
    "react", "vue", "angular", "node", "python", "rust", "go", "yc", "y combinator", "startup",
    "funding", "raised", "series", "acquired", "acquisition", "ipo", "valuation", "market",
    "industry", "trend", "shift", "disruption", "future", "ai", "machine learning", "blockchain",
    "crypto", "web3", "problem", "issue", "broken", "terrible", "awful", "frustrated", "why",
    "how", "stop", "please", "rant", "opinion",
];

const HIGH_SIGNAL_KEYWORDS: &[&str] = &[
    "yc", "openai", "google", "microsoft", "apple", "meta", "amazon",
];

/// A story is worth processing when it is an actual story, has a title,
/// clears the engagement floor, and mentions a signal keyword.
#[must_use]
pub fn is_signal_worthy(story: &HnStory) -> bool {
    if story.kind != "story" || story.title.is_empty() || story.score < MIN_STORY_SCORE {
        return false;
    }
    let title = story.title.to_lowercase();
    SIGNAL_KEYWORDS.iter().any(|k| title.contains(k))
}

/// Buckets a story title into a signal type.
#[must_use]
pub fn categorize(title: &str) -> &'static str {
    let title = title.to_lowercase();
    let matches = |pattern: &str| {
        Regex::new(pattern)
            .expect("valid regex")
            .is_match(&title)
    };

    if matches(r"(release|launched|announcing|introduces|unveils|version|v\d|beta)") {
        "tech_release"
    } else if matches(r"(framework|library|tool|api|sdk|platform|open source)") {
        "framework_library"
    } else if matches(r"(yc|y combinator|startup|funding|raised|series|acquired|ipo)") {
        "startup_announcement"
    } else if matches(r"(market|industry|trend|shift|disruption|future|ai|blockchain|web3)") {
        "market_shift"
    } else if matches(r"(problem|issue|broken|terrible|awful|frustrated|why|how|stop|rant)") {
        "industry_pain_point"
    } else {
        "general_tech"
    }
}

/// Source-level score 0..=10: normalized points, comment engagement,
/// recency, category bonus, and a brand-name bonus.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(story: &HnStory, now: DateTime<Utc>) -> i32 {
    let mut total = (story.score as f64 / 100.0).min(4.0);
    if let Some(descendants) = story.descendants {
        total += (descendants as f64 / 50.0).min(2.0);
    }

    let hours_old = (now.timestamp() - story.time) as f64 / 3600.0;
    if hours_old < 6.0 {
        total += 1.0;
    }

    total += match categorize(&story.title) {
        "startup_announcement" | "tech_release" => 2.0,
        "market_shift" | "framework_library" => 1.5,
        "industry_pain_point" => 1.0,
        _ => 0.0,
    };

    let title = story.title.to_lowercase();
    if HIGH_SIGNAL_KEYWORDS.iter().any(|k| title.contains(k)) {
        total += 1.0;
    }

    clamp_score_f64(total)
}

/// The story's outbound link, falling back to the HN discussion page for
/// self posts.
#[must_use]
pub fn story_url(story: &HnStory) -> String {
    story
        .url
        .clone()
        .unwrap_or_else(|| discussion_url(story))
}

#[must_use]
pub fn discussion_url(story: &HnStory) -> String {
    format!("https://news.ycombinator.com/item?id={}", story.id)
}

/// Normalizes a story into the common candidate shape.
#[must_use]
pub fn candidate(story: &HnStory) -> Candidate {
    Candidate {
        title: story.title.clone(),
        description: story.text.clone().unwrap_or_default(),
        url: story_url(story),
        discussion_url: discussion_url(story),
        engagement: EngagementMetrics {
            primary: story.score,
            secondary: story.descendants.unwrap_or(0),
        },
        timestamp: DateTime::<Utc>::from_timestamp(story.time, 0).unwrap_or_else(Utc::now),
        topics: vec![categorize(&story.title).to_owned()],
        authors: vec![CandidateAuthor {
            name: story.by.clone(),
            handle: Some(story.by.clone()),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(title: &str, points: i64) -> HnStory {
        HnStory {
            id: 1,
            title: title.to_owned(),
            url: None,
            text: None,
            by: "pg".to_owned(),
            time: Utc::now().timestamp(),
            score: points,
            descendants: Some(10),
            kind: "story".to_owned(),
        }
    }

    #[test]
    fn filter_requires_story_type_and_engagement_floor() {
        let mut s = story("Announcing a new framework", 100);
        assert!(is_signal_worthy(&s));

        s.kind = "job".to_owned();
        assert!(!is_signal_worthy(&s));

        s.kind = "story".to_owned();
        s.score = 49;
        assert!(!is_signal_worthy(&s));
    }

    #[test]
    fn filter_requires_a_signal_keyword() {
        assert!(!is_signal_worthy(&story("Quiet Sunday thread", 300)));
        assert!(is_signal_worthy(&story("Acme raised a Series B", 300)));
    }

    #[test]
    fn categorize_prefers_release_over_later_buckets() {
        assert_eq!(categorize("Announcing Postgres v17 beta"), "tech_release");
        assert_eq!(categorize("A tiny HTTP library in C"), "framework_library");
        assert_eq!(categorize("Acme (YC W25) raised a seed round"), "startup_announcement");
        assert_eq!(categorize("The future of the chip industry"), "market_shift");
        assert_eq!(categorize("My deploys keep crashing (rant)"), "industry_pain_point");
        assert_eq!(categorize("Photographs of old bridges"), "general_tech");
    }

    #[test]
    fn version_shorthand_counts_as_release() {
        assert_eq!(categorize("Zig v1 is out"), "tech_release");
    }

    #[test]
    fn score_caps_at_ten() {
        let mut s = story("OpenAI announcing a new model release", 5_000);
        s.descendants = Some(2_000);
        assert_eq!(score(&s, Utc::now()), 10);
    }

    #[test]
    fn score_combines_points_comments_and_category() {
        let now = Utc::now();
        let mut s = story("Announcing a release of our framework", 200);
        s.descendants = Some(50);
        s.time = now.timestamp() - 24 * 3600;
        // 2.0 points + 1.0 comments + 2.0 tech_release, no recency, no brand.
        assert_eq!(score(&s, now), 5);
    }

    #[test]
    fn self_posts_link_to_the_discussion() {
        let s = story("Ask HN: how do you test?", 80);
        assert_eq!(story_url(&s), "https://news.ycombinator.com/item?id=1");
    }
}
