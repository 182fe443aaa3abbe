//! Reddit source for founder-community signals.
//!
//! Uses Reddit's public JSON listing endpoints, no auth required. Posts are
//! kept only when they match a signal pattern (pain point, unmet need,
//! solution request, shutdown, pivot) or carry heavy engagement.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use sigdesk_core::{
    clamp_score, Candidate, CandidateAuthor, Credibility, EngagementMetrics,
};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::FetchConfig;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
const POSTS_PER_SUBREDDIT: usize = 25;
const SUBREDDIT_DELAY_MS: u64 = 1000;
const MIN_SELFTEXT_LEN: usize = 50;

pub const TARGET_SUBREDDITS: &[&str] = &[
    "startups",
    "Entrepreneur",
    "SaaS",
    "sideproject",
    "indiehackers",
    "consulting",
    "marketing",
    "ArtificialIntelligence",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedditSignalType {
    PainPoint,
    UnmetNeed,
    SolutionRequest,
    Shutdown,
    Pivot,
    General,
}

impl RedditSignalType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PainPoint => "pain_point",
            Self::UnmetNeed => "unmet_need",
            Self::SolutionRequest => "solution_request",
            Self::Shutdown => "shutdown",
            Self::Pivot => "pivot",
            Self::General => "general",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::PainPoint => "Pain point",
            Self::UnmetNeed => "Unmet need",
            Self::SolutionRequest => "Solution request",
            Self::Shutdown => "Shutdown alert",
            Self::Pivot => "Pivot signal",
            Self::General => "Insight",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub score: i64,
    pub num_comments: i64,
    pub created_utc: f64,
    pub signal_type: RedditSignalType,
}

// Listing wire types. Reddit nests posts two levels deep.

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RawPost,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPost {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    removed_by_category: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RedditClient {
    /// Builds a client from the shared fetch settings.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Same as [`RedditClient::new`] with an overridable base URL for tests.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn with_base_url(config: &FetchConfig, base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Fetches the hot listing for one subreddit and keeps signal-worthy
    /// posts.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Api` on a non-success status after retries and
    /// `SourceError::Deserialize` if the listing body is not valid.
    pub async fn subreddit_signals(&self, subreddit: &str) -> Result<Vec<RedditPost>, SourceError> {
        let url = format!(
            "{}/r/{subreddit}/hot.json?limit={POSTS_PER_SUBREDDIT}",
            self.base_url
        );
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Api {
                    source_name: "reddit",
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let listing: Listing =
            serde_json::from_str(&body).map_err(|source| SourceError::Deserialize {
                context: format!("r/{subreddit} hot listing"),
                source,
            })?;

        Ok(listing
            .data
            .children
            .into_iter()
            .filter_map(|child| keep_post(child.data, &self.base_url))
            .collect())
    }

    /// Fetches every target subreddit sequentially with a pause between
    /// requests, returning posts sorted by signal score. A failed subreddit
    /// is logged and skipped so one outage does not drop the whole sweep.
    pub async fn all_signals(&self) -> Vec<RedditPost> {
        let mut posts = Vec::new();
        for (i, subreddit) in TARGET_SUBREDDITS.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(SUBREDDIT_DELAY_MS)).await;
            }
            match self.subreddit_signals(subreddit).await {
                Ok(found) => posts.extend(found),
                Err(err) => {
                    tracing::warn!(subreddit, error = %err, "skipping subreddit after fetch failure");
                }
            }
        }
        posts.sort_by_key(|p| std::cmp::Reverse(score(p)));
        posts
    }
}

fn keep_post(raw: RawPost, base_url: &str) -> Option<RedditPost> {
    if raw.removed_by_category.is_some() || raw.author == "[deleted]" {
        return None;
    }
    if raw.selftext.len() < MIN_SELFTEXT_LEN {
        return None;
    }
    let signal_type = detect_signal_type(&raw.title, &raw.selftext);
    if signal_type == RedditSignalType::General && raw.score <= 100 {
        return None;
    }
    Some(RedditPost {
        id: raw.id,
        title: raw.title,
        selftext: raw.selftext,
        author: raw.author,
        subreddit: raw.subreddit,
        url: format!("{base_url}{}", raw.permalink),
        score: raw.score,
        num_comments: raw.num_comments,
        created_utc: raw.created_utc,
        signal_type,
    })
}

// ---------------------------------------------------------------------------
// Signal detection and scoring
// ---------------------------------------------------------------------------

const PAIN_POINT_PATTERNS: &[&str] = &[
    "struggling with",
    "frustrated by",
    "pain point",
    "problem with",
    "issue with",
    "difficult to",
    "hard to",
    "annoying",
    "hate that",
];

const UNMET_NEED_PATTERNS: &[&str] = &[
    "wish there was",
    "need a tool",
    "looking for a",
    "anyone know of",
    "does anyone have",
    "is there a",
    "would pay for",
];

const SOLUTION_REQUEST_PATTERNS: &[&str] = &[
    "what are you using for",
    "what do you use for",
    "how do you handle",
    "recommendations for",
    "best tool for",
    "alternatives to",
];

const SHUTDOWN_PATTERNS: &[&str] = &[
    "shutting down",
    "closing down",
    "discontinuing",
    "end of life",
    "sunsetting",
];

const PIVOT_PATTERNS: &[&str] =
    &["pivoting", "changing direction", "new direction", "shifting focus"];

/// Matches post content against the signal phrase tables, first hit wins.
#[must_use]
pub fn detect_signal_type(title: &str, text: &str) -> RedditSignalType {
    let content = format!("{title} {text}").to_lowercase();
    let hits = |patterns: &[&str]| patterns.iter().any(|p| content.contains(p));

    if hits(PAIN_POINT_PATTERNS) {
        RedditSignalType::PainPoint
    } else if hits(UNMET_NEED_PATTERNS) {
        RedditSignalType::UnmetNeed
    } else if hits(SOLUTION_REQUEST_PATTERNS) {
        RedditSignalType::SolutionRequest
    } else if hits(SHUTDOWN_PATTERNS) {
        RedditSignalType::Shutdown
    } else if hits(PIVOT_PATTERNS) {
        RedditSignalType::Pivot
    } else {
        RedditSignalType::General
    }
}

/// Source-level score 1..=10 from engagement, signal type, and text length.
#[must_use]
pub fn score(post: &RedditPost) -> i32 {
    let mut total: i64 = 5;

    if post.score > 100 {
        total += 2;
    }
    if post.score > 500 {
        total += 2;
    }
    if post.num_comments > 50 {
        total += 2;
    }
    if post.num_comments > 100 {
        total += 1;
    }

    total += match post.signal_type {
        RedditSignalType::Shutdown => 3,
        RedditSignalType::PainPoint | RedditSignalType::UnmetNeed | RedditSignalType::Pivot => 2,
        RedditSignalType::SolutionRequest => 1,
        RedditSignalType::General => 0,
    };

    if post.selftext.len() > 500 {
        total += 1;
    }
    if post.selftext.len() > 1000 {
        total += 1;
    }

    clamp_score(total)
}

/// Maps engagement to a credibility tier for template signals.
#[must_use]
pub fn credibility(post: &RedditPost) -> Credibility {
    if post.score > 500 || post.num_comments > 100 {
        Credibility::High
    } else if post.score > 100 || post.num_comments > 50 {
        Credibility::Medium
    } else {
        Credibility::Low
    }
}

// ---------------------------------------------------------------------------
// Template narrative
// ---------------------------------------------------------------------------

#[must_use]
pub fn headline(post: &RedditPost) -> String {
    format!("{}: {}", post.signal_type.label(), post.title)
}

#[must_use]
pub fn summary(post: &RedditPost) -> String {
    let text = if post.selftext.len() > 300 {
        let cut: String = post.selftext.chars().take(300).collect();
        format!("{cut}...")
    } else {
        post.selftext.clone()
    };
    format!("From r/{} by u/{}: {text}", post.subreddit, post.author)
}

#[must_use]
pub fn why_it_matters(post: &RedditPost) -> String {
    let base = match post.signal_type {
        RedditSignalType::PainPoint => {
            "This pain point represents a potential market opportunity. High engagement suggests others face the same issue."
        }
        RedditSignalType::UnmetNeed => {
            "This unmet need indicates market demand for a solution. Consider if this aligns with your product vision."
        }
        RedditSignalType::SolutionRequest => {
            "Active solution seeking shows immediate market demand. Opportunity to engage or validate product-market fit."
        }
        RedditSignalType::Shutdown => {
            "Service shutdowns create migration opportunities. Users are actively looking for alternatives."
        }
        RedditSignalType::Pivot => {
            "Company pivots signal market shifts or failed hypotheses. Learn from their experience."
        }
        RedditSignalType::General => {
            "High engagement in founder communities indicates relevant market discussion."
        }
    };
    if post.score > 100 {
        format!(
            "{base} {} upvotes and {} comments show strong community interest.",
            post.score, post.num_comments
        )
    } else {
        base.to_owned()
    }
}

#[must_use]
pub fn recommended_action(post: &RedditPost) -> String {
    let action = match post.signal_type {
        RedditSignalType::PainPoint => {
            "Engage in the discussion to understand the pain point deeper. Consider if this is a problem worth solving."
        }
        RedditSignalType::UnmetNeed => {
            "Validate if this need aligns with your product. Reach out to the author to learn more about their requirements."
        }
        RedditSignalType::SolutionRequest => {
            "Share your solution if relevant, or learn what alternatives users are considering."
        }
        RedditSignalType::Shutdown => {
            "Reach out to affected users with migration offers. This is a time-sensitive opportunity."
        }
        RedditSignalType::Pivot => {
            "Analyze why they pivoted. Read the full discussion for market insights."
        }
        RedditSignalType::General => {
            "Read the discussion for market insights and founder perspectives."
        }
    };
    format!("{action} View discussion: {}", post.url)
}

#[must_use]
pub fn tags(post: &RedditPost) -> Vec<String> {
    let mut tags = vec![
        "reddit".to_owned(),
        post.subreddit.clone(),
        post.signal_type.as_str().to_owned(),
    ];
    if post.score > 500 {
        tags.push("viral".to_owned());
    }
    if post.num_comments > 100 {
        tags.push("high_engagement".to_owned());
    }
    let content = format!("{} {}", post.title, post.selftext).to_lowercase();
    for (needle, tag) in [
        ("saas", "saas"),
        ("b2b", "b2b"),
        ("artificial intelligence", "ai"),
        ("startup", "startup"),
        ("founder", "founder"),
        ("marketing", "marketing"),
        ("sales", "sales"),
    ] {
        if content.contains(needle) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

/// Normalizes a post into the common candidate shape.
#[must_use]
pub fn candidate(post: &RedditPost) -> Candidate {
    #[allow(clippy::cast_possible_truncation)]
    let secs = post.created_utc as i64;
    Candidate {
        title: post.title.clone(),
        description: post.selftext.clone(),
        url: post.url.clone(),
        discussion_url: post.url.clone(),
        engagement: EngagementMetrics {
            primary: post.score,
            secondary: post.num_comments,
        },
        timestamp: chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(chrono::Utc::now),
        topics: vec![format!("r/{}", post.subreddit)],
        authors: vec![CandidateAuthor {
            name: post.author.clone(),
            handle: Some(format!("u/{}", post.author)),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, text: &str, score: i64, comments: i64) -> RedditPost {
        RedditPost {
            id: "abc123".to_owned(),
            title: title.to_owned(),
            selftext: text.to_owned(),
            author: "builder".to_owned(),
            subreddit: "startups".to_owned(),
            url: "https://www.reddit.com/r/startups/comments/abc123/x/".to_owned(),
            score,
            num_comments: comments,
            created_utc: 1_756_500_000.0,
            signal_type: detect_signal_type(title, text),
        }
    }

    #[test]
    fn detects_pain_point_before_other_types() {
        let p = post(
            "Struggling with churn",
            "We keep losing customers and I wish there was a fix",
            10,
            2,
        );
        assert_eq!(p.signal_type, RedditSignalType::PainPoint);
    }

    #[test]
    fn shutdown_gets_the_largest_type_bonus() {
        let shutdown = post("We are shutting down", &"x".repeat(60), 10, 2);
        let request = post("Best tool for invoicing?", &"x".repeat(60), 10, 2);
        assert_eq!(shutdown.signal_type, RedditSignalType::Shutdown);
        assert_eq!(score(&shutdown), 8);
        assert_eq!(score(&request), 6);
    }

    #[test]
    fn general_posts_need_heavy_engagement() {
        let quiet = RawPost {
            id: "q".to_owned(),
            title: "Weekly thread".to_owned(),
            selftext: "x".repeat(60),
            author: "mod".to_owned(),
            subreddit: "startups".to_owned(),
            permalink: "/r/startups/comments/q/x/".to_owned(),
            score: 40,
            num_comments: 5,
            created_utc: 0.0,
            removed_by_category: None,
        };
        assert!(keep_post(quiet, "https://www.reddit.com").is_none());
    }

    #[test]
    fn deleted_and_short_posts_are_dropped() {
        let mut deleted = RawPost {
            id: "d".to_owned(),
            title: "Struggling with ads".to_owned(),
            selftext: "x".repeat(60),
            author: "[deleted]".to_owned(),
            subreddit: "startups".to_owned(),
            permalink: "/r/startups/comments/d/x/".to_owned(),
            score: 900,
            num_comments: 50,
            created_utc: 0.0,
            removed_by_category: None,
        };
        assert!(keep_post(deleted.clone(), "https://www.reddit.com").is_none());
        deleted.author = "someone".to_owned();
        deleted.selftext = "short".to_owned();
        assert!(keep_post(deleted, "https://www.reddit.com").is_none());
    }

    #[test]
    fn summary_truncates_long_selftext() {
        let p = post("Struggling with growth", &"y".repeat(400), 10, 2);
        let s = summary(&p);
        assert!(s.starts_with("From r/startups by u/builder: "));
        assert!(s.ends_with("..."));
    }

    #[test]
    fn tags_add_engagement_and_content_markers() {
        let p = post(
            "Struggling with our SaaS startup marketing",
            &"z".repeat(60),
            600,
            150,
        );
        let tags = tags(&p);
        assert!(tags.contains(&"viral".to_owned()));
        assert!(tags.contains(&"high_engagement".to_owned()));
        assert!(tags.contains(&"saas".to_owned()));
        assert!(tags.contains(&"startup".to_owned()));
        assert!(tags.contains(&"marketing".to_owned()));
    }

    #[test]
    fn viral_posts_are_high_credibility() {
        assert_eq!(
            credibility(&post("Struggling with x", &"x".repeat(60), 600, 10)),
            Credibility::High
        );
        assert_eq!(
            credibility(&post("Struggling with x", &"x".repeat(60), 150, 10)),
            Credibility::Medium
        );
        assert_eq!(
            credibility(&post("Struggling with x", &"x".repeat(60), 10, 2)),
            Credibility::Low
        );
    }
}
