//! Product Hunt source: GraphQL client, scorer, enrichment metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sigdesk_core::{Candidate, CandidateAuthor, EngagementMetrics};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::FetchConfig;

const DEFAULT_BASE_URL: &str = "https://api.producthunt.com";

const POSTS_QUERY: &str = "query { posts(order: VOTES) { edges { node { \
     id name tagline description votesCount commentsCount createdAt website url \
     topics { edges { node { name } } } \
     makers { name username twitterUsername } } } } }";

/// One launch from the GraphQL posts feed.
#[derive(Debug, Clone)]
pub struct PhPost {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub votes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub website: String,
    pub url: String,
    pub topics: Vec<String>,
    pub makers: Vec<PhMaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhMaker {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "twitterUsername")]
    pub twitter_username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    data: Option<PostsData>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Edges<PostNode>,
}

#[derive(Debug, Deserialize)]
struct Edges<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    votes_count: i64,
    #[serde(default)]
    comments_count: i64,
    created_at: DateTime<Utc>,
    #[serde(default)]
    website: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    topics: Option<Edges<TopicNode>>,
    #[serde(default)]
    makers: Vec<PhMaker>,
}

#[derive(Debug, Deserialize)]
struct TopicNode {
    name: String,
}

/// Client for the Product Hunt GraphQL API. Requires a developer token.
pub struct PhClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PhClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(token: &str, config: &FetchConfig) -> Result<Self, SourceError> {
        Self::with_base_url(token, config, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        token: &str,
        config: &FetchConfig,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Fetches today's posts ordered by votes.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, API, or parse failure.
    pub async fn posts(&self) -> Result<Vec<PhPost>, SourceError> {
        let url = format!("{}/v2/api/graphql", self.base_url);
        let body = serde_json::json!({ "query": POSTS_QUERY });

        let envelope: GraphqlEnvelope =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::Api {
                        source_name: "producthunt",
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    });
                }
                let text = response.text().await?;
                serde_json::from_str(&text).map_err(|e| SourceError::Deserialize {
                    context: "posts query".to_owned(),
                    source: e,
                })
            })
            .await?;

        let data = envelope.data.ok_or(SourceError::Api {
            source_name: "producthunt",
            status: 200,
            body: "GraphQL response had no data".to_owned(),
        })?;

        Ok(data.posts.edges.into_iter().map(|e| flatten(e.node)).collect())
    }
}

fn flatten(node: PostNode) -> PhPost {
    PhPost {
        id: node.id,
        name: node.name,
        tagline: node.tagline,
        description: node.description,
        votes_count: node.votes_count,
        comments_count: node.comments_count,
        created_at: node.created_at,
        website: node.website,
        url: node.url,
        topics: node
            .topics
            .map(|t| t.edges.into_iter().map(|e| e.node.name).collect())
            .unwrap_or_default(),
        makers: node.makers,
    }
}

// ---------------------------------------------------------------------------
// Scoring and normalization
// ---------------------------------------------------------------------------

/// Source-level score 0..=10 from votes, comments, and maker signals.
#[must_use]
pub fn score(post: &PhPost) -> i32 {
    let mut total = 5i64;

    if post.votes_count >= 500 {
        total += 3;
    } else if post.votes_count >= 200 {
        total += 2;
    } else if post.votes_count >= 50 {
        total += 1;
    }

    if post.comments_count >= 100 {
        total += 2;
    } else if post.comments_count >= 30 {
        total += 1;
    }

    if post.makers.iter().any(|m| m.twitter_username.is_some()) {
        total += 1;
    }
    if post.makers.len() > 2 {
        total += 1;
    }

    sigdesk_core::clamp_score(total)
}

/// Enrichment metadata stored alongside the signal.
#[must_use]
pub fn source_meta(post: &PhPost) -> serde_json::Value {
    serde_json::json!({
        "votes": post.votes_count,
        "comments": post.comments_count,
        "tagline": post.tagline,
        "topics": post.topics,
        "makers": post.makers.iter().map(|m| m.username.clone()).collect::<Vec<_>>(),
    })
}

/// Normalizes a post into the common candidate shape.
#[must_use]
pub fn candidate(post: &PhPost) -> Candidate {
    let description = if post.description.is_empty() {
        post.tagline.clone()
    } else {
        post.description.clone()
    };

    Candidate {
        title: post.name.clone(),
        description,
        url: if post.website.is_empty() {
            post.url.clone()
        } else {
            post.website.clone()
        },
        discussion_url: post.url.clone(),
        engagement: EngagementMetrics {
            primary: post.votes_count,
            secondary: post.comments_count,
        },
        timestamp: post.created_at,
        topics: post.topics.clone(),
        authors: post
            .makers
            .iter()
            .map(|m| CandidateAuthor {
                name: m.name.clone(),
                handle: Some(m.username.clone()),
            })
            .collect(),
    }
}
