//! Source clients and scoring for the signal pipeline.
//!
//! Each source module exposes a client (where the source has a network
//! API), a `is_signal_worthy`-style filter, a `score` function in the 1..=10
//! range, and a `candidate` normalizer producing the shared
//! [`sigdesk_core::Candidate`] shape the analysis layer consumes.

pub mod error;
pub mod github;
pub mod hackernews;
pub mod jobs;
pub mod producthunt;
pub mod reddit;
pub(crate) mod retry;
pub mod yc;

pub use error::SourceError;
pub use github::{GithubClient, TrendingRepo};
pub use hackernews::{HnClient, HnStory};
pub use jobs::{HiringSignal, HiringSignalType, JobPosting};
pub use producthunt::{PhClient, PhPost};
pub use reddit::{RedditClient, RedditPost, RedditSignalType};
pub use yc::YcCompany;

use sigdesk_core::AppConfig;

/// HTTP fetch settings shared by every source client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "sigdesk/0.1".to_owned(),
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.fetch_user_agent.clone(),
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_retry_backoff_base_secs * 1000,
        }
    }
}
