use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod score;
pub mod types;
pub mod validate;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use score::{clamp_score, clamp_score_f64};
pub use types::{
    Candidate, CandidateAuthor, CompanyCandidate, Credibility, EngagementMetrics, PersonCandidate,
    RefinedSignal, SignalStatus, SourceKind, UserAction,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
