use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required credential or setting is missing. Surfaces as a 400 at
    /// the API layer rather than a 500.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Db(#[from] sigdesk_db::DbError),

    #[error(transparent)]
    Source(#[from] sigdesk_sources::SourceError),

    #[error(transparent)]
    Analyze(#[from] sigdesk_analyze::AnalyzeError),
}
