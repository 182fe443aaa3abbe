use thiserror::Error;

/// Errors returned by the entity extraction gate and its Claude client.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Claude API returned a non-success status we do not retry.
    #[error("Claude API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The model's text output contained no parseable JSON, even after
    /// deterministic repair.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The parsed JSON did not match the expected analysis shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
