use thiserror::Error;

/// Errors returned by source fetchers.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API returned a non-success status.
    #[error("{source_name} API error ({status}): {body}")]
    Api {
        source_name: &'static str,
        status: u16,
        body: String,
    },

    /// A source that needs a credential was invoked without one.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
