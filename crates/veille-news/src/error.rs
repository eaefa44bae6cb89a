use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The sentiment model could not be loaded or failed during inference.
    #[error("model error: {0}")]
    Model(String),

    #[error("invalid search parameters: {0}")]
    InvalidParams(String),
}
