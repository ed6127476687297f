use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
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
}

impl FeedError {
    /// Whether this failure is a whole-payload parse problem rather than a
    /// transport problem. Sync jobs treat unparseable payloads as an empty
    /// feed; transport failures stay hard errors.
    #[must_use]
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, FeedError::Deserialize { .. })
    }
}
