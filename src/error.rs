// Error types for the devdash data layer.
// Covers upstream API errors, JSON decoding, and response validation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("upstream API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
