use reqwest::StatusCode;

/// Errors raised by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never completed.
    #[error("Failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expected.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status of a non-2xx response.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body text of a non-2xx response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
