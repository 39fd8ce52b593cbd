use thiserror::Error;

/// Failures surfaced by [`crate::GuriClient`]. There is no fallback data: every
/// failed call is an error.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response (or a 2xx envelope with `success: false`)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 401 from the server; the session has already been reset to anonymous
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response carried no data")]
    MissingData,

    #[error("Login required")]
    NotAuthenticated,

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status behind the error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
