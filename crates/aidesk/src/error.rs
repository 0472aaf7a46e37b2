//! Error taxonomy for remote API calls.
//!
//! The retry wrapper only re-dials transient transport failures; API-level
//! rejections and malformed bodies surface immediately.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("transport error talking to {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed response from {endpoint}: {message}")]
    MalformedBody { endpoint: String, message: String },
}

impl LlmError {
    /// Transient errors are worth retrying; everything else is either a
    /// server-side rejection or a bug, and retrying would not help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout { .. } | LlmError::Connect { .. } | LlmError::Transport { .. }
        )
    }

    /// Classify a reqwest error against the endpoint it was sent to.
    pub fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_connect() {
            LlmError::Connect {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            LlmError::Api {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            // Resets and truncated bodies mid-transfer land here.
            LlmError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}
