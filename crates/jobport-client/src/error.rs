//! Client error types.

use serde::Deserialize;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with its error envelope.
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct EnvelopeBody {
    error: Option<String>,
    code: Option<String>,
}

impl ClientError {
    /// Decode an error envelope, tolerating bodies that are not one.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<EnvelopeBody>(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|b| b.code.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let message = parsed
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        ClientError::Api {
            status,
            code,
            message,
        }
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
