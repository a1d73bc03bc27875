//! Failure classification for backend round trips.

use thiserror::Error;

/// Shown for any transport-level failure.
pub const NETWORK_MESSAGE: &str = "Unable to connect to server. Please check your connection.";

/// A classified failure of one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend could not be reached or the connection broke.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend rejected the request (4xx).
    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Client {
        status: u16,
        message: Option<String>,
    },

    /// The backend failed (5xx or any other unexpected status).
    #[error("Server error ({status})")]
    Server { status: u16 },

    /// A success status with a body we could not decode.
    #[error("Unexpected response: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Classify a non-success status, pulling a message out of the body
    /// when the server sent one.
    pub fn from_status(status: u16, body: &str) -> Self {
        if (400..500).contains(&status) {
            ApiError::Client {
                status,
                message: extract_message(body),
            }
        } else {
            ApiError::Server { status }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } | ApiError::Server { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Text for a user-facing notice.
    ///
    /// Network failures always get the connection hint; client errors
    /// prefer the server's own message; everything else gets `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Network { .. } => NETWORK_MESSAGE.to_string(),
            ApiError::Client {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// The backend answers errors either as plain text or as JSON carrying
/// `message` or `error`.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Object(map) => ["message", "error"]
                .iter()
                .filter_map(|key| map.get(*key))
                .filter_map(|v| v.as_str())
                .find(|s| !s.trim().is_empty())
                .map(str::to_string),
            _ => None,
        };
    }

    if trimmed.starts_with('<') {
        // HTML error pages carry nothing worth showing.
        return None;
    }

    Some(trimmed.to_string())
}
