//! API client errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
///
/// The `Display` output of [`ApiError::Rejected`] is directly user-facing:
/// it prefers the server-supplied message and falls back to a generic one.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected {
        /// HTTP status of the rejected request.
        status: StatusCode,

        /// Server-supplied message, or a generic fallback.
        message: String,
    },
}

impl ApiError {
    /// Builds a [`ApiError::Rejected`] preferring the server's message.
    #[must_use]
    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Self::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_prefers_server_message() {
        let error = ApiError::rejected(
            StatusCode::BAD_REQUEST,
            Some("the cart is empty".to_string()),
        );

        assert_eq!(error.to_string(), "the cart is empty");
    }

    #[test]
    fn rejected_falls_back_to_generic_message() {
        let error = ApiError::rejected(StatusCode::INTERNAL_SERVER_ERROR, None);

        assert_eq!(
            error.to_string(),
            "request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn blank_server_message_is_treated_as_absent() {
        let error = ApiError::rejected(StatusCode::BAD_GATEWAY, Some("   ".to_string()));

        assert_eq!(error.to_string(), "request failed with status 502 Bad Gateway");
    }
}
