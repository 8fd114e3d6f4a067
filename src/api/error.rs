//! API error taxonomy.
//!
//! The platform only guarantees HTTP status classes, so errors are keyed
//! by status. Each endpoint supplies its own wording through an
//! [`ErrorMessages`] table.

use thiserror::Error;

/// Errors surfaced by API calls. `Display` is the operator-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 401.
    #[error("{0}")]
    Unauthorized(String),
    /// 403.
    #[error("{0}")]
    Forbidden(String),
    /// 404.
    #[error("{0}")]
    NotFound(String),
    /// 400.
    #[error("{0}")]
    BadRequest(String),
    /// 409.
    #[error("{0}")]
    Conflict(String),
    /// 422.
    #[error("{0}")]
    Unprocessable(String),
    /// 429.
    #[error("{0}")]
    RateLimited(String),
    /// 500.
    #[error("{0}")]
    Server(String),
    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// No response was received.
    #[error("{0}")]
    Network(String),
    /// A success response whose body could not be decoded.
    #[error("unexpected response from server: {0}")]
    Decode(String),
    /// The call needs a logged-in session.
    #[error("Not logged in. Please login first.")]
    NotAuthenticated,
    /// The client could not be constructed.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::Conflict(_) => Some(409),
            Self::Unprocessable(_) => Some(422),
            Self::RateLimited(_) => Some(429),
            Self::Server(_) => Some(500),
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::NotAuthenticated | Self::Config(_) => None,
        }
    }

    /// Builds the error for a non-success status.
    pub fn from_status(
        status: u16,
        server_message: Option<String>,
        messages: &ErrorMessages,
    ) -> Self {
        let server_message = server_message.filter(|m| !m.trim().is_empty());
        let pick = |wording: Option<Wording>| -> String {
            match wording {
                Some(wording) => wording.resolve(server_message.clone()),
                None => Wording::PreferServer(messages.fallback).resolve(server_message.clone()),
            }
        };

        match status {
            401 => Self::Unauthorized(pick(messages.unauthorized)),
            403 => Self::Forbidden(pick(messages.forbidden)),
            404 => Self::NotFound(pick(messages.not_found)),
            400 => Self::BadRequest(pick(messages.bad_request)),
            409 => Self::Conflict(pick(messages.conflict)),
            422 => Self::Unprocessable(pick(messages.unprocessable)),
            429 => Self::RateLimited(pick(messages.rate_limited)),
            500 => Self::Server(pick(messages.server)),
            status => Self::Status {
                status,
                message: pick(None),
            },
        }
    }

    /// Builds the error for a request that got no response.
    pub fn network(messages: &ErrorMessages) -> Self {
        Self::Network(messages.network.to_string())
    }
}

/// How the message for one status is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wording {
    /// Always this text.
    Fixed(&'static str),
    /// The server's message if it sent one, else this text.
    PreferServer(&'static str),
}

impl Wording {
    fn resolve(self, server_message: Option<String>) -> String {
        match self {
            Self::Fixed(text) => text.to_string(),
            Self::PreferServer(text) => server_message.unwrap_or_else(|| text.to_string()),
        }
    }
}

/// Per-endpoint wording. Unlisted statuses use `fallback`, preferring the
/// server's message.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMessages {
    pub unauthorized: Option<Wording>,
    pub forbidden: Option<Wording>,
    pub not_found: Option<Wording>,
    pub bad_request: Option<Wording>,
    pub conflict: Option<Wording>,
    pub unprocessable: Option<Wording>,
    pub rate_limited: Option<Wording>,
    pub server: Option<Wording>,
    pub fallback: &'static str,
    pub network: &'static str,
}

impl ErrorMessages {
    /// Table with only a fallback; every status prefers the server message.
    pub const fn fallback_only(fallback: &'static str) -> Self {
        Self {
            unauthorized: None,
            forbidden: None,
            not_found: None,
            bad_request: None,
            conflict: None,
            unprocessable: None,
            rate_limited: None,
            server: None,
            fallback,
            network: fallback,
        }
    }

    /// Wording for staff-privileged endpoints such as ticket verification.
    pub const STAFF: Self = Self {
        unauthorized: Some(Wording::Fixed("Unauthorized. Please login as admin.")),
        forbidden: Some(Wording::Fixed("Access denied. Admin privileges required.")),
        not_found: Some(Wording::PreferServer("Resource not found.")),
        bad_request: Some(Wording::PreferServer("Invalid request data.")),
        server: Some(Wording::Fixed("Server error. Please try again later.")),
        network: "Network error. Please check your connection.",
        ..Self::fallback_only("Request failed.")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_fixed_messages_ignore_server_text() {
        let err = ApiError::from_status(401, Some("jwt expired".into()), &ErrorMessages::STAFF);
        assert_eq!(err, ApiError::Unauthorized("Unauthorized. Please login as admin.".into()));

        let err = ApiError::from_status(500, Some("stack trace".into()), &ErrorMessages::STAFF);
        assert_eq!(err.to_string(), "Server error. Please try again later.");
    }

    #[test]
    fn test_staff_prefers_server_message() {
        let err =
            ApiError::from_status(404, Some("Ticket not found".into()), &ErrorMessages::STAFF);
        assert_eq!(err.to_string(), "Ticket not found");
        assert_eq!(err.status(), Some(404));

        let err = ApiError::from_status(404, None, &ErrorMessages::STAFF);
        assert_eq!(err.to_string(), "Resource not found.");

        let err = ApiError::from_status(400, Some("   ".into()), &ErrorMessages::STAFF);
        assert_eq!(err.to_string(), "Invalid request data.");
    }

    #[test]
    fn test_unlisted_status_uses_fallback() {
        let err = ApiError::from_status(502, None, &ErrorMessages::STAFF);
        assert_eq!(
            err,
            ApiError::Status {
                status: 502,
                message: "Request failed.".into()
            }
        );

        let err =
            ApiError::from_status(409, Some("Already checked in".into()), &ErrorMessages::STAFF);
        assert_eq!(err, ApiError::Conflict("Already checked in".into()));
    }

    #[test]
    fn test_network_error_text() {
        let err = ApiError::network(&ErrorMessages::STAFF);
        assert_eq!(err.to_string(), "Network error. Please check your connection.");
        assert_eq!(err.status(), None);
    }
}
