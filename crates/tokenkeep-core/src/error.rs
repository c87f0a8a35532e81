use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for session and identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length for endpoint response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum Error {
    /// The identity or profile endpoint rejected the request: bad
    /// credentials, duplicate login, expired or revoked token.
    #[error("authentication rejected ({status}): {message}")]
    AuthRejected { status: StatusCode, message: String },

    /// An operation requiring a credential ran against an empty store.
    #[error("no active session")]
    NoSession,

    /// Network/connectivity failure, distinct from a rejection. Eligible
    /// for caller-level retry.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-auth failure from the profile endpoint (not found, server error).
    #[error("request failed ({status}): {message}")]
    RequestFailed { status: StatusCode, message: String },

    /// A success response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A birth date that is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid birth date: {0}")]
    InvalidDate(String),

    /// Credential store or configuration I/O failure.
    #[error("storage error: {0}")]
    Io(String),
}

impl Error {
    /// Truncate a response body to avoid carrying excessive data in errors
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", truncated, body.len())
        }
    }

    /// An identity-route failure. Any non-success from the auth routes is
    /// a rejection surfaced to the caller.
    pub(crate) fn rejected(status: StatusCode, body: &str) -> Self {
        Error::AuthRejected {
            status,
            message: Self::truncate_body(body),
        }
    }

    /// Classify a profile-route failure status.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::rejected(status, body),
            _ => Error::RequestFailed {
                status,
                message: Self::truncate_body(body),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_rejected() {
        let err = Error::from_status(StatusCode::UNAUTHORIZED, "token expired");
        assert!(matches!(err, Error::AuthRejected { .. }));

        let err = Error::from_status(StatusCode::FORBIDDEN, "bad token type");
        assert!(matches!(err, Error::AuthRejected { .. }));
    }

    #[test]
    fn other_statuses_map_to_request_failed() {
        let err = Error::from_status(StatusCode::NOT_FOUND, "user not found");
        assert!(matches!(err, Error::RequestFailed { .. }));

        let err = Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, Error::RequestFailed { .. }));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = Error::rejected(StatusCode::BAD_REQUEST, &body);
        match err {
            Error::AuthRejected { message, .. } => {
                assert!(message.len() < 600);
                assert!(message.contains("2000 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
