//! Error Kind - Classification of errors
//!
//! Every failure in the workspace is bucketed into one [`ErrorKind`],
//! which decides the HTTP status the presentation layer answers with.

use serde::Serialize;

/// Error classification mapped onto HTTP status codes
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::BadGateway.status_code(), 502);
/// assert_eq!(ErrorKind::NotFound.as_str(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - malformed or invalid input
    BadRequest,
    /// 401 - no valid identity
    Unauthorized,
    /// 403 - identity lacks the required role
    Forbidden,
    /// 404 - record does not exist
    NotFound,
    /// 409 - conflicts with existing state
    Conflict,
    /// 422 - well-formed but rejected by validation rules
    UnprocessableEntity,
    /// 429 - throttled by the backend
    TooManyRequests,
    /// 500 - bug or unexpected state on our side
    InternalServerError,
    /// 502 - the hosted backend answered with an error
    BadGateway,
    /// 503 - the hosted backend could not be reached
    ServiceUnavailable,
    /// 504 - the hosted backend did not answer in time
    GatewayTimeout,
}

impl ErrorKind {
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::GatewayTimeout => 504,
        }
    }

    /// Standard reason phrase
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::BadGateway => "Bad Gateway",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
            ErrorKind::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// Map a status code returned by the backend onto a kind.
    ///
    /// Server-side failures of the backend become `BadGateway`: from the
    /// caller's point of view it is an upstream failure, not ours.
    pub const fn from_upstream_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            422 => ErrorKind::UnprocessableEntity,
            429 => ErrorKind::TooManyRequests,
            503 => ErrorKind::ServiceUnavailable,
            504 => ErrorKind::GatewayTimeout,
            400..=499 => ErrorKind::BadRequest,
            _ => ErrorKind::BadGateway,
        }
    }

    /// 5xx kinds; these should be logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::UnprocessableEntity.status_code(), 422);
        assert_eq!(ErrorKind::BadGateway.status_code(), 502);
        assert_eq!(ErrorKind::GatewayTimeout.status_code(), 504);
    }

    #[test]
    fn test_from_upstream_status() {
        assert_eq!(ErrorKind::from_upstream_status(400), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::from_upstream_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_upstream_status(418), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::from_upstream_status(500), ErrorKind::BadGateway);
        assert_eq!(
            ErrorKind::from_upstream_status(503),
            ErrorKind::ServiceUnavailable
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(!ErrorKind::NotFound.is_server_error());
        assert!(ErrorKind::BadGateway.is_server_error());
        assert!(!ErrorKind::ServiceUnavailable.is_client_error());
    }
}
