//! Error taxonomy of the transport client.

use reqwest::StatusCode;

/// Errors returned by [`HttpClient`](super::HttpClient).
///
/// Callers tell `404`, `409` and friends apart by matching on
/// [`HttpError::Status`] or by comparing the rendered status line.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The base URL is not an absolute URI with a scheme and a host.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A header name or value cannot be written to the wire.
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    /// The exchange did not complete: connect, DNS, timeout or body read.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The final response carried a status outside the verb's success set.
    #[error("{}", status_line(.0))]
    Status(StatusCode),
}

impl HttpError {
    /// Returns the HTTP status for [`HttpError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status(status) => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        HttpError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Renders a status as its status line, e.g. `404 Not Found`.
///
/// Codes without a standard reason phrase render as the bare number.
pub fn status_line(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_is_status_line() {
        let cases = [
            (StatusCode::NOT_FOUND, "404 Not Found"),
            (StatusCode::CONFLICT, "409 Conflict"),
            (StatusCode::BAD_REQUEST, "400 Bad Request"),
            (StatusCode::OK, "200 OK"),
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error"),
        ];
        for (status, expected) in cases {
            assert_eq!(HttpError::Status(status).to_string(), expected);
        }
    }

    #[test]
    fn test_status_line_without_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(status_line(&status), "599");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(
            HttpError::Status(StatusCode::CONFLICT).status(),
            Some(StatusCode::CONFLICT)
        );
        let err = HttpError::invalid_url("http//foo", "relative URL without a base");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("http//foo"));
    }
}
