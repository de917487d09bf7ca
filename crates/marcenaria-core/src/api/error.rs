use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Payload rejected, either locally before transmission (no status)
    /// or by the server (400, 409, 422).
    #[error("Validation failed: {message}")]
    Validation {
        status: Option<u16>,
        message: String,
    },

    #[error("Unauthorized - session token missing or rejected")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Server-side failure, an unexpected status, or a success response
    /// whose body did not parse.
    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Cut on a char boundary at or below the limit.
        let cut = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    /// Local validation failure; never carries an HTTP status.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            status: None,
            message: message.into(),
        }
    }

    /// A response that arrived but could not be decoded into the
    /// expected shape.
    pub(crate) fn malformed(status: reqwest::StatusCode, err: &serde_json::Error) -> Self {
        ApiError::Server {
            status: status.as_u16(),
            message: format!("response body did not match the expected shape: {err}"),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::truncate_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::Validation {
                status: Some(status.as_u16()),
                message,
            },
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(message),
            code => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    /// The HTTP status behind this error, when a response was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { status, .. } => *status,
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "missing field"),
            ApiError::Validation {
                status: Some(400),
                ..
            }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "email taken"),
            ApiError::Validation {
                status: Some(409),
                ..
            }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad zip"),
            ApiError::Validation {
                status: Some(422),
                ..
            }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "no such user"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::Server { status: 500, .. }
        ));
        // Statuses outside the contract land in the server bucket.
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::Server { status: 403, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::Server { status: 418, .. }
        ));
    }

    #[test]
    fn test_http_status_preserved() {
        assert_eq!(
            ApiError::from_status(StatusCode::CONFLICT, "").http_status(),
            Some(409)
        );
        assert_eq!(ApiError::Unauthorized.http_status(), Some(401));
        assert_eq!(ApiError::validation("name is required").http_status(), None);
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.to_string();
        assert!(message.contains("truncated, 2000 total bytes"));
        assert!(message.len() < 700);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 2-byte chars straddle the 500-byte limit.
        let body = "é".repeat(400);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_short_body_kept_verbatim() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(
            err.to_string(),
            "Server error (status 500): boom"
        );
    }
}
