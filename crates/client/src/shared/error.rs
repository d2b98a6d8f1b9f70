use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message shown for every 403, whatever the backend said
pub const FORBIDDEN_MESSAGE: &str = "No tienes permisos para realizar esta acción";

/// Errors surfaced to the UI layer.
///
/// `Display` is the single string the views show to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Session is gone: refresh failed or there was nothing to refresh with.
    /// Tokens are already cleared and `AuthEvent::SessionExpired` published.
    #[error("Authentication failed")]
    Unauthenticated,

    #[error("{}", FORBIDDEN_MESSAGE)]
    Forbidden,

    /// Any other non-2xx answer
    #[error("{message}")]
    Http {
        status: u16,
        status_text: String,
        message: String,
    },

    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to build query string: {0}")]
    Query(#[from] serde_qs::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-2xx, non-401 answer from its status and raw body.
    ///
    /// The body is parsed best-effort; a missing or malformed body falls back
    /// to the generic message and never hides the status.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::FORBIDDEN {
            return ApiError::Forbidden;
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        ApiError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            message,
        }
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthenticated => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::Query(_) => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_taken_from_body() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"UUID del usuario inválido"}"#.as_bytes(),
        );
        assert_eq!(err.to_string(), "UUID del usuario inválido");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_generic_message_on_bad_body() {
        let bodies: [&[u8]; 4] = [
            b"",
            b"<html>oops</html>",
            br#"{"detail":1}"#,
            br#"{"message":""}"#,
        ];
        for body in bodies {
            let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(err.to_string(), "HTTP error! status: 500");
            match err {
                ApiError::Http {
                    status,
                    status_text,
                    ..
                } => {
                    assert_eq!(status, 500);
                    assert_eq!(status_text, "Internal Server Error");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_forbidden_ignores_body() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, br#"{"message":"nope"}"#);
        assert!(matches!(err, ApiError::Forbidden));
        assert_eq!(err.to_string(), FORBIDDEN_MESSAGE);
    }
}
