//! Request error taxonomy.
//!
//! Every handler returns `Result<Reply, ApiError>`. Errors are rendered in
//! the same envelope and format as successes (see [`crate::response`]), so
//! `ApiError` does not implement `IntoResponse` itself.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::Envelope;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// No row matches the request.
    #[error("{0}")]
    NotFound(String),

    /// HTTP method not supported by the resource.
    #[error("Metodo non consentito")]
    MethodNotAllowed,

    /// The write would break a table constraint.
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Store(RepositoryError),

    /// Any other server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log a server error and send it to Sentry. Client errors are ignored.
    pub fn report(&self) {
        if !self.status().is_server_error() {
            return;
        }
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );
    }

    /// Build the error envelope.
    ///
    /// Server errors get a generic message; their detail goes into the
    /// `error` field only when `expose_detail` is set.
    #[must_use]
    pub fn to_envelope(&self, expose_detail: bool) -> Envelope {
        match self {
            Self::Store(err) => {
                let envelope = Envelope::error("Errore del database");
                if expose_detail {
                    envelope.with_error_detail(err.to_string())
                } else {
                    envelope
                }
            }
            Self::Internal(detail) => {
                let envelope = Envelope::error("Errore del server");
                if expose_detail {
                    envelope.with_error_detail(detail.clone())
                } else {
                    envelope
                }
            }
            _ => Envelope::error(self.to_string()),
        }
    }
}

/// Repository outcomes that are client errors keep their meaning; the rest
/// are store failures.
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::NotFound => Self::NotFound("Utente non trovato".to_owned()),
            RepositoryError::Database(_) => Self::Store(err),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::validation("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Conflict("x".to_owned()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("x".to_owned()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(RepositoryError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_mapping() {
        let conflict: ApiError = RepositoryError::Conflict("dup".to_owned()).into();
        assert!(matches!(conflict, ApiError::Conflict(ref m) if m == "dup"));

        let missing: ApiError = RepositoryError::NotFound.into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let db: ApiError = RepositoryError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(db, ApiError::Store(_)));
    }

    #[test]
    fn test_store_detail_hidden_by_default() {
        let err = ApiError::Store(RepositoryError::Database(sqlx::Error::PoolTimedOut));

        let hidden = serde_json::to_value(err.to_envelope(false)).unwrap_or_default();
        assert_eq!(hidden["message"], "Errore del database");
        assert!(hidden.get("error").is_none());

        let shown = serde_json::to_value(err.to_envelope(true)).unwrap_or_default();
        assert!(shown["error"].as_str().is_some_and(|s| s.contains("pool timed out")));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let value =
            serde_json::to_value(ApiError::not_found("Ordine non trovato").to_envelope(false))
                .unwrap_or_default();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "Ordine non trovato");
    }
}
