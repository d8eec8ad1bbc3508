use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("already applied to this job")]
    AlreadyApplied,

    #[error("job is closed for applications")]
    JobClosed,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    #[error("{0}")]
    Internal(String),
}

/// A single-field `ValidationError`, for rule violations detected outside
/// the validator derive (unknown role, duplicate email, bad reset code).
pub fn field_error(field: &'static str, message: &'static str) -> Error {
    let mut errors = validator::ValidationErrors::new();
    let mut violation = validator::ValidationError::new(field);
    violation.message = Some(message.into());
    errors.add(field.into(), violation);
    Error::Validation(errors)
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_)
            | Error::AlreadyApplied
            | Error::JobClosed
            | Error::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Error::Store(_)
            | Error::Migrate(_)
            | Error::Io(_)
            | Error::InvalidHeader(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Error::Validation(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, violations) in errors.field_errors() {
                    let messages: Vec<String> = violations
                        .iter()
                        .map(|v| {
                            v.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| v.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), json!(messages));
                }
                json!({"error": "validation failed", "fields": fields})
            }
            // store internals stay in the logs, not the response body
            Error::Store(_)
            | Error::Migrate(_)
            | Error::Io(_)
            | Error::InvalidHeader(_)
            | Error::Internal(_) => {
                tracing::error!("request failed: {}", &self);
                json!({"error": "internal server error"})
            }
            other => json!({"error": other.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationErrors;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(Error::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Forbidden("job belongs to another college").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Error::NotFound("job").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::AlreadyApplied.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::JobClosed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidStatus("archived".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Validation(ValidationErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_keep_details_out_of_the_body() {
        let err = Error::Store(sqlx::Error::PoolClosed);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
