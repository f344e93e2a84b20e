//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(boatyard_core::Error),
}

impl From<boatyard_core::Error> for ApiError {
    fn from(err: boatyard_core::Error) -> Self {
        match err {
            boatyard_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            boatyard_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    error = %err,
                    fatal_store_error = err.is_fatal_store_error(),
                    "Request failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boatyard_core::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (Error::Store("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Config("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_invalid_input_message_is_passed_through() {
        let err = ApiError::from(Error::InvalidInput("Export data is null".into()));
        assert_eq!(err.to_string(), "Export data is null");
    }
}
