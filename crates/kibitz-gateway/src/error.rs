// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`KibitzError`] to JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kibitz_core::KibitzError;
use serde::Serialize;

/// `{"success": false, "error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Handler error carrying the status it renders with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(err: &KibitzError) -> StatusCode {
    match err {
        KibitzError::Config(_)
        | KibitzError::Settings(_)
        | KibitzError::InvalidSelection { .. }
        | KibitzError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        KibitzError::NotFound { .. } => StatusCode::NOT_FOUND,
        KibitzError::Platform { .. } | KibitzError::Generation { .. } => StatusCode::BAD_GATEWAY,
        KibitzError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        KibitzError::Storage { .. } | KibitzError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<KibitzError> for ApiError {
    fn from(err: KibitzError) -> Self {
        Self {
            status: status_for(&err),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "operator request failed");
        }
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_statuses() {
        let cases = [
            (KibitzError::Settings("x".into()), StatusCode::BAD_REQUEST),
            (
                KibitzError::InvalidSelection { index: 9, len: 3 },
                StatusCode::BAD_REQUEST,
            ),
            (
                KibitzError::InvalidTransition {
                    id: "1".into(),
                    reason: "already sent".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (KibitzError::NotFound { id: "1".into() }, StatusCode::NOT_FOUND),
            (KibitzError::platform("down"), StatusCode::BAD_GATEWAY),
            (
                KibitzError::Internal("bug".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
