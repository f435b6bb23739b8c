//! API route definitions.
//!
//! Every list endpoint speaks the same slice envelope: `content`, `size`,
//! `hasNext`, and an opaque `nextCursor` string the client round-trips to
//! get the next page. Criteria validation happens in the handlers before
//! any query runs; validation failures come back as 400s.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::slice::{SliceError, SlicePage};

pub mod architectures;
pub mod coding_rules;
pub mod conventions;
pub mod health;
pub mod layers;
pub mod templates;

/// The slice envelope returned by all list endpoints.
///
/// `next_cursor` is the decimal form of the last item's identifier; clients
/// must treat it as opaque.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceResponse<T> {
    pub content: Vec<T>,
    pub size: i64,
    pub has_next: bool,
    pub next_cursor: Option<String>,
}

impl<T: Serialize> From<SlicePage<T>> for SliceResponse<T> {
    fn from(page: SlicePage<T>) -> Self {
        Self {
            content: page.content,
            size: page.size,
            has_next: page.has_next,
            next_cursor: page.next_cursor.map(|c| c.to_string()),
        }
    }
}

/// JSON error response with an HTTP status.
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<SliceError> for ApiError {
    fn from(err: SliceError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::internal("internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
