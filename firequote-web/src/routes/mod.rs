//! Route handlers

pub mod pages;
pub mod quotes;

use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

/// Flash message carried across a redirect as query parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Redirect to `path` with an error message the target page displays.
pub fn redirect_with_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message))).into_response()
}

/// Redirect to `path` with a success notice.
pub fn redirect_with_notice(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?notice={}", urlencoding::encode(message))).into_response()
}
