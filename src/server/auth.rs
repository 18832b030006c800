//! Request user identification.
//!
//! Authentication happens upstream: a reverse proxy puts the username in a
//! configurable header and the server trusts it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::AppState;

/// Username of the authenticated requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(state.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| CurrentUser(u.to_string()))
            .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Authentication required").into_response())
    }
}
