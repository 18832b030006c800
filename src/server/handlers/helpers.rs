//! Helper types and utility functions for handlers.

use askama::Template;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::super::template_structs::ErrorTemplate;
use crate::repository::PriorityFilter;

/// Header HTMX sets on every request it issues.
const HX_REQUEST: &str = "hx-request";

/// True when the request came from HTMX and expects a fragment.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty())
}

/// The bulletin day considered "today".
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Render a template, falling back to the error text.
pub fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| e.to_string()))
}

/// Full error page with a status code.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let title = status.canonical_reason().unwrap_or("Error");
    let template = ErrorTemplate { title, message };
    (status, render(&template)).into_response()
}

/// Error as an HTML fragment for HTMX or a JSON body otherwise.
pub fn fragment_or_json_error(htmx: bool, status: StatusCode, message: &str) -> Response {
    if htmx {
        let escaped = message
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        (
            status,
            Html(format!(r#"<div class="text-red-600">{}</div>"#, escaped)),
        )
            .into_response()
    } else {
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Query params for the document list.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Query params for priority listings and HTMX re-renders.
#[derive(Debug, Default, Deserialize)]
pub struct PriorityParams {
    pub priority: Option<String>,
    pub client: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
}

impl PriorityParams {
    pub fn filter(&self) -> PriorityFilter {
        PriorityFilter::from_params(
            self.priority.as_deref(),
            self.client.as_deref(),
            self.search.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
        headers.insert("HX-Request", HeaderValue::from_static(""));
        assert!(!is_htmx(&headers));
    }

    #[test]
    fn test_priority_params_ignore_unknown_values() {
        let params = PriorityParams {
            priority: Some("urgente".to_string()),
            client: Some("abc".to_string()),
            search: Some("  ".to_string()),
            page: None,
        };
        assert!(params.filter().is_empty());
    }
}
