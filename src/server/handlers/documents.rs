//! Document list, refresh, export and analysis handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::super::template_structs::{
    DocumentListTemplate, DocumentRow, DocumentTableTemplate, Pagination,
};
use super::super::AppState;
use super::helpers::{error_page, is_htmx, render, today, ListParams};
use crate::repository::DEFAULT_PER_PAGE;
use crate::services::analysis::analyze;
use crate::services::export::documents_to_csv;
use crate::services::ingest_day;

/// Paginated, searchable document list. HTMX requests get the table only.
pub async fn document_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    render_document_list(&state, &headers, &params).await
}

/// Ingest today's bulletin, then show the list.
pub async fn refresh_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    match ingest_day(state.fetcher.as_ref(), state.documents.as_ref(), today()).await {
        Ok(report) => tracing::info!(
            "Refresh added {} documents for {}",
            report.inserted(),
            report.date
        ),
        Err(e) => tracing::warn!("Refresh failed, showing existing documents: {}", e),
    }

    render_document_list(&state, &headers, &params).await
}

async fn render_document_list(state: &AppState, headers: &HeaderMap, params: &ListParams) -> Response {
    let query = params.q.clone().unwrap_or_default();
    let search = Some(query.as_str()).filter(|q| !q.is_empty());

    let page = match state
        .documents
        .list(search, params.page.as_deref(), DEFAULT_PER_PAGE)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to load documents: {}", e),
            )
        }
    };

    let query_suffix = if query.is_empty() {
        String::new()
    } else {
        format!("&q={}", urlencoding::encode(&query))
    };
    let documents: Vec<DocumentRow> = page.items.iter().map(DocumentRow::from).collect();
    let has_documents = !documents.is_empty();
    let pagination = Pagination::from_page(&page, query_suffix);

    if is_htmx(headers) {
        let template = DocumentTableTemplate {
            documents,
            has_documents,
            pagination,
        };
        return render(&template).into_response();
    }

    let template = DocumentListTemplate {
        title: "Documentos BOE",
        query,
        documents,
        has_documents,
        pagination,
    };
    render(&template).into_response()
}

/// Today's documents as a CSV attachment.
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let documents = match state.documents.get_by_date(today()).await {
        Ok(docs) => docs,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to export documents: {}", e),
            )
                .into_response()
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"documents_today.csv\"",
            ),
        ],
        documents_to_csv(&documents),
    )
        .into_response()
}

/// Simulated analysis of one of today's documents.
pub async fn analyze_document(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.documents.get_for_date(id, today()).await {
        Ok(Some(doc)) => Json(serde_json::json!({ "analysis": analyze(&doc) })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Document not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
