//! Priority handlers: filtered list, HTMX update and delete.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::super::auth::CurrentUser;
use super::super::template_structs::{
    filter_query, ClientOption, Pagination, PriorityChoice, PriorityListTemplate, PriorityRow,
    PriorityTableTemplate, SummaryItem,
};
use super::super::AppState;
use super::helpers::{error_page, fragment_or_json_error, is_htmx, render, PriorityParams};
use crate::models::Priority;
use crate::repository::{PriorityFilter, DEFAULT_PER_PAGE};

/// The requester's priority rows, filtered and paginated, with a summary.
pub async fn priority_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PriorityParams>,
) -> Response {
    let filter = params.filter();
    let owner = user.name();

    let page = state
        .priorities
        .list_for_owner(owner, &filter, params.page.as_deref(), DEFAULT_PER_PAGE)
        .await;
    let summary = state.priorities.summary_for_owner(owner).await;
    let clients = state.clients.list_for_owner(owner).await;

    let (page, summary, clients) = match (page, summary, clients) {
        (Ok(p), Ok(s), Ok(c)) => (p, s, c),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to load priorities: {}", e),
            )
        }
    };

    let current_client = params.client.clone().unwrap_or_default();
    let current_search = params.search.clone().unwrap_or_default();

    let filter_qs = filter_query(&filter);
    let query_suffix = if filter_qs.is_empty() {
        String::new()
    } else {
        format!("&{}", filter_qs)
    };

    let rows: Vec<PriorityRow> = page.items.iter().map(PriorityRow::from).collect();
    let summary = Priority::ALL
        .iter()
        .map(|p| SummaryItem {
            value: p.as_str(),
            label: p.label(),
            count: summary.get(p).copied().unwrap_or(0),
        })
        .collect();
    let clients = clients
        .into_iter()
        .map(|c| ClientOption {
            selected: current_client == c.id.to_string(),
            id: c.id,
            name: c.name,
        })
        .collect();

    let template = PriorityListTemplate {
        title: "Prioridades",
        has_rows: !rows.is_empty(),
        rows,
        pagination: Pagination::from_page(&page, query_suffix),
        summary,
        clients,
        priority_options: PriorityChoice::all(filter.priority),
        current_search,
        filter_query: filter_qs,
    };
    render(&template).into_response()
}

/// Re-render the full (unpaginated) priority table for HTMX swaps.
async fn priority_table(state: &AppState, owner: &str, filter: &PriorityFilter) -> Response {
    match state.priorities.all_for_owner(owner, filter).await {
        Ok(entries) => {
            let rows: Vec<PriorityRow> = entries.iter().map(PriorityRow::from).collect();
            let template = PriorityTableTemplate {
                has_rows: !rows.is_empty(),
                rows,
                filter_query: filter_query(filter),
            };
            render(&template).into_response()
        }
        Err(e) => fragment_or_json_error(
            true,
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Error: {}", e),
        ),
    }
}

/// Check that the client belongs to the requester and the document exists.
async fn check_link_targets(
    state: &AppState,
    owner: &str,
    client_id: i32,
    document_id: i32,
) -> Result<bool, crate::repository::DbError> {
    let client = state.clients.get_owned(client_id, owner).await?;
    if client.is_none() {
        return Ok(false);
    }
    Ok(state.documents.get(document_id).await?.is_some())
}

/// Priority update form fields.
#[derive(Debug, Deserialize)]
pub struct PriorityForm {
    pub priority: Option<String>,
}

/// Create or change the priority a client gives a document.
pub async fn update_priority(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path((client_id, document_id)): Path<(i32, i32)>,
    Query(params): Query<PriorityParams>,
    form: Option<Form<PriorityForm>>,
) -> Response {
    let htmx = is_htmx(&headers);
    let raw = form.and_then(|Form(f)| f.priority);

    let Some(priority) = raw.as_deref().and_then(Priority::from_str) else {
        return fragment_or_json_error(htmx, StatusCode::BAD_REQUEST, "Prioridad inválida");
    };

    match check_link_targets(&state, user.name(), client_id, document_id).await {
        Ok(true) => {}
        Ok(false) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::NOT_FOUND,
                "Cliente o documento no encontrado",
            )
        }
        Err(e) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error: {}", e),
            )
        }
    }

    let created = match state.priorities.upsert(client_id, document_id, priority).await {
        Ok(created) => created,
        Err(e) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error: {}", e),
            )
        }
    };

    if htmx {
        return priority_table(&state, user.name(), &params.filter()).await;
    }

    Json(serde_json::json!({
        "success": true,
        "priority": priority.label(),
        "created": created,
    }))
    .into_response()
}

/// Remove a client's priority for a document.
pub async fn delete_priority(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path((client_id, document_id)): Path<(i32, i32)>,
    Query(params): Query<PriorityParams>,
) -> Response {
    let htmx = is_htmx(&headers);

    match check_link_targets(&state, user.name(), client_id, document_id).await {
        Ok(true) => {}
        Ok(false) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::NOT_FOUND,
                "Cliente o documento no encontrado",
            )
        }
        Err(e) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error: {}", e),
            )
        }
    }

    match state.priorities.delete(client_id, document_id).await {
        Ok(true) => {}
        Ok(false) => {
            return fragment_or_json_error(htmx, StatusCode::NOT_FOUND, "Prioridad no encontrada")
        }
        Err(e) => {
            return fragment_or_json_error(
                htmx,
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error: {}", e),
            )
        }
    }

    if htmx {
        return priority_table(&state, user.name(), &params.filter()).await;
    }

    Json(serde_json::json!({ "success": true })).into_response()
}

/// Any other method on the priority endpoints.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Método no permitido" })),
    )
        .into_response()
}
