//! Client handlers: list, detail, rename and document assignment.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;

use super::super::auth::CurrentUser;
use super::super::template_structs::{
    AssignDocumentsTemplate, ClientDocumentsTemplate, ClientFormTemplate, ClientListTemplate,
    ClientRow, DocumentRow, PriorityChoice, PriorityRow,
};
use super::super::AppState;
use super::helpers::{error_page, is_htmx, render};
use crate::models::{Client, Priority};

/// Assignment page shows at most this many candidates.
const ASSIGNABLE_LIMIT: i64 = 50;

/// The requester's clients with their document counts.
pub async fn client_list(State(state): State<AppState>, user: CurrentUser) -> Response {
    let summaries = match state.clients.summaries_for_owner(user.name()).await {
        Ok(s) => s,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to load clients: {}", e),
            )
        }
    };

    let clients: Vec<ClientRow> = summaries.iter().map(ClientRow::from).collect();
    let template = ClientListTemplate {
        title: "Clientes",
        has_clients: !clients.is_empty(),
        clients,
    };
    render(&template).into_response()
}

/// Look up a client owned by the requester, or produce the error page.
async fn owned_client(state: &AppState, id: i32, user: &CurrentUser) -> Result<Client, Response> {
    match state.clients.get_owned(id, user.name()).await {
        Ok(Some(client)) => Ok(client),
        Ok(None) => Err(error_page(StatusCode::NOT_FOUND, "Cliente no encontrado")),
        Err(e) => Err(error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to load client: {}", e),
        )),
    }
}

/// Documents tagged for one client, newest tag first.
pub async fn client_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Response {
    let client = match owned_client(&state, id, &user).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let entries = match state.priorities.for_client(client.id).await {
        Ok(e) => e,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to load priorities: {}", e),
            )
        }
    };

    let rows: Vec<PriorityRow> = entries.iter().map(PriorityRow::from).collect();
    let title = format!("Documentos de {}", client.name);
    let template = ClientDocumentsTemplate {
        title: &title,
        client_id: client.id,
        client_name: &client.name,
        has_rows: !rows.is_empty(),
        rows,
        filter_query: format!("client={}", client.id),
    };
    render(&template).into_response()
}

/// Client rename form fields.
#[derive(Debug, Deserialize)]
pub struct ClientForm {
    #[serde(default)]
    pub name: String,
}

/// Show the rename form.
pub async fn client_edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Response {
    let client = match owned_client(&state, id, &user).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let template = ClientFormTemplate {
        title: "Editar cliente",
        client_id: client.id,
        name: &client.name,
        has_error: false,
        error: "",
    };
    render(&template).into_response()
}

/// Save a new client name and return to the client list.
pub async fn client_edit_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Form(form): Form<ClientForm>,
) -> Response {
    let client = match owned_client(&state, id, &user).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let name = match Client::validate_name(&form.name) {
        Ok(name) => name,
        Err(message) => {
            let template = ClientFormTemplate {
                title: "Editar cliente",
                client_id: client.id,
                name: &form.name,
                has_error: true,
                error: message,
            };
            return render(&template).into_response();
        }
    };

    match state.clients.rename(client.id, name).await {
        Ok(_) => Redirect::to("/clients").into_response(),
        Err(e) => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to update client: {}", e),
        ),
    }
}

/// Documents the client does not have yet, with priority choices.
pub async fn assign_documents_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Response {
    let client = match owned_client(&state, id, &user).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let documents = match state
        .documents
        .unassigned_for_client(client.id, ASSIGNABLE_LIMIT)
        .await
    {
        Ok(docs) => docs,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to load documents: {}", e),
            )
        }
    };

    let documents: Vec<DocumentRow> = documents.iter().map(DocumentRow::from).collect();
    let title = format!("Asignar documentos a {}", client.name);
    let template = AssignDocumentsTemplate {
        title: &title,
        client_id: client.id,
        client_name: &client.name,
        has_documents: !documents.is_empty(),
        documents,
        choices: PriorityChoice::all(Some(Priority::default())),
    };
    render(&template).into_response()
}

/// Selected document ids and the priority to give them.
///
/// `documents` repeats once per checked box, so the raw pairs are kept.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AssignmentForm {
    pub document_ids: Vec<i32>,
    pub priority: Priority,
}

impl AssignmentForm {
    /// Parse form pairs. Non-numeric ids are dropped and an unknown
    /// priority falls back to the default.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "documents" => {
                    if let Ok(id) = value.trim().parse() {
                        form.document_ids.push(id);
                    }
                }
                "priority" => {
                    form.priority = Priority::from_str(value).unwrap_or_default();
                }
                _ => {}
            }
        }
        form
    }
}

/// Link the selected documents to the client.
pub async fn assign_documents_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let client = match owned_client(&state, id, &user).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let form = AssignmentForm::from_pairs(&pairs);
    let mut created_count = 0usize;

    for document_id in form.document_ids {
        match state.documents.get(document_id).await {
            Ok(Some(_)) => {}
            Ok(None) => continue,
            Err(e) => {
                return error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to load document: {}", e),
                )
            }
        }

        match state
            .priorities
            .upsert(client.id, document_id, form.priority)
            .await
        {
            Ok(true) => created_count += 1,
            Ok(false) => {}
            Err(e) => {
                return error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to assign document: {}", e),
                )
            }
        }
    }

    tracing::info!(
        "Assigned {} new documents to client {}",
        created_count,
        client.id
    );

    if is_htmx(&headers) {
        return Json(serde_json::json!({
            "success": true,
            "message": format!("{} documentos asignados correctamente", created_count),
        }))
        .into_response();
    }

    Redirect::to(&format!("/clients/{}", client.id)).into_response()
}
