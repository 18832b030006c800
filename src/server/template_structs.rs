//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.
//! Askama provides compile-time verification that templates are valid.

use askama::Template;

use crate::models::{ClientSummary, Document, Priority, PriorityEntry};
use crate::repository::{Page, PriorityFilter};

/// Helper struct for document rows in listings.
pub struct DocumentRow {
    pub id: i32,
    pub title: String,
    pub number: String,
    pub date_str: String,
    pub status: String,
    pub url: String,
    pub has_url: bool,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            number: doc.number.clone(),
            date_str: doc.date.format("%d/%m/%Y").to_string(),
            status: doc.status.clone(),
            url: doc.url.clone(),
            has_url: doc.has_url(),
        }
    }
}

/// Option in a priority `<select>`.
pub struct PriorityChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl PriorityChoice {
    /// All priorities, marking `current` as selected.
    pub fn all(current: Option<Priority>) -> Vec<Self> {
        Priority::ALL
            .iter()
            .map(|p| Self {
                value: p.as_str(),
                label: p.label(),
                selected: current == Some(*p),
            })
            .collect()
    }
}

/// Helper struct for client/document priority rows.
pub struct PriorityRow {
    pub client_id: i32,
    pub client_name: String,
    pub document_id: i32,
    pub document_title: String,
    pub document_number: String,
    pub document_date: String,
    pub document_url: String,
    pub has_url: bool,
    pub priority_value: &'static str,
    pub created_str: String,
    pub choices: Vec<PriorityChoice>,
}

impl From<&PriorityEntry> for PriorityRow {
    fn from(entry: &PriorityEntry) -> Self {
        let priority = entry.priority.priority;
        Self {
            client_id: entry.client.id,
            client_name: entry.client.name.clone(),
            document_id: entry.document.id,
            document_title: entry.document.title.clone(),
            document_number: entry.document.number.clone(),
            document_date: entry.document.date.format("%d/%m/%Y").to_string(),
            document_url: entry.document.url.clone(),
            has_url: entry.document.has_url(),
            priority_value: priority.as_str(),
            created_str: entry.priority.created_at.format("%d/%m/%Y %H:%M").to_string(),
            choices: PriorityChoice::all(Some(priority)),
        }
    }
}

/// Helper struct for client rows with document counts.
pub struct ClientRow {
    pub id: i32,
    pub name: String,
    pub document_count: i64,
    pub created_str: String,
}

impl From<&ClientSummary> for ClientRow {
    fn from(summary: &ClientSummary) -> Self {
        Self {
            id: summary.client.id,
            name: summary.client.name.clone(),
            document_count: summary.document_count,
            created_str: summary.client.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Client option in the priority filter dropdown.
pub struct ClientOption {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

/// Per-priority count for the summary cards.
pub struct SummaryItem {
    pub value: &'static str,
    pub label: &'static str,
    pub count: i64,
}

/// Page navigation state shared by paginated listings.
pub struct Pagination {
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub has_previous: bool,
    pub previous_number: u32,
    pub has_next: bool,
    pub next_number: u32,
    pub has_pages: bool,
    /// Extra query string (leading `&`) preserving the current filters.
    pub query_suffix: String,
}

impl Pagination {
    pub fn from_page<T>(page: &Page<T>, query_suffix: String) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages(),
            total: page.total,
            has_previous: page.has_previous(),
            previous_number: page.previous_number(),
            has_next: page.has_next(),
            next_number: page.next_number(),
            has_pages: page.num_pages() > 1,
            query_suffix,
        }
    }
}

/// Query string (no leading `?`) reproducing a priority filter.
pub fn filter_query(filter: &PriorityFilter) -> String {
    let mut parts = Vec::new();
    if let Some(priority) = filter.priority {
        parts.push(format!("priority={}", priority.as_str()));
    }
    if let Some(client_id) = filter.client_id {
        parts.push(format!("client={}", client_id));
    }
    if let Some(ref search) = filter.search {
        parts.push(format!("search={}", urlencoding::encode(search)));
    }
    parts.join("&")
}

/// Document list page.
#[derive(Template)]
#[template(path = "documents/list.html")]
pub struct DocumentListTemplate<'a> {
    pub title: &'a str,
    pub query: String,
    pub documents: Vec<DocumentRow>,
    pub has_documents: bool,
    pub pagination: Pagination,
}

/// Document table partial (HTMX).
#[derive(Template)]
#[template(path = "partials/table.html")]
pub struct DocumentTableTemplate {
    pub documents: Vec<DocumentRow>,
    pub has_documents: bool,
    pub pagination: Pagination,
}

/// Client list page.
#[derive(Template)]
#[template(path = "clients/list.html")]
pub struct ClientListTemplate<'a> {
    pub title: &'a str,
    pub clients: Vec<ClientRow>,
    pub has_clients: bool,
}

/// Documents tagged for one client.
#[derive(Template)]
#[template(path = "clients/documents.html")]
pub struct ClientDocumentsTemplate<'a> {
    pub title: &'a str,
    pub client_id: i32,
    pub client_name: &'a str,
    pub rows: Vec<PriorityRow>,
    pub has_rows: bool,
    pub filter_query: String,
}

/// Client rename form.
#[derive(Template)]
#[template(path = "clients/form.html")]
pub struct ClientFormTemplate<'a> {
    pub title: &'a str,
    pub client_id: i32,
    pub name: &'a str,
    pub has_error: bool,
    pub error: &'a str,
}

/// Bulk assignment of documents to a client.
#[derive(Template)]
#[template(path = "clients/assign.html")]
pub struct AssignDocumentsTemplate<'a> {
    pub title: &'a str,
    pub client_id: i32,
    pub client_name: &'a str,
    pub documents: Vec<DocumentRow>,
    pub has_documents: bool,
    pub choices: Vec<PriorityChoice>,
}

/// Priority list page with filters and summary.
#[derive(Template)]
#[template(path = "clients/priority_list.html")]
pub struct PriorityListTemplate<'a> {
    pub title: &'a str,
    pub rows: Vec<PriorityRow>,
    pub has_rows: bool,
    pub pagination: Pagination,
    pub summary: Vec<SummaryItem>,
    pub clients: Vec<ClientOption>,
    pub priority_options: Vec<PriorityChoice>,
    pub current_search: String,
    pub filter_query: String,
}

/// Priority table partial (HTMX).
#[derive(Template)]
#[template(path = "partials/priority_table.html")]
pub struct PriorityTableTemplate {
    pub rows: Vec<PriorityRow>,
    pub has_rows: bool,
    pub filter_query: String,
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query() {
        assert_eq!(filter_query(&PriorityFilter::default()), "");

        let filter = PriorityFilter::from_params(Some("alta"), Some("3"), Some("real decreto"));
        assert_eq!(filter_query(&filter), "priority=alta&client=3&search=real%20decreto");
    }

    #[test]
    fn test_priority_choices_mark_selected() {
        let choices = PriorityChoice::all(Some(Priority::Baja));
        let selected: Vec<_> = choices.iter().filter(|c| c.selected).map(|c| c.value).collect();
        assert_eq!(selected, vec!["baja"]);
        assert!(PriorityChoice::all(None).iter().all(|c| !c.selected));
    }
}
