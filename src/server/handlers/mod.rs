//! HTTP request handlers for the web server.

mod clients;
mod documents;
mod helpers;
mod priorities;

// Re-export handlers for use by the router
pub use clients::{
    assign_documents_form, assign_documents_submit, client_documents, client_edit_form,
    client_edit_submit, client_list,
};
pub use documents::{analyze_document, document_list, export_csv, refresh_documents};
pub use priorities::{delete_priority, method_not_allowed, priority_list, update_priority};
