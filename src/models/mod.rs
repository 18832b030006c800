//! Data models for boletin.

mod client;
mod document;
mod priority;

pub use client::{Client, ClientSummary};
pub use document::{
    Document, ScrapedDocument, SENTINEL_NOT_AVAILABLE, SENTINEL_TITLE, STATUS_PUBLISHED,
};
pub use priority::{ClientDocumentPriority, Priority, PriorityEntry};
