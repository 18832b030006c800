//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! Dates and timestamps are stored as TEXT and converted at the boundary.

use diesel::prelude::*;

use super::util::{parse_date, parse_timestamp};
use crate::models::{Client, ClientDocumentPriority, Document, Priority};
use crate::schema;

/// Document record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRecord {
    pub id: i32,
    pub title: String,
    pub number: String,
    pub date: String,
    pub status: String,
    pub url: String,
}

/// New document for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::documents)]
pub struct NewDocument<'a> {
    pub title: &'a str,
    pub number: &'a str,
    pub date: &'a str,
    pub status: &'a str,
    pub url: &'a str,
}

/// Client record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::clients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClientRecord {
    pub id: i32,
    pub owner: String,
    pub name: String,
    pub created_at: String,
}

/// New client for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::clients)]
pub struct NewClient<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub created_at: &'a str,
}

/// Client/document priority record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::client_document_priorities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriorityRecord {
    pub id: i32,
    pub client_id: i32,
    pub document_id: i32,
    pub priority: String,
    pub created_at: String,
}

/// New client/document priority for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::client_document_priorities)]
pub struct NewPriority<'a> {
    pub client_id: i32,
    pub document_id: i32,
    pub priority: &'a str,
    pub created_at: &'a str,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document {
            id: record.id,
            title: record.title,
            number: record.number,
            date: parse_date(&record.date),
            status: record.status,
            url: record.url,
        }
    }
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Client {
            id: record.id,
            owner: record.owner,
            name: record.name,
            created_at: parse_timestamp(&record.created_at),
        }
    }
}

impl From<PriorityRecord> for ClientDocumentPriority {
    fn from(record: PriorityRecord) -> Self {
        ClientDocumentPriority {
            id: record.id,
            client_id: record.client_id,
            document_id: record.document_id,
            priority: Priority::from_str(&record.priority).unwrap_or_default(),
            created_at: parse_timestamp(&record.created_at),
        }
    }
}
