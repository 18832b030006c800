//! Service layer for boletin business logic.
//!
//! Domain logic separated from UI concerns, shared by the CLI and web server.

pub mod analysis;
pub mod export;
pub mod ingest;

pub use ingest::{
    ingest_day, BulletinFetcher, DocumentStore, FetchError, IngestError, IngestReport,
};
