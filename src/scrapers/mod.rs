//! Bulletin scrapers.

pub mod boe;
mod http_client;

pub use boe::{extract_entries, BoeFetcher, DEFAULT_BASE_URL};
pub use http_client::{resolve_user_agent, HttpClient, HttpResponse, USER_AGENT};
