//! boletin - BOE daily bulletin ingestion and client document triage.
//!
//! Scrapes the daily publication index of the Spanish official bulletin,
//! stores each entry as a document, and lets users browse, export, and tag
//! documents with per-client priorities.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod server;
pub mod services;
