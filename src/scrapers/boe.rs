//! BOE daily index scraper.
//!
//! The daily index lives at `{base}/boe/dias/YYYY/MM/DD/` and lists one
//! `li.dispo` element per published entry, each with a title paragraph and
//! an optional PDF link.

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::http_client::HttpClient;
use crate::config::Settings;
use crate::models::ScrapedDocument;
use crate::services::ingest::{BulletinFetcher, FetchError};

/// Public BOE origin.
pub const DEFAULT_BASE_URL: &str = "https://www.boe.es";

const ENTRY_SELECTOR: &str = "li.dispo";
const TITLE_SELECTOR: &str = "p";
const PDF_LINK_SELECTOR: &str = ".puntoPDF a";
/// Only links to section A documents carry a usable identifier.
const IDENTIFIER_MARKER: &str = "BOE-A";
const PDF_SUFFIX: &str = ".pdf";

/// URL of the daily index page for `date`.
pub fn day_index_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/boe/dias/{}/",
        base_url.trim_end_matches('/'),
        date.format("%Y/%m/%d")
    )
}

/// Extract candidate documents from a daily index page, in document order.
///
/// Missing titles, links and identifiers become sentinel values. Link
/// targets are the base URL with the raw `href` appended.
pub fn extract_entries(html: &str, base_url: &str) -> Vec<ScrapedDocument> {
    let (entry_sel, title_sel, link_sel) = match (
        Selector::parse(ENTRY_SELECTOR),
        Selector::parse(TITLE_SELECTOR),
        Selector::parse(PDF_LINK_SELECTOR),
    ) {
        (Ok(e), Ok(t), Ok(l)) => (e, t, l),
        _ => return Vec::new(),
    };

    let base_url = base_url.trim_end_matches('/');
    let document = Html::parse_document(html);

    document
        .select(&entry_sel)
        .map(|entry| {
            let title = entry
                .select(&title_sel)
                .next()
                .map(|p| p.text().collect::<String>().trim().to_string());

            let url = entry
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| format!("{}{}", base_url, href));

            let number = url.as_deref().and_then(identifier_from_url);

            ScrapedDocument::new(title, number, url)
        })
        .collect()
}

/// Identifier from a document URL: the last path segment without `.pdf`.
fn identifier_from_url(url: &str) -> Option<String> {
    if !url.contains(IDENTIFIER_MARKER) {
        return None;
    }
    let segment = url.rsplit('/').next()?;
    let identifier = segment.strip_suffix(PDF_SUFFIX).unwrap_or(segment);
    if identifier.is_empty() {
        None
    } else {
        Some(identifier.to_string())
    }
}

/// Fetcher for the BOE daily index.
#[derive(Clone)]
pub struct BoeFetcher {
    client: HttpClient,
    base_url: String,
}

impl BoeFetcher {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a fetcher from the configured origin, timeout and user agent.
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = HttpClient::with_user_agent(settings.timeout(), settings.user_agent.as_deref())?;
        Ok(Self::new(client, &settings.base_url))
    }
}

#[async_trait]
impl BulletinFetcher for BoeFetcher {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<String>, FetchError> {
        let url = day_index_url(&self.base_url, date);
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self.client.get(&url).await.map_err(transport)?;
        if !response.is_success() {
            warn!("BOE index {} returned {}", url, response.status);
            return Ok(None);
        }

        let body = response.text().await.map_err(transport)?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(Some(body))
    }
}
