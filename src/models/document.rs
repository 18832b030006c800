//! Bulletin document models.
//!
//! A `ScrapedDocument` is a candidate parsed out of the daily index page,
//! already normalized to sentinel values. A `Document` is the stored row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Title stored when an entry has no title paragraph.
pub const SENTINEL_TITLE: &str = "Sin título";

/// Identifier and URL stored when an entry has no qualifying PDF link.
pub const SENTINEL_NOT_AVAILABLE: &str = "N/A";

/// Status assigned to every scraped entry.
pub const STATUS_PUBLISHED: &str = "Publicado";

/// A stored bulletin document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i32,
    pub title: String,
    /// External identifier, e.g. `BOE-A-2024-12345`. Unique per `date`.
    pub number: String,
    /// Calendar date the bulletin was fetched for.
    pub date: NaiveDate,
    pub status: String,
    pub url: String,
}

impl Document {
    /// Whether the document links to a source PDF.
    pub fn has_url(&self) -> bool {
        self.url != SENTINEL_NOT_AVAILABLE
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.number, self.title)
    }
}

/// A candidate document extracted from one bulletin entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedDocument {
    pub title: String,
    pub number: String,
    pub url: String,
}

impl ScrapedDocument {
    /// Build a candidate, substituting sentinels for missing fields.
    pub fn new(title: Option<String>, number: Option<String>, url: Option<String>) -> Self {
        Self {
            title: title.unwrap_or_else(|| SENTINEL_TITLE.to_string()),
            number: number.unwrap_or_else(|| SENTINEL_NOT_AVAILABLE.to_string()),
            url: url.unwrap_or_else(|| SENTINEL_NOT_AVAILABLE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraped_document_sentinels() {
        let doc = ScrapedDocument::new(None, None, None);
        assert_eq!(doc.title, "Sin título");
        assert_eq!(doc.number, "N/A");
        assert_eq!(doc.url, "N/A");

        let doc = ScrapedDocument::new(
            Some("Real Decreto 1/2024".to_string()),
            Some("BOE-A-2024-1".to_string()),
            Some("https://www.boe.es/x.pdf".to_string()),
        );
        assert_eq!(doc.title, "Real Decreto 1/2024");
        assert_eq!(doc.number, "BOE-A-2024-1");
    }

    #[test]
    fn test_document_display() {
        let doc = Document {
            id: 1,
            title: "Orden".to_string(),
            number: "BOE-A-2024-7".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: STATUS_PUBLISHED.to_string(),
            url: SENTINEL_NOT_AVAILABLE.to_string(),
        };
        assert_eq!(doc.to_string(), "BOE-A-2024-7 - Orden");
        assert!(!doc.has_url());
    }
}
