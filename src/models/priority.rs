//! Client/document priority models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Client, Document};

/// Priority a client assigns to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Alta,
    #[default]
    Media,
    Baja,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Alta, Priority::Media, Priority::Baja];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alta => "alta",
            Self::Media => "media",
            Self::Baja => "baja",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "alta" => Some(Self::Alta),
            "media" => Some(Self::Media),
            "baja" => Some(Self::Baja),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Link between a client and a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDocumentPriority {
    pub id: i32,
    pub client_id: i32,
    pub document_id: i32,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

/// A priority row joined with its client and document, for listings.
#[derive(Debug, Clone)]
pub struct PriorityEntry {
    pub priority: ClientDocumentPriority,
    pub client: Client,
    pub document: Document,
}
