//! Client models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted client name, in characters.
pub const MAX_CLIENT_NAME_LEN: usize = 255;

/// A user-owned client that documents can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i32,
    /// Username of the owning user.
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Trim and check a proposed client name.
    pub fn validate_name(name: &str) -> Result<&str, &'static str> {
        let name = name.trim();
        if name.is_empty() {
            Err("Este campo es obligatorio.")
        } else if name.chars().count() > MAX_CLIENT_NAME_LEN {
            Err("El nombre no puede superar los 255 caracteres.")
        } else {
            Ok(name)
        }
    }
}

/// A client together with the number of documents assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub client: Client,
    pub document_count: i64,
}
