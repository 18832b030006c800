//! Database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::clients::ClientRepository;
use super::documents::DocumentRepository;
use super::pool::{DbError, SqlitePool};
use super::priorities::PriorityRepository;

/// Database context that owns the connection factory and hands out repositories.
///
/// Create one context per command or service, then use it to access all
/// repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::new(&db_path);
/// ctx.init_schema().await?;
/// let page = ctx.documents().list(None, None, 10).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: SqlitePool,
}

impl DbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: SqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a database URL (`sqlite:` URLs or plain paths).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: SqlitePool::new(database_url),
        }
    }

    /// Get a document repository.
    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone())
    }

    /// Get a client repository.
    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    /// Get a priority repository.
    pub fn priorities(&self) -> PriorityRepository {
        PriorityRepository::new(self.pool.clone())
    }

    /// Initialize all database schemas.
    ///
    /// This creates the necessary tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            -- Bulletin documents; (number, date) is the natural key
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                number TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                url TEXT NOT NULL,
                UNIQUE(number, date)
            );

            -- Clients owned by users
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Client <-> document links with a priority level
            CREATE TABLE IF NOT EXISTS client_document_priorities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                priority TEXT NOT NULL DEFAULT 'media'
                    CHECK (priority IN ('alta', 'media', 'baja')),
                created_at TEXT NOT NULL,
                UNIQUE(client_id, document_id)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_documents_date ON documents(date);
            CREATE INDEX IF NOT EXISTS idx_clients_owner ON clients(owner);
            CREATE INDEX IF NOT EXISTS idx_priorities_document ON client_document_priorities(document_id);
            CREATE INDEX IF NOT EXISTS idx_priorities_created ON client_document_priorities(created_at);
            "#,
        )
        .await
    }

    /// Get list of all tables in the database.
    pub async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<TableName> = diesel_async::RunQueryDsl::load(
            diesel::sql_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            ),
            &mut conn,
        )
        .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}

#[derive(diesel::QueryableByName)]
struct TableName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}
