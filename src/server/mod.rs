//! Web server for browsing bulletin documents.
//!
//! Provides:
//! - A searchable, paginated document list with an HTMX table partial
//! - Refresh (ingest today's bulletin), CSV export and mock analysis
//! - Per-user clients and the priorities they give to documents

mod auth;
mod handlers;
mod routes;
mod template_structs;

pub use auth::CurrentUser;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::repository::{ClientRepository, DbContext, DocumentRepository, PriorityRepository};
use crate::scrapers::BoeFetcher;
use crate::services::BulletinFetcher;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentRepository>,
    pub clients: Arc<ClientRepository>,
    pub priorities: Arc<PriorityRepository>,
    pub fetcher: Arc<dyn BulletinFetcher>,
    /// Lowercase name of the header carrying the authenticated username.
    pub user_header: String,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context();
        ctx.init_schema().await?;
        let fetcher = BoeFetcher::from_settings(settings)?;

        Ok(Self::from_parts(&ctx, Arc::new(fetcher), &settings.user_header))
    }

    /// Assemble state from an existing database context and fetcher.
    pub fn from_parts(ctx: &DbContext, fetcher: Arc<dyn BulletinFetcher>, user_header: &str) -> Self {
        Self {
            documents: Arc::new(ctx.documents()),
            clients: Arc::new(ctx.clients()),
            priorities: Arc::new(ctx.priorities()),
            fetcher,
            user_header: user_header.to_ascii_lowercase(),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
