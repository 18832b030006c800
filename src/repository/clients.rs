//! Client repository.

use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{ClientRecord, NewClient};
use super::pool::{DbError, SqlitePool};
use super::util::format_timestamp;
use crate::models::{Client, ClientSummary};
use crate::schema::{client_document_priorities, clients};

/// Diesel-based client repository. Every lookup is scoped to an owner.
#[derive(Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Create a new client repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a client for a user.
    pub async fn create(&self, owner: &str, name: &str) -> Result<Client, DbError> {
        let mut conn = self.pool.get().await?;
        let created_at = format_timestamp(Utc::now());

        diesel::insert_into(clients::table)
            .values(&NewClient {
                owner,
                name,
                created_at: &created_at,
            })
            .returning(ClientRecord::as_returning())
            .get_result(&mut conn)
            .await
            .map(Client::from)
    }

    /// Get a client by ID only if it belongs to `owner`.
    pub async fn get_owned(&self, id: i32, owner: &str) -> Result<Option<Client>, DbError> {
        let mut conn = self.pool.get().await?;

        clients::table
            .find(id)
            .filter(clients::owner.eq(owner))
            .select(ClientRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Client::from))
    }

    /// All clients of a user, by name.
    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<Client>, DbError> {
        let mut conn = self.pool.get().await?;

        clients::table
            .filter(clients::owner.eq(owner))
            .order((clients::name.asc(), clients::id.asc()))
            .select(ClientRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Client::from).collect())
    }

    /// All clients of a user with their assigned document counts.
    pub async fn summaries_for_owner(&self, owner: &str) -> Result<Vec<ClientSummary>, DbError> {
        let clients = self.list_for_owner(owner).await?;
        let ids: Vec<i32> = clients.iter().map(|c| c.id).collect();

        let mut conn = self.pool.get().await?;
        let counts: HashMap<i32, i64> = client_document_priorities::table
            .filter(client_document_priorities::client_id.eq_any(&ids))
            .group_by(client_document_priorities::client_id)
            .select((client_document_priorities::client_id, count_star()))
            .load::<(i32, i64)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        Ok(clients
            .into_iter()
            .map(|client| ClientSummary {
                document_count: counts.get(&client.id).copied().unwrap_or(0),
                client,
            })
            .collect())
    }

    /// Rename a client. Returns false if no such client exists.
    pub async fn rename(&self, id: i32, name: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::update(clients::table.find(id))
            .set(clients::name.eq(name))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Delete a client and, by cascade, its priorities.
    pub async fn delete(&self, id: i32) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(clients::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }
}
