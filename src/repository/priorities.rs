//! Client/document priority repository.

use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;

use super::models::{ClientRecord, DocumentRecord, NewPriority, PriorityRecord};
use super::page::{num_pages, offset_for, resolve_page_number, Page};
use super::pool::{DbError, SqlitePool};
use super::util::{contains_pattern, format_timestamp};
use crate::models::{Priority, PriorityEntry};
use crate::schema::{client_document_priorities, clients, documents};

/// Recognised filters for priority listings.
///
/// Unrecognised or malformed values are dropped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityFilter {
    pub priority: Option<Priority>,
    pub client_id: Option<i32>,
    pub search: Option<String>,
}

impl PriorityFilter {
    /// Build a filter from raw query-string values.
    pub fn from_params(priority: Option<&str>, client: Option<&str>, search: Option<&str>) -> Self {
        Self {
            priority: priority.and_then(Priority::from_str),
            client_id: client.and_then(|c| c.trim().parse().ok()),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.client_id.is_none() && self.search.is_none()
    }
}

/// Priority rows joined with client and document, scoped to an owner and filter.
macro_rules! owned_priorities {
    ($owner:expr, $filter:expr) => {{
        let filter: &PriorityFilter = $filter;
        let mut query = client_document_priorities::table
            .inner_join(clients::table)
            .inner_join(documents::table)
            .filter(clients::owner.eq($owner))
            .into_boxed::<Sqlite>();
        if let Some(priority) = filter.priority {
            query = query.filter(client_document_priorities::priority.eq(priority.as_str()));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(client_document_priorities::client_id.eq(client_id));
        }
        if let Some(ref search) = filter.search {
            query = query.filter(documents::title.like(contains_pattern(search)).escape('\\'));
        }
        query
    }};
}

type JoinedRow = (PriorityRecord, ClientRecord, DocumentRecord);

fn into_entry((priority, client, document): JoinedRow) -> PriorityEntry {
    PriorityEntry {
        priority: priority.into(),
        client: client.into(),
        document: document.into(),
    }
}

/// Diesel-based priority repository.
#[derive(Clone)]
pub struct PriorityRepository {
    pool: SqlitePool,
}

impl PriorityRepository {
    /// Create a new priority repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or update the priority of a document for a client.
    ///
    /// Returns true when a new link was created, false when an existing one
    /// was updated.
    pub async fn upsert(
        &self,
        client_id: i32,
        document_id: i32,
        priority: Priority,
    ) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let created_at = format_timestamp(Utc::now());

        let inserted = diesel::insert_into(client_document_priorities::table)
            .values(&NewPriority {
                client_id,
                document_id,
                priority: priority.as_str(),
                created_at: &created_at,
            })
            .on_conflict((
                client_document_priorities::client_id,
                client_document_priorities::document_id,
            ))
            .do_nothing()
            .execute(&mut conn)
            .await?;

        if inserted > 0 {
            return Ok(true);
        }

        diesel::update(
            client_document_priorities::table
                .filter(client_document_priorities::client_id.eq(client_id))
                .filter(client_document_priorities::document_id.eq(document_id)),
        )
        .set(client_document_priorities::priority.eq(priority.as_str()))
        .execute(&mut conn)
        .await?;

        Ok(false)
    }

    /// Remove a client/document link. Returns false if it did not exist.
    pub async fn delete(&self, client_id: i32, document_id: i32) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(
            client_document_priorities::table
                .filter(client_document_priorities::client_id.eq(client_id))
                .filter(client_document_priorities::document_id.eq(document_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(rows > 0)
    }

    /// Priorities of one client, newest first.
    pub async fn for_client(&self, client_id: i32) -> Result<Vec<PriorityEntry>, DbError> {
        let mut conn = self.pool.get().await?;

        client_document_priorities::table
            .inner_join(clients::table)
            .inner_join(documents::table)
            .filter(client_document_priorities::client_id.eq(client_id))
            .order((
                client_document_priorities::created_at.desc(),
                client_document_priorities::id.desc(),
            ))
            .select((
                PriorityRecord::as_select(),
                ClientRecord::as_select(),
                DocumentRecord::as_select(),
            ))
            .load::<JoinedRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(into_entry).collect())
    }

    /// All of a user's priorities matching a filter, newest first.
    pub async fn all_for_owner(
        &self,
        owner: &str,
        filter: &PriorityFilter,
    ) -> Result<Vec<PriorityEntry>, DbError> {
        let mut conn = self.pool.get().await?;

        owned_priorities!(owner, filter)
            .order((
                client_document_priorities::created_at.desc(),
                client_document_priorities::id.desc(),
            ))
            .select((
                PriorityRecord::as_select(),
                ClientRecord::as_select(),
                DocumentRecord::as_select(),
            ))
            .load::<JoinedRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(into_entry).collect())
    }

    /// One page of a user's priorities matching a filter, newest first.
    pub async fn list_for_owner(
        &self,
        owner: &str,
        filter: &PriorityFilter,
        page: Option<&str>,
        per_page: u32,
    ) -> Result<Page<PriorityEntry>, DbError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = owned_priorities!(owner, filter)
            .count()
            .get_result(&mut conn)
            .await?;
        let total = total.max(0) as u64;
        let number = resolve_page_number(page, num_pages(total, per_page));

        let items = owned_priorities!(owner, filter)
            .order((
                client_document_priorities::created_at.desc(),
                client_document_priorities::id.desc(),
            ))
            .limit(i64::from(per_page))
            .offset(offset_for(number, per_page))
            .select((
                PriorityRecord::as_select(),
                ClientRecord::as_select(),
                DocumentRecord::as_select(),
            ))
            .load::<JoinedRow>(&mut conn)
            .await?
            .into_iter()
            .map(into_entry)
            .collect();

        Ok(Page {
            items,
            number,
            per_page,
            total,
        })
    }

    /// Count of a user's priorities per level, ignoring any filter.
    pub async fn summary_for_owner(&self, owner: &str) -> Result<HashMap<Priority, i64>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(String, i64)> = client_document_priorities::table
            .inner_join(clients::table)
            .filter(clients::owner.eq(owner))
            .group_by(client_document_priorities::priority)
            .select((client_document_priorities::priority, count_star()))
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(p, count)| Priority::from_str(&p).map(|p| (p, count)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, ScrapedDocument};
    use crate::repository::context::DbContext;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    async fn setup() -> (DbContext, Vec<Document>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        for (title, number) in [
            ("Ley 2/2024 de presupuestos", "BOE-A-2024-2"),
            ("Orden de ayudas", "BOE-A-2024-3"),
            ("Resolución de convocatoria", "BOE-A-2024-4"),
        ] {
            ctx.documents()
                .insert_if_absent(
                    &ScrapedDocument::new(
                        Some(title.to_string()),
                        Some(number.to_string()),
                        None,
                    ),
                    date,
                )
                .await
                .unwrap();
        }
        let docs = ctx.documents().get_by_date(date).await.unwrap();
        (ctx, docs, dir)
    }

    #[test]
    fn test_filter_from_params_drops_unrecognised_values() {
        let filter = PriorityFilter::from_params(Some("urgente"), Some("abc"), Some("  "));
        assert!(filter.is_empty());

        let filter = PriorityFilter::from_params(Some("alta"), Some(" 7 "), Some("ley"));
        assert_eq!(filter.priority, Some(Priority::Alta));
        assert_eq!(filter.client_id, Some(7));
        assert_eq!(filter.search.as_deref(), Some("ley"));
    }

    #[tokio::test]
    async fn test_upsert_reports_created_then_updates() {
        let (ctx, docs, _dir) = setup().await;
        let client = ctx.clients().create("ana", "Acme").await.unwrap();
        let repo = ctx.priorities();

        assert!(repo.upsert(client.id, docs[0].id, Priority::Media).await.unwrap());
        assert!(!repo.upsert(client.id, docs[0].id, Priority::Alta).await.unwrap());

        let entries = repo.for_client(client.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].priority.priority, Priority::Alta);
        assert_eq!(entries[0].document.id, docs[0].id);

        assert!(repo.delete(client.id, docs[0].id).await.unwrap());
        assert!(!repo.delete(client.id, docs[0].id).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_listing_filters_and_summary() {
        let (ctx, docs, _dir) = setup().await;
        let acme = ctx.clients().create("ana", "Acme").await.unwrap();
        let beta = ctx.clients().create("ana", "Beta").await.unwrap();
        let other = ctx.clients().create("luis", "Gamma").await.unwrap();
        let repo = ctx.priorities();

        repo.upsert(acme.id, docs[0].id, Priority::Alta).await.unwrap();
        repo.upsert(acme.id, docs[1].id, Priority::Baja).await.unwrap();
        repo.upsert(beta.id, docs[2].id, Priority::Alta).await.unwrap();
        repo.upsert(other.id, docs[0].id, Priority::Alta).await.unwrap();

        let all = repo
            .all_for_owner("ana", &PriorityFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|e| e.client.owner == "ana"));

        let alta = PriorityFilter::from_params(Some("alta"), None, None);
        assert_eq!(repo.all_for_owner("ana", &alta).await.unwrap().len(), 2);

        let acme_only = PriorityFilter::from_params(None, Some(&acme.id.to_string()), None);
        assert_eq!(repo.all_for_owner("ana", &acme_only).await.unwrap().len(), 2);

        let search = PriorityFilter::from_params(None, None, Some("LEY"));
        let found = repo.all_for_owner("ana", &search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].document.number, "BOE-A-2024-2");

        let page = repo
            .list_for_owner("ana", &PriorityFilter::default(), Some("1"), 2)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next());

        let summary = repo.summary_for_owner("ana").await.unwrap();
        assert_eq!(summary.get(&Priority::Alta), Some(&2));
        assert_eq!(summary.get(&Priority::Baja), Some(&1));
        assert_eq!(summary.get(&Priority::Media), None);
    }
}
