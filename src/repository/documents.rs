//! Document repository.
//!
//! Holds the deduplicating write used by ingestion: one atomic
//! `INSERT ... ON CONFLICT (number, date) DO NOTHING` per candidate.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::models::{DocumentRecord, NewDocument};
use super::page::{num_pages, offset_for, resolve_page_number, Page};
use super::pool::{DbError, SqlitePool};
use super::util::{contains_pattern, format_date, is_unique_violation};
use crate::models::{Document, ScrapedDocument, STATUS_PUBLISHED};
use crate::schema::{client_document_priorities, documents};

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created.
    Inserted,
    /// A row with the same `(number, date)` already existed and was left untouched.
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Diesel-based document repository.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Create a new document repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a scraped candidate unless `(number, date)` already exists.
    ///
    /// Existing rows are never updated. A unique violation reported by the
    /// database (a concurrent writer won the race) counts as a duplicate.
    pub async fn insert_if_absent(
        &self,
        candidate: &ScrapedDocument,
        date: NaiveDate,
    ) -> Result<InsertOutcome, DbError> {
        let mut conn = self.pool.get().await?;
        let date_str = format_date(date);

        let new_doc = NewDocument {
            title: &candidate.title,
            number: &candidate.number,
            date: &date_str,
            status: STATUS_PUBLISHED,
            url: &candidate.url,
        };

        let result = diesel::insert_into(documents::table)
            .values(&new_doc)
            .on_conflict((documents::number, documents::date))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match result {
            Ok(0) => Ok(InsertOutcome::Duplicate),
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => {
                debug!(
                    "Unique violation for {} on {}, treating as existing",
                    candidate.number, date_str
                );
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e),
        }
    }

    /// Get a document by ID.
    pub async fn get(&self, id: i32) -> Result<Option<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .find(id)
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// Get a document by ID, only if it belongs to the given bulletin date.
    pub async fn get_for_date(
        &self,
        id: i32,
        date: NaiveDate,
    ) -> Result<Option<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .find(id)
            .filter(documents::date.eq(format_date(date)))
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// Find a document by its natural key.
    pub async fn get_by_number(
        &self,
        number: &str,
        date: NaiveDate,
    ) -> Result<Option<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .filter(documents::number.eq(number))
            .filter(documents::date.eq(format_date(date)))
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// All documents for one bulletin date, in insertion order.
    pub async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .filter(documents::date.eq(format_date(date)))
            .order(documents::id.asc())
            .select(DocumentRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Document::from).collect())
    }

    /// Total number of stored documents.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        documents::table.count().get_result(&mut conn).await
    }

    /// Page through documents, newest bulletin first, optionally filtered by title.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<&str>,
        per_page: u32,
    ) -> Result<Page<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = Self::filtered(search)
            .count()
            .get_result(&mut conn)
            .await?;
        let total = total.max(0) as u64;
        let number = resolve_page_number(page, num_pages(total, per_page));

        let items = Self::filtered(search)
            .order((documents::date.desc(), documents::id.desc()))
            .limit(i64::from(per_page))
            .offset(offset_for(number, per_page))
            .select(DocumentRecord::as_select())
            .load(&mut conn)
            .await?
            .into_iter()
            .map(Document::from)
            .collect();

        Ok(Page {
            items,
            number,
            per_page,
            total,
        })
    }

    /// Documents not yet linked to a client, newest first.
    pub async fn unassigned_for_client(
        &self,
        client_id: i32,
        limit: i64,
    ) -> Result<Vec<Document>, DbError> {
        let mut conn = self.pool.get().await?;

        let assigned = client_document_priorities::table
            .filter(client_document_priorities::client_id.eq(client_id))
            .select(client_document_priorities::document_id);

        documents::table
            .filter(diesel::dsl::not(documents::id.eq_any(assigned)))
            .order((documents::date.desc(), documents::id.desc()))
            .limit(limit)
            .select(DocumentRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Document::from).collect())
    }

    fn filtered(search: Option<&str>) -> documents::BoxedQuery<'static, Sqlite> {
        let mut query = documents::table.into_boxed();
        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(documents::title.like(contains_pattern(needle)).escape('\\'));
        }
        query
    }
}
