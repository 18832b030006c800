//! Daily bulletin ingestion.
//!
//! Fetches one day's index, extracts candidate entries and writes each one
//! through an insert-if-absent store. Running the same day twice is a no-op
//! the second time: `(number, date)` uniqueness is enforced by the store.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::ScrapedDocument;
use crate::repository::{DbError, DocumentRepository, InsertOutcome};
use crate::scrapers::boe::extract_entries;

/// Failure to talk to the bulletin source at all.
///
/// A non-2xx response is not an error; fetchers report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to store {number}: {source}")]
    Store {
        number: String,
        #[source]
        source: DbError,
    },
}

/// Source of raw bulletin index pages.
#[async_trait]
pub trait BulletinFetcher: Send + Sync {
    /// Origin prepended to relative document links.
    fn base_url(&self) -> &str;

    /// Fetch the index page for `date`. `Ok(None)` means nothing to ingest.
    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<String>, FetchError>;
}

/// Destination for scraped candidates.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        candidate: &ScrapedDocument,
        date: NaiveDate,
    ) -> Result<InsertOutcome, DbError>;
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert_if_absent(
        &self,
        candidate: &ScrapedDocument,
        date: NaiveDate,
    ) -> Result<InsertOutcome, DbError> {
        DocumentRepository::insert_if_absent(self, candidate, date).await
    }
}

/// Outcome for a single extracted entry.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub number: String,
    pub title: String,
    pub outcome: InsertOutcome,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub date: NaiveDate,
    /// False when the source answered with a non-success status.
    pub fetched: bool,
    pub entries: Vec<EntryOutcome>,
}

impl IngestReport {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            fetched: false,
            entries: Vec::new(),
        }
    }

    /// Number of entries extracted from the page.
    pub fn candidates(&self) -> usize {
        self.entries.len()
    }

    /// Number of rows actually created.
    pub fn inserted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_inserted())
            .count()
    }

    /// Number of entries that already existed.
    pub fn duplicates(&self) -> usize {
        self.candidates() - self.inserted()
    }
}

/// Fetch, extract and store one day of the bulletin.
pub async fn ingest_day<F, S>(
    fetcher: &F,
    store: &S,
    date: NaiveDate,
) -> Result<IngestReport, IngestError>
where
    F: BulletinFetcher + ?Sized,
    S: DocumentStore + ?Sized,
{
    let Some(html) = fetcher.fetch_day(date).await? else {
        info!("No bulletin index available for {}", date);
        return Ok(IngestReport::empty(date));
    };

    let candidates = extract_entries(&html, fetcher.base_url());
    let entries = store_candidates(store, &candidates, date).await?;

    let report = IngestReport {
        date,
        fetched: true,
        entries,
    };
    info!(
        "Ingested {} new of {} entries for {}",
        report.inserted(),
        report.candidates(),
        date
    );
    Ok(report)
}

/// Write candidates one at a time, in order.
pub async fn store_candidates<S>(
    store: &S,
    candidates: &[ScrapedDocument],
    date: NaiveDate,
) -> Result<Vec<EntryOutcome>, IngestError>
where
    S: DocumentStore + ?Sized,
{
    let mut entries = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let outcome = store
            .insert_if_absent(candidate, date)
            .await
            .map_err(|source| IngestError::Store {
                number: candidate.number.clone(),
                source,
            })?;
        debug!("{} on {}: {:?}", candidate.number, date, outcome);
        entries.push(EntryOutcome {
            number: candidate.number.clone(),
            title: candidate.title.clone(),
            outcome,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const INDEX: &str = r#"
        <ul>
          <li class="dispo">
            <p>Real Decreto 1/2024, de 9 de enero</p>
            <div class="puntoPDF"><a href="/boe/dias/2024/01/10/pdfs/BOE-A-2024-100.pdf">PDF</a></div>
          </li>
          <li class="dispo">
            <p>Resolución de 8 de enero de 2024</p>
            <div class="puntoPDF"><a href="/boe/dias/2024/01/10/pdfs/BOE-A-2024-101.pdf">PDF</a></div>
          </li>
          <li class="dispo"><p>Anuncio sin enlace</p></li>
          <li class="dispo"><p>Otro anuncio sin enlace</p></li>
        </ul>
    "#;

    struct FakeFetcher {
        body: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(body: Option<&str>) -> Self {
            Self {
                body: body.map(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BulletinFetcher for FakeFetcher {
        fn base_url(&self) -> &str {
            "https://www.boe.es"
        }

        async fn fetch_day(&self, _date: NaiveDate) -> Result<Option<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct BrokenFetcher;

    #[async_trait]
    impl BulletinFetcher for BrokenFetcher {
        fn base_url(&self) -> &str {
            "https://www.boe.es"
        }

        async fn fetch_day(&self, _date: NaiveDate) -> Result<Option<String>, FetchError> {
            // A relative URL fails in the request builder without touching the network.
            let url = "not a url".to_string();
            let source = match reqwest::Client::new().get(&url).send().await {
                Err(e) => e,
                Ok(_) => unreachable!("request to an invalid URL succeeded"),
            };
            Err(FetchError::Transport { url, source })
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    async fn setup() -> (tempfile::TempDir, DbContext) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_second_run_inserts_nothing() {
        let (_dir, ctx) = setup().await;
        let repo = ctx.documents();
        let fetcher = FakeFetcher::new(Some(INDEX));

        let first = ingest_day(&fetcher, &repo, day()).await.unwrap();
        assert!(first.fetched);
        assert_eq!(first.candidates(), 4);
        // The two link-less entries collapse onto ("N/A", date).
        assert_eq!(first.inserted(), 3);
        assert_eq!(first.duplicates(), 1);

        let second = ingest_day(&fetcher, &repo, day()).await.unwrap();
        assert_eq!(second.inserted(), 0);
        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_available_keeps_first_title() {
        let (_dir, ctx) = setup().await;
        let repo = ctx.documents();
        let fetcher = FakeFetcher::new(Some(INDEX));

        ingest_day(&fetcher, &repo, day()).await.unwrap();

        let doc = repo.get_by_number("N/A", day()).await.unwrap().unwrap();
        assert_eq!(doc.title, "Anuncio sin enlace");
        assert_eq!(doc.url, "N/A");
        assert_eq!(doc.status, "Publicado");
    }

    #[tokio::test]
    async fn test_missing_page_ingests_nothing() {
        let (_dir, ctx) = setup().await;
        let repo = ctx.documents();
        let fetcher = FakeFetcher::new(None);

        let report = ingest_day(&fetcher, &repo, day()).await.unwrap();
        assert!(!report.fetched);
        assert_eq!(report.inserted(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (_dir, ctx) = setup().await;
        let repo = ctx.documents();

        let err = ingest_day(&BrokenFetcher, &repo, day()).await.unwrap_err();
        assert!(matches!(err, IngestError::Fetch(FetchError::Transport { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_final_rows_independent_of_order() {
        let candidates = vec![
            ScrapedDocument::new(Some("A".into()), Some("BOE-A-1".into()), Some("u1".into())),
            ScrapedDocument::new(Some("B".into()), Some("BOE-A-2".into()), Some("u2".into())),
            ScrapedDocument::new(Some("C".into()), Some("BOE-A-3".into()), Some("u3".into())),
        ];
        let mut reversed = candidates.clone();
        reversed.reverse();

        let (_d1, forward_ctx) = setup().await;
        let (_d2, backward_ctx) = setup().await;
        let forward = forward_ctx.documents();
        let backward = backward_ctx.documents();

        store_candidates(&forward, &candidates, day()).await.unwrap();
        store_candidates(&backward, &reversed, day()).await.unwrap();

        let mut a: Vec<_> = forward
            .get_by_date(day())
            .await
            .unwrap()
            .into_iter()
            .map(|d| (d.number, d.title, d.url))
            .collect();
        let mut b: Vec<_> = backward
            .get_by_date(day())
            .await
            .unwrap()
            .into_iter()
            .map(|d| (d.number, d.title, d.url))
            .collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_inserted_count_independent_of_order() {
        // Two unlinked entries collide on ("N/A", date).
        let candidates = vec![
            ScrapedDocument::new(Some("Anuncio".into()), None, None),
            ScrapedDocument::new(Some("Orden".into()), Some("BOE-A-1".into()), Some("u1".into())),
            ScrapedDocument::new(Some("Edicto".into()), None, None),
        ];
        let mut reversed = candidates.clone();
        reversed.reverse();

        let (_d1, forward_ctx) = setup().await;
        let (_d2, backward_ctx) = setup().await;

        let inserted = |entries: Vec<EntryOutcome>| {
            entries.iter().filter(|e| e.outcome.is_inserted()).count()
        };
        let forward = store_candidates(&forward_ctx.documents(), &candidates, day())
            .await
            .unwrap();
        let backward = store_candidates(&backward_ctx.documents(), &reversed, day())
            .await
            .unwrap();

        assert_eq!(inserted(forward), 2);
        assert_eq!(inserted(backward), 2);
        assert_eq!(forward_ctx.documents().count().await.unwrap(), 2);
        assert_eq!(backward_ctx.documents().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_same_number_on_other_day_is_new() {
        let (_dir, ctx) = setup().await;
        let repo = ctx.documents();
        let fetcher = FakeFetcher::new(Some(INDEX));

        ingest_day(&fetcher, &repo, day()).await.unwrap();
        let next = day().succ_opt().unwrap();
        let report = ingest_day(&fetcher, &repo, next).await.unwrap();
        assert_eq!(report.inserted(), 3);
        assert_eq!(repo.count().await.unwrap(), 6);
    }
}
