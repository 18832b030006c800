//! End-to-end ingestion tests.
//!
//! Serves a fixture daily index from a local axum server and runs the real
//! fetcher and SQLite store against it.

use std::time::Duration;

use axum::{extract::Path, http::StatusCode, response::Html, routing::get, Router};
use chrono::NaiveDate;
use tempfile::TempDir;

use boletin::repository::DbContext;
use boletin::scrapers::{BoeFetcher, HttpClient};
use boletin::services::ingest_day;

const FIXTURE: &str = r#"
<html><body><ul>
  <li class="dispo">
    <p>Real Decreto 100/2024, de 9 de enero, por el que se regula el registro.</p>
    <div class="puntoPDF"><a href="/boe/dias/2024/01/10/pdfs/BOE-A-2024-500.pdf">PDF</a></div>
  </li>
  <li class="dispo">
    <p>Orden ECO/12/2024, de 8 de enero.</p>
    <div class="puntoPDF"><a href="/boe/dias/2024/01/10/pdfs/BOE-A-2024-501.pdf">PDF</a></div>
  </li>
  <li class="dispo">
    <p>Anuncio sin enlace.</p>
  </li>
</ul></body></html>
"#;

async fn day_index(
    Path((year, month, day)): Path<(String, String, String)>,
) -> Result<Html<&'static str>, StatusCode> {
    if (year.as_str(), month.as_str(), day.as_str()) == ("2024", "01", "10") {
        Ok(Html(FIXTURE))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Start the fixture server and return its base URL.
async fn spawn_fixture_server() -> String {
    let app = Router::new().route("/boe/dias/:year/:month/:day/", get(day_index));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn setup() -> (TempDir, DbContext, BoeFetcher) {
    let dir = TempDir::new().unwrap();
    let ctx = DbContext::new(&dir.path().join("boletin.db"));
    ctx.init_schema().await.unwrap();

    let base_url = spawn_fixture_server().await;
    let client = HttpClient::new(Duration::from_secs(5)).unwrap();
    (dir, ctx, BoeFetcher::new(client, &base_url))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[tokio::test]
async fn test_ingest_from_live_server() {
    let (_dir, ctx, fetcher) = setup().await;
    let repo = ctx.documents();

    let report = ingest_day(&fetcher, &repo, day(10)).await.unwrap();
    assert!(report.fetched);
    assert_eq!(report.candidates(), 3);
    assert_eq!(report.inserted(), 3);

    let stored = repo.get_by_date(day(10)).await.unwrap();
    assert_eq!(stored.len(), 3);

    let doc = repo
        .get_by_number("BOE-A-2024-500", day(10))
        .await
        .unwrap()
        .unwrap();
    assert!(doc.title.starts_with("Real Decreto 100/2024"));
    assert!(doc.url.ends_with("/boe/dias/2024/01/10/pdfs/BOE-A-2024-500.pdf"));
    assert_eq!(doc.status, "Publicado");

    let unlinked = repo.get_by_number("N/A", day(10)).await.unwrap().unwrap();
    assert_eq!(unlinked.url, "N/A");
    assert_eq!(unlinked.title, "Anuncio sin enlace.");
}

#[tokio::test]
async fn test_second_run_inserts_nothing() {
    let (_dir, ctx, fetcher) = setup().await;
    let repo = ctx.documents();

    ingest_day(&fetcher, &repo, day(10)).await.unwrap();
    let again = ingest_day(&fetcher, &repo, day(10)).await.unwrap();

    assert_eq!(again.candidates(), 3);
    assert_eq!(again.inserted(), 0);
    assert_eq!(again.duplicates(), 3);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_missing_day_is_not_an_error() {
    let (_dir, ctx, fetcher) = setup().await;
    let repo = ctx.documents();

    let report = ingest_day(&fetcher, &repo, day(11)).await.unwrap();
    assert!(!report.fetched);
    assert_eq!(report.inserted(), 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    let dir = TempDir::new().unwrap();
    let ctx = DbContext::new(&dir.path().join("boletin.db"));
    ctx.init_schema().await.unwrap();

    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(Duration::from_secs(2)).unwrap();
    let fetcher = BoeFetcher::new(client, &format!("http://{}", addr));

    let result = ingest_day(&fetcher, &ctx.documents(), day(10)).await;
    assert!(result.is_err());
    assert_eq!(ctx.documents().count().await.unwrap(), 0);
}
