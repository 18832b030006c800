//! Fetch command: ingest one day of the bulletin.

use chrono::NaiveDate;
use console::style;

use super::helpers::{date_or_today, open_database};
use crate::config::Settings;
use crate::repository::InsertOutcome;
use crate::scrapers::{boe::day_index_url, BoeFetcher};
use crate::services::ingest_day;

/// Fetch the index for `date` (default today) and store new documents.
pub async fn cmd_fetch(settings: &Settings, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let date = date_or_today(date);
    let fetcher = BoeFetcher::from_settings(settings)?;
    let repo = ctx.documents();

    println!(
        "{} Fetching {}",
        style("→").cyan(),
        day_index_url(&settings.base_url, date)
    );

    let report = ingest_day(&fetcher, &repo, date).await?;

    if !report.fetched {
        println!(
            "{} No bulletin published for {}",
            style("!").yellow(),
            date
        );
        return Ok(());
    }

    for entry in &report.entries {
        if entry.outcome == InsertOutcome::Inserted {
            println!("  {} {} {}", style("+").green(), entry.number, entry.title);
        }
    }

    println!(
        "{} {} new documents ({} already stored) for {}",
        style("✓").green(),
        report.inserted(),
        report.duplicates(),
        date
    );

    Ok(())
}
