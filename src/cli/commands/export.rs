//! Export command: one day's documents as CSV.

use std::path::Path;

use chrono::NaiveDate;
use console::style;

use super::helpers::{date_or_today, open_database};
use crate::config::Settings;
use crate::services::export::documents_to_csv;

/// Write the CSV for `date` (default today) to `output` or stdout.
pub async fn cmd_export(
    settings: &Settings,
    date: Option<NaiveDate>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let date = date_or_today(date);
    let documents = ctx.documents().get_by_date(date).await?;
    let csv = documents_to_csv(&documents);

    match output {
        Some(path) => {
            tokio::fs::write(path, csv).await?;
            eprintln!(
                "{} Exported {} documents for {} to {}",
                style("✓").green(),
                documents.len(),
                date,
                path.display()
            );
        }
        None => print!("{}", csv),
    }

    Ok(())
}
