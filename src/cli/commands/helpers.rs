//! Shared helper functions for CLI commands.

use chrono::{Local, NaiveDate};

use crate::config::Settings;
use crate::repository::DbContext;

/// Open the configured database, refusing to create it implicitly.
pub fn open_database(settings: &Settings) -> anyhow::Result<DbContext> {
    if !settings.database_exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'boletin init' first.",
            settings.database_path().display()
        );
    }
    Ok(settings.create_db_context())
}

/// The given date, or today's local date.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Truncate a string to at most `max` characters, with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
