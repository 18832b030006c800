//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    for table in ctx.list_tables().await? {
        println!("  {} Table ready: {}", style("✓").green(), table);
    }

    println!(
        "{} Initialized boletin in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
