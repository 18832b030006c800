//! Client management commands.

use console::style;

use super::helpers::{open_database, truncate};
use crate::config::Settings;
use crate::models::Client;

/// Create a client for `owner`.
pub async fn cmd_client_add(settings: &Settings, owner: &str, name: &str) -> anyhow::Result<()> {
    let name = Client::validate_name(name).map_err(|e| anyhow::anyhow!(e))?;
    let ctx = open_database(settings)?;

    let client = ctx.clients().create(owner, name).await?;
    println!(
        "{} Created client {} ({}) for {}",
        style("✓").green(),
        client.id,
        client.name,
        client.owner
    );

    Ok(())
}

/// List `owner`'s clients with their assigned document counts.
pub async fn cmd_client_list(settings: &Settings, owner: &str) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let summaries = ctx.clients().summaries_for_owner(owner).await?;

    if summaries.is_empty() {
        println!("{} No clients for {}", style("!").yellow(), owner);
        return Ok(());
    }

    println!("\n{}", style(format!("Clients of {}", owner)).bold());
    println!("{}", "-".repeat(60));
    println!("{:<6} {:<40} Documents", "ID", "Name");
    println!("{}", "-".repeat(60));

    for summary in summaries {
        println!(
            "{:<6} {:<40} {}",
            summary.client.id,
            truncate(&summary.client.name, 39),
            summary.document_count
        );
    }

    Ok(())
}

/// Rename a client.
pub async fn cmd_client_rename(settings: &Settings, id: i32, name: &str) -> anyhow::Result<()> {
    let name = Client::validate_name(name).map_err(|e| anyhow::anyhow!(e))?;
    let ctx = open_database(settings)?;

    if !ctx.clients().rename(id, name).await? {
        anyhow::bail!("Client {} not found", id);
    }

    println!("{} Renamed client {} to {}", style("✓").green(), id, name);
    Ok(())
}

/// Delete a client. Its priorities go with it.
pub async fn cmd_client_remove(settings: &Settings, id: i32) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;

    if !ctx.clients().delete(id).await? {
        anyhow::bail!("Client {} not found", id);
    }

    println!("{} Removed client {}", style("✓").green(), id);
    Ok(())
}
