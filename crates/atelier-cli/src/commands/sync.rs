//! Sync command handler

use anyhow::{bail, Result};

use atelier_core::remote::RemoteClient;
use atelier_core::{Config, SqliteStore, SyncStatusTracker};

use crate::output::Output;
use crate::pull::DatabasePull;

/// Run a manual pull sync from the remote project database
pub async fn run(config: &Config, store: &SqliteStore, output: &Output) -> Result<()> {
    let Some(ref database_id) = config.notion.project_database_id else {
        bail!(
            "Project database not configured. Set it with:\n  \
             atelier config set notion.project_database_id <id>"
        );
    };

    let client = RemoteClient::new(&config.notion)?;
    let tracker = SyncStatusTracker::new(store);
    let pull = DatabasePull::new(client, database_id.clone(), store);

    output.message("Syncing from Notion...");

    let result = tracker.trigger(&pull).await;
    if result.success {
        let imported = result.data.map(|s| s.imported).unwrap_or(0);
        output.success(&format!("Sync complete - {} project(s) imported", imported));
        Ok(())
    } else {
        bail!(result.error.unwrap_or_else(|| "sync failed".to_string()))
    }
}
