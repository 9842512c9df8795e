//! Status command handler

use anyhow::Result;

use atelier_core::{Config, LastSync, SqliteStore, SyncStatusTracker};

use crate::output::{Output, OutputFormat};

/// Show sync status information
pub fn show(config: &Config, store: &SqliteStore, output: &Output) -> Result<()> {
    let tracker = SyncStatusTracker::new(store);
    let last_sync = tracker.last_sync()?;

    let projects = store.list_projects()?;
    let linked = projects.iter().filter(|p| p.is_linked()).count();

    match output.format {
        OutputFormat::Json => {
            let last = match last_sync {
                LastSync::Never => serde_json::Value::Null,
                LastSync::Unknown => serde_json::json!("unknown"),
                LastSync::At(dt) => serde_json::json!(dt.to_rfc3339()),
            };
            println!(
                "{}",
                serde_json::json!({
                    "last_sync": last,
                    "projects": projects.len(),
                    "linked": linked,
                    "project_database_configured": config.notion.project_database_id.is_some(),
                    "work_log_database_configured": config.notion.work_log_database_id.is_some(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", last_sync);
        }
        OutputFormat::Human => {
            println!("Atelier Status");
            println!("==============");
            println!();
            println!("Last sync: {}", last_sync);
            println!();
            println!("Projects:");
            println!("  Total:  {}", projects.len());
            println!("  Linked: {}", linked);
            println!();
            println!("Notion:");
            println!(
                "  Project database:  {}",
                config.notion.project_database_id.as_deref().unwrap_or("-")
            );
            println!(
                "  Work log database: {}",
                config.notion.work_log_database_id.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
