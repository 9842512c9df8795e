//! Push command handlers

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use atelier_core::remote::RemoteClient;
use atelier_core::{
    Config, Notify, PushCoordinator, PushOutcome, PushRequest, SqliteStore, SyncStatusTracker,
    WorkLogSubmission,
};

use crate::output::{Output, OutputFormat};

/// Notifier that surfaces push results on the console
struct ConsoleNotifier;

impl Notify for ConsoleNotifier {
    fn notify(&self, message: &str, success: bool) {
        if success {
            println!("✓ {}", message);
        } else {
            eprintln!("✗ {}", message);
        }
    }
}

/// Push local project changes to its linked Notion page
pub async fn project(
    config: &Config,
    store: &SqliteStore,
    id: String,
    data: String,
    announce: bool,
    output: &Output,
) -> Result<()> {
    let Some(project) = store.find_project(&id)? else {
        bail!("Project '{}' not found", id);
    };

    let update: Value =
        serde_json::from_str(&data).context("--data must be a JSON property map")?;

    let request = PushRequest::Project {
        notion_id: project.notion_id.clone(),
        data: update,
    };
    let coordinator = coordinator(config, announce)?;
    let outcome = coordinator.push(&request, announce).await;

    finish(store, outcome, output)
}

/// Push a work-log entry to the configured log database
#[allow(clippy::too_many_arguments)]
pub async fn work_log(
    config: &Config,
    store: &SqliteStore,
    hours: f64,
    date: Option<String>,
    task_type: Vec<String>,
    notes: Option<String>,
    project_title: String,
    announce: bool,
    output: &Output,
) -> Result<()> {
    let logged_at = match date {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("invalid --date '{}', expected RFC 3339", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let entry = WorkLogSubmission {
        hours,
        logged_at,
        task_type,
        notes,
        project_title,
    };

    let request = PushRequest::WorkLog { data: entry };
    let coordinator = coordinator(config, announce)?;
    let outcome = coordinator.push(&request, announce).await;

    finish(store, outcome, output)
}

fn coordinator(config: &Config, announce: bool) -> Result<PushCoordinator<RemoteClient>> {
    let client = RemoteClient::new(&config.notion)?;
    let mut coordinator =
        PushCoordinator::new(client, config.notion.work_log_database_id.clone());
    if announce {
        coordinator = coordinator.with_notifier(Box::new(ConsoleNotifier));
    }
    Ok(coordinator)
}

/// Record the completion timestamp and render the outcome
fn finish(store: &SqliteStore, outcome: PushOutcome, output: &Output) -> Result<()> {
    if outcome.success {
        SyncStatusTracker::new(store).record_success()?;
    }

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        _ => {
            if outcome.success {
                match outcome.page_id {
                    Some(ref id) => output.success(&format!("Pushed (page {})", id)),
                    None => output.success("Pushed"),
                }
                Ok(())
            } else {
                bail!(outcome.error.unwrap_or_else(|| "push failed".to_string()))
            }
        }
    }
}
