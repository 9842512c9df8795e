//! Outbound push coordination
//!
//! Decides what outbound changes to send, guards against pushing records
//! with no remote linkage, and normalizes every result into a
//! `PushOutcome`. Presentation is kept out of the push computation: the
//! coordinator returns a value, and an optional `Notify` observer decides
//! whether to surface it.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::SyncError;
use crate::models::WorkLogSubmission;
use crate::remote::{format_database_id, RemoteTransport};

/// Observer for user-facing push notifications
pub trait Notify {
    fn notify(&self, message: &str, success: bool);
}

/// Typed outbound push payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushRequest {
    /// Update an already-linked project page
    Project {
        #[serde(default)]
        notion_id: Option<String>,
        /// Notion-shaped property map for the page update
        data: Value,
    },
    /// Append a work-log entry
    WorkLog { data: WorkLogSubmission },
}

/// Normalized result of a push operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushOutcome {
    pub success: bool,
    #[serde(rename = "pageId", skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PushOutcome {
    fn ok(page_id: Option<String>) -> Self {
        Self {
            success: true,
            page_id,
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            page_id: None,
            error: Some(message.into()),
        }
    }
}

/// Coordinates outbound pushes to the remote service
pub struct PushCoordinator<T: RemoteTransport> {
    remote: T,
    work_log_database_id: Option<String>,
    notifier: Option<Box<dyn Notify + Send + Sync>>,
}

impl<T: RemoteTransport> PushCoordinator<T> {
    pub fn new(remote: T, work_log_database_id: Option<String>) -> Self {
        Self {
            remote,
            work_log_database_id,
            notifier: None,
        }
    }

    /// Attach an observer that surfaces push results to the user
    pub fn with_notifier(mut self, notifier: Box<dyn Notify + Send + Sync>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Dispatch a typed push payload
    pub async fn push(&self, request: &PushRequest, announce: bool) -> PushOutcome {
        match request {
            PushRequest::Project { notion_id, data } => {
                self.push_project_update(notion_id.as_deref(), data, announce)
                    .await
            }
            PushRequest::WorkLog { data } => self.push_work_log(data, announce).await,
        }
    }

    /// Push local project changes to its linked remote page
    ///
    /// A record with no remote linkage short-circuits with a typed failure
    /// and zero network calls. That is a guard, not a remote error; callers
    /// may ignore it silently.
    pub async fn push_project_update(
        &self,
        notion_id: Option<&str>,
        update: &Value,
        announce: bool,
    ) -> PushOutcome {
        let outcome = match notion_id {
            None => {
                debug!("skipping project push: no remote linkage");
                PushOutcome::err(SyncError::LinkageMissing.to_string())
            }
            Some(id) => {
                let path = format!("/pages/{}", id);
                let body = json!({"properties": update});
                match self.remote.call(Method::PATCH, &path, Some(body)).await {
                    Ok(response) => {
                        info!("pushed project update to page {}", id);
                        PushOutcome::ok(extract_page_id(response.as_ref()))
                    }
                    Err(e) => PushOutcome::err(e.to_string()),
                }
            }
        };

        self.announce(&outcome, announce, "Project update");
        outcome
    }

    /// Push a work-log entry as a new page in the configured log database
    ///
    /// Work logs are not gated by a per-record linkage. The submission is
    /// validated locally; a missing log database surfaces as a normalized
    /// failure the same way the remote side would report it.
    pub async fn push_work_log(&self, entry: &WorkLogSubmission, announce: bool) -> PushOutcome {
        let outcome = self.work_log_outcome(entry).await;
        self.announce(&outcome, announce, "Work log");
        outcome
    }

    async fn work_log_outcome(&self, entry: &WorkLogSubmission) -> PushOutcome {
        if let Err(e) = entry.validate() {
            return PushOutcome::err(e.to_string());
        }

        let Some(ref database_id) = self.work_log_database_id else {
            return PushOutcome::err("Work log database is not configured");
        };

        let body = json!({
            "parent": {"database_id": format_database_id(database_id)},
            "properties": work_log_properties(entry),
        });

        match self.remote.call(Method::POST, "/pages", Some(body)).await {
            Ok(response) => {
                info!("pushed work log for '{}'", entry.project_title);
                PushOutcome::ok(extract_page_id(response.as_ref()))
            }
            Err(e) => PushOutcome::err(e.to_string()),
        }
    }

    /// Surface an outcome through the observer when asked to
    ///
    /// The push itself always executes regardless of the announce flag;
    /// the flag only controls surfacing, enabling silent background pushes.
    fn announce(&self, outcome: &PushOutcome, announce: bool, label: &str) {
        if !announce {
            return;
        }
        let Some(ref notifier) = self.notifier else {
            return;
        };

        let message = if outcome.success {
            format!("{} synced to Notion", label)
        } else {
            format!(
                "{} sync failed: {}",
                label,
                outcome.error.as_deref().unwrap_or("unknown error")
            )
        };
        notifier.notify(&message, outcome.success);
    }
}

/// Shape the canonical work-log submission into Notion page properties
fn work_log_properties(entry: &WorkLogSubmission) -> Value {
    let mut properties = json!({
        "Name": {"title": [{"text": {"content": entry.project_title}}]},
        "Hours": {"number": entry.hours},
        "Date": {"date": {"start": entry.logged_at.to_rfc3339()}},
        "Task Type": {
            "multi_select": entry
                .task_type
                .iter()
                .map(|t| json!({"name": t}))
                .collect::<Vec<_>>()
        },
    });

    if let Some(ref notes) = entry.notes {
        properties["Notes"] = json!({"rich_text": [{"text": {"content": notes}}]});
    }

    properties
}

fn extract_page_id(response: Option<&Value>) -> Option<String> {
    response?
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
