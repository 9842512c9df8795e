//! Data models for Atelier
//!
//! Defines the local record types (projects, work-log submissions) and the
//! uniform result envelope every sync operation returns at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SyncError;

/// Maximum hours a single work-log entry may carry
pub const MAX_LOG_HOURS: f64 = 24.0;

/// Maximum length of work-log notes, in characters
pub const MAX_NOTES_LEN: usize = 500;

/// A studio project tracked locally, optionally linked to a Notion page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier
    pub id: Uuid,
    /// Project title
    pub title: String,
    /// Notion page id, when this record is linked to a remote page.
    /// No outbound push may happen while this is `None`.
    pub notion_id: Option<String>,
    /// When this project was last updated locally
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new unlinked project
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            notion_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Create a project with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            notion_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Set or clear the remote linkage
    pub fn set_linkage(&mut self, notion_id: Option<String>) {
        self.notion_id = notion_id;
        self.updated_at = Utc::now();
    }

    /// Whether this project can be pushed to the remote service
    pub fn is_linked(&self) -> bool {
        self.notion_id.is_some()
    }
}

/// A work-log entry submitted for outbound push
///
/// Ephemeral: constructed per push call, never persisted by the sync
/// subsystem itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkLogSubmission {
    /// Hours worked, positive and at most 24
    pub hours: f64,
    /// When the work happened
    pub logged_at: DateTime<Utc>,
    /// Task categories, at least one required
    pub task_type: Vec<String>,
    /// Free-form notes, at most 500 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Title of the project the work belongs to
    pub project_title: String,
}

impl WorkLogSubmission {
    /// Validate the submission before any remote call is attempted
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.hours.is_finite() || self.hours <= 0.0 {
            return Err(SyncError::Validation(
                "hours must be a positive number".to_string(),
            ));
        }
        if self.hours > MAX_LOG_HOURS {
            return Err(SyncError::Validation(format!(
                "hours cannot exceed {}",
                MAX_LOG_HOURS
            )));
        }
        if self.task_type.is_empty() {
            return Err(SyncError::Validation(
                "at least one task type is required".to_string(),
            ));
        }
        if let Some(ref notes) = self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(SyncError::Validation(format!(
                    "notes cannot exceed {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }
        if self.project_title.trim().is_empty() {
            return Err(SyncError::Validation(
                "project title is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Uniform result envelope returned by every sync operation
///
/// Failures are always normalized into this shape; callers never see a
/// panic or a raw error type across the subsystem boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> SyncResult<T> {
    /// Successful result carrying a payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed result carrying a normalized message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, SyncError>> for SyncResult<T> {
    fn from(result: Result<T, SyncError>) -> Self {
        match result {
            Ok(data) => SyncResult::ok(data),
            Err(e) => SyncResult::err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_log() -> WorkLogSubmission {
        WorkLogSubmission {
            hours: 6.5,
            logged_at: Utc::now(),
            task_type: vec!["editing".to_string()],
            notes: Some("rough cut pass".to_string()),
            project_title: "Spring Campaign".to_string(),
        }
    }

    #[test]
    fn test_project_linkage() {
        let mut project = Project::new("Spring Campaign");
        assert!(!project.is_linked());

        project.set_linkage(Some("abc123".to_string()));
        assert!(project.is_linked());

        project.set_linkage(None);
        assert!(!project.is_linked());
    }

    #[test]
    fn test_work_log_valid() {
        assert!(valid_log().validate().is_ok());
    }

    #[test]
    fn test_work_log_rejects_zero_hours() {
        let mut log = valid_log();
        log.hours = 0.0;
        assert!(matches!(log.validate(), Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_work_log_rejects_excess_hours() {
        let mut log = valid_log();
        log.hours = 24.5;
        assert!(matches!(log.validate(), Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_work_log_accepts_full_day() {
        let mut log = valid_log();
        log.hours = 24.0;
        assert!(log.validate().is_ok());
    }

    #[test]
    fn test_work_log_rejects_empty_task_types() {
        let mut log = valid_log();
        log.task_type.clear();
        assert!(matches!(log.validate(), Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_work_log_rejects_long_notes() {
        let mut log = valid_log();
        log.notes = Some("n".repeat(MAX_NOTES_LEN + 1));
        assert!(matches!(log.validate(), Err(SyncError::Validation(_))));

        log.notes = Some("n".repeat(MAX_NOTES_LEN));
        assert!(log.validate().is_ok());
    }

    #[test]
    fn test_sync_result_from_result() {
        let ok: SyncResult<u32> = Ok(7).into();
        assert!(ok.success);
        assert_eq!(ok.data, Some(7));
        assert!(ok.error.is_none());

        let err: SyncResult<u32> = Err::<u32, _>(SyncError::LinkageMissing).into();
        assert!(!err.success);
        assert!(err.data.is_none());
        assert!(err.error.unwrap().contains("not linked"));
    }

    #[test]
    fn test_sync_result_serialization_omits_empty_fields() {
        let ok = SyncResult::ok(1);
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("error"));

        let err: SyncResult<u32> = SyncResult::err("boom");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("data"));
        assert!(json.contains("boom"));
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::new("Test");
        let json = serde_json::to_string(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project, parsed);
    }
}
