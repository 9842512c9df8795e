//! Sync status tracking
//!
//! Persists and reports "last successful sync" timestamps and owns the
//! manual-trigger affordance. This is the only mutable shared state in
//! the sync subsystem: the in-progress flag serializes manual triggers
//! so at most one sync is in flight per tracker.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SyncError;
use crate::models::SyncResult;

/// Config-store key holding the last successful sync timestamp
pub const LAST_SYNC_KEY: &str = "last_notion_sync";

/// Generic `(key) -> value` config persistence, consumed as an external
/// collaborator
pub trait ConfigStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>, SyncError>;
    fn set_setting(&self, key: &str, value: &str) -> Result<(), SyncError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get_setting(&self, key: &str) -> Result<Option<String>, SyncError> {
        (**self).get_setting(key)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), SyncError> {
        (**self).set_setting(key, value)
    }
}

/// Trigger contract for the inbound pull-sync job
///
/// The job's internals (importing remote records into local storage) are
/// an external concern; the tracker only owns when it runs and how its
/// completion is recorded.
#[allow(async_fn_in_trait)]
pub trait PullSync {
    async fn pull(&self) -> Result<PullSummary, SyncError>;
}

/// Summary reported by a completed pull
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullSummary {
    /// Remote records imported or refreshed locally
    pub imported: usize,
}

/// Last-sync display state
///
/// `Unknown` means a timestamp was stored but no longer parses; that is
/// distinct from `Never`, which means no sync has ever completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastSync {
    Never,
    Unknown,
    At(DateTime<Utc>),
}

impl std::fmt::Display for LastSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LastSync::Never => write!(f, "never synced"),
            LastSync::Unknown => write!(f, "unknown"),
            LastSync::At(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
        }
    }
}

/// Tracks sync completion and serializes manual triggers
pub struct SyncStatusTracker<C: ConfigStore> {
    store: C,
    in_progress: AtomicBool,
}

impl<C: ConfigStore> SyncStatusTracker<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Read the last successful sync timestamp
    ///
    /// A missing row is the normal never-synced state, not an error.
    pub fn last_sync(&self) -> Result<LastSync, SyncError> {
        match self.store.get_setting(LAST_SYNC_KEY)? {
            None => Ok(LastSync::Never),
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(dt) => Ok(LastSync::At(dt.with_timezone(&Utc))),
                Err(e) => {
                    warn!("stored sync timestamp '{}' no longer parses: {}", raw, e);
                    Ok(LastSync::Unknown)
                }
            },
        }
    }

    /// Whether a manual sync is currently in flight
    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Record a successful sync completion (push or pull) at the current
    /// time
    pub fn record_success(&self) -> Result<(), SyncError> {
        self.store
            .set_setting(LAST_SYNC_KEY, &Utc::now().to_rfc3339())
    }

    /// Run a manual sync through the pull trigger
    ///
    /// Overlapping triggers are rejected with a compare-and-swap on the
    /// in-progress flag. On success the current time becomes the new
    /// last-sync value; on failure the previous timestamp is left
    /// untouched and the error is surfaced in the envelope.
    pub async fn trigger<P: PullSync>(&self, puller: &P) -> SyncResult<PullSummary> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SyncResult::err("A sync is already in progress");
        }

        let result = self.run_pull(puller).await;
        self.in_progress.store(false, Ordering::SeqCst);
        result.into()
    }

    async fn run_pull<P: PullSync>(&self, puller: &P) -> Result<PullSummary, SyncError> {
        let summary = puller.pull().await?;
        self.record_success()?;
        info!("sync complete, {} records imported", summary.imported);
        Ok(summary)
    }
}
