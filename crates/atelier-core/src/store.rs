//! Local SQLite store
//!
//! Backs the three external collaborators the sync subsystem consumes:
//! the generic settings row store (last-sync timestamp), the project
//! record store (with its nullable Notion linkage), and the operator
//! access store the gateway resolves tokens and roles through.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::error::SyncError;
use crate::gateway::{AccessStore, Role};
use crate::models::Project;
use crate::status::ConfigStore;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// SQLite-backed store for settings, projects, and operators
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and initialize if needed) a store at the given path
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        debug!("opened store at {:?}", path);
        Ok(Self { conn })
    }

    /// Open an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    // --- projects ---

    /// Insert a new project record
    pub fn add_project(&self, project: &Project) -> Result<(), SyncError> {
        self.conn.execute(
            "INSERT INTO projects (id, title, notion_id, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                project.id.to_string(),
                project.title,
                project.notion_id,
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List all projects, most recently updated first
    pub fn list_projects(&self) -> Result<Vec<Project>, SyncError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, notion_id, updated_at FROM projects ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_project)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    /// Find a project by full id or unique id prefix
    pub fn find_project(&self, id_or_prefix: &str) -> Result<Option<Project>, SyncError> {
        let pattern = format!("{}%", id_or_prefix);
        let mut stmt = self.conn.prepare(
            "SELECT id, title, notion_id, updated_at FROM projects WHERE id LIKE ?1 LIMIT 2",
        )?;
        let mut rows: Vec<Project> = stmt
            .query_map([pattern], row_to_project)?
            .collect::<Result<_, _>>()?;

        match rows.len() {
            1 => Ok(rows.pop()),
            0 => Ok(None),
            _ => Err(SyncError::Store(format!(
                "project id prefix '{}' is ambiguous",
                id_or_prefix
            ))),
        }
    }

    /// Set or clear a project's Notion linkage
    pub fn set_project_linkage(
        &self,
        id: &Uuid,
        notion_id: Option<&str>,
    ) -> Result<(), SyncError> {
        let changed = self.conn.execute(
            "UPDATE projects SET notion_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![notion_id, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(SyncError::Store(format!("project {} not found", id)));
        }
        Ok(())
    }

    /// Upsert a project imported from the remote database
    ///
    /// Matches by Notion page id; returns true when a new local record
    /// was created.
    pub fn upsert_remote_project(&self, notion_id: &str, title: &str) -> Result<bool, SyncError> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE projects SET title = ?1, updated_at = ?2 WHERE notion_id = ?3",
            params![title, now, notion_id],
        )?;
        if changed > 0 {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO projects (id, title, notion_id, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![Uuid::new_v4().to_string(), title, notion_id, now],
        )?;
        Ok(true)
    }

    // --- operators ---

    /// Register an operator with a role, minting a bearer token
    pub fn add_operator(&self, name: &str, role: Role) -> Result<String, SyncError> {
        let token = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO operators (token, name, role) VALUES (?1, ?2, ?3)",
            params![token, name, role.as_str()],
        )?;
        Ok(token)
    }
}

impl ConfigStore for SqliteStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>, SyncError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), SyncError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl AccessStore for SqliteStore {
    fn authenticate(&self, token: &str) -> Result<Option<String>, SyncError> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM operators WHERE token = ?1",
                [token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn role_of(&self, user: &str) -> Result<Option<Role>, SyncError> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM operators WHERE name = ?1",
                [user],
                |row| row.get(0),
            )
            .optional()?;
        Ok(role.map(|r| Role::parse(&r)))
    }
}

/// Initialize the database schema
fn init_schema(conn: &Connection) -> Result<(), SyncError> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Generic key/value settings (holds the last-sync timestamp)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Local project records; notion_id is the sync linkage
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            notion_id TEXT,
            updated_at TEXT NOT NULL
        );

        -- Operators and their roles, resolved by the gateway
        CREATE TABLE IF NOT EXISTS operators (
            token TEXT PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            role TEXT NOT NULL
        );

        -- Linkage lookups during pull upserts
        CREATE INDEX IF NOT EXISTS idx_projects_notion_id ON projects(notion_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let notion_id: Option<String> = row.get(2)?;
    let updated_at: String = row.get(3)?;

    Ok(Project {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        title,
        notion_id,
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
