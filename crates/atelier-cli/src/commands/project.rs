//! Project command handlers

use anyhow::{bail, Result};

use atelier_core::{Project, SqliteStore};

use crate::output::Output;

/// Create a new local project record
pub fn add(store: &SqliteStore, title: String, output: &Output) -> Result<()> {
    let project = Project::new(title);
    store.add_project(&project)?;

    if output.is_quiet() {
        println!("{}", project.id);
    } else {
        output.success(&format!("Added project {} ({})", project.title, project.id));
    }
    Ok(())
}

/// List all local projects
pub fn list(store: &SqliteStore, output: &Output) -> Result<()> {
    let projects = store.list_projects()?;
    output.print_projects(&projects);
    Ok(())
}

/// Set or clear a project's Notion linkage
pub fn link(
    store: &SqliteStore,
    id: String,
    notion_id: Option<String>,
    clear: bool,
    output: &Output,
) -> Result<()> {
    let Some(project) = store.find_project(&id)? else {
        bail!("Project '{}' not found", id);
    };

    if clear {
        store.set_project_linkage(&project.id, None)?;
        output.success(&format!("Unlinked {}", project.title));
        return Ok(());
    }

    let Some(notion_id) = notion_id else {
        bail!("Provide a Notion page id, or --clear to remove the linkage");
    };

    store.set_project_linkage(&project.id, Some(&notion_id))?;
    output.success(&format!("Linked {} to {}", project.title, notion_id));
    Ok(())
}
