//! Operator command handler

use anyhow::Result;

use atelier_core::{Role, SqliteStore};

use crate::output::{Output, OutputFormat};

/// Register an operator and mint their bearer token
pub fn add(store: &SqliteStore, name: String, role: String, output: &Output) -> Result<()> {
    let role = Role::parse(&role);
    let token = store.add_operator(&name, role)?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({"name": name, "role": role.as_str(), "token": token})
            );
        }
        OutputFormat::Quiet => println!("{}", token),
        OutputFormat::Human => {
            output.success(&format!("Added operator {} ({})", name, role.as_str()));
            println!("Token: {}", token);
            println!("Pass it to schema commands with --token. It is not shown again.");
        }
    }
    Ok(())
}
