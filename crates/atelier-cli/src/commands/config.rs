//! Config command handler

use anyhow::{bail, Result};

use atelier_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
///
/// The Notion token is held server-side only and never echoed back.
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "notion": {
                        "token": mask(&config.notion.token),
                        "base_url": config.notion.base_url,
                        "api_version": config.notion.api_version,
                        "project_database_id": config.notion.project_database_id,
                        "work_log_database_id": config.notion.work_log_database_id,
                    }
                })
            );
        }
        OutputFormat::Human | OutputFormat::Quiet => {
            println!("data_dir = {}", config.data_dir.display());
            println!("notion.token = {}", mask(&config.notion.token));
            println!("notion.base_url = {}", config.notion.base_url);
            println!("notion.api_version = {}", config.notion.api_version);
            println!(
                "notion.project_database_id = {}",
                config.notion.project_database_id.as_deref().unwrap_or("-")
            );
            println!(
                "notion.work_log_database_id = {}",
                config.notion.work_log_database_id.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load()?;

    match key.as_str() {
        "data_dir" => config.data_dir = value.clone().into(),
        "notion.token" => config.notion.token = value.clone(),
        "notion.base_url" => config.notion.base_url = value.clone(),
        "notion.project_database_id" => {
            config.notion.project_database_id = non_empty(&value);
        }
        "notion.work_log_database_id" => {
            config.notion.work_log_database_id = non_empty(&value);
        }
        other => bail!(
            "Unknown config key: {}. Valid keys: data_dir, notion.token, \
             notion.base_url, notion.project_database_id, notion.work_log_database_id",
            other
        ),
    }

    config.save()?;
    output.success(&format!("Set {}", key));
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn mask(token: &str) -> String {
    if token.is_empty() {
        "-".to_string()
    } else {
        // char-based head so multibyte tokens cannot split a codepoint
        let head: String = token.chars().take(4).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_hides_token() {
        assert_eq!(mask(""), "-");
        assert_eq!(mask("secret_abcdef"), "secr…");
        assert_eq!(mask("ab"), "ab…");
    }

    #[test]
    fn test_mask_multibyte_token() {
        assert_eq!(mask("ñëw_token"), "ñëw_…");
        assert_eq!(mask("éé"), "éé…");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("db"), Some("db".to_string()));
    }
}
