//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use atelier_core::remote::RemoteProperty;
use atelier_core::Project;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a list of projects
    pub fn print_projects(&self, projects: &[Project]) {
        match self.format {
            OutputFormat::Human => {
                if projects.is_empty() {
                    println!("No projects found.");
                    return;
                }
                for project in projects {
                    let linkage = match project.notion_id {
                        Some(ref id) => format!("notion:{}", truncate(id, 12)),
                        None => "unlinked".to_string(),
                    };
                    println!(
                        "{} | {} | {}",
                        &project.id.to_string()[..8],
                        truncate(&project.title, 40),
                        linkage
                    );
                }
                println!("\n{} project(s)", projects.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(projects).unwrap());
            }
            OutputFormat::Quiet => {
                for project in projects {
                    println!("{}", project.id);
                }
            }
        }
    }

    /// Print a remote database schema
    pub fn print_properties(&self, properties: &[RemoteProperty]) {
        match self.format {
            OutputFormat::Human => {
                if properties.is_empty() {
                    println!("No properties declared.");
                    return;
                }
                for property in properties {
                    match property.options {
                        Some(ref options) => {
                            let names: Vec<&str> =
                                options.iter().map(|o| o.name.as_str()).collect();
                            println!(
                                "{:<30} {:<14} [{}]",
                                property.name,
                                property.kind.as_str(),
                                names.join(", ")
                            );
                        }
                        None => {
                            println!("{:<30} {}", property.name, property.kind.as_str());
                        }
                    }
                }
                println!("\n{} propert(ies)", properties.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(properties).unwrap());
            }
            OutputFormat::Quiet => {
                for property in properties {
                    println!("{}", property.name);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length in characters, adding "..." if
/// truncated. Counts chars, not bytes, so multibyte titles are never
/// split mid-codepoint.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte_title() {
        // 21 accented chars is 42 bytes; must not split a codepoint
        let title = "é".repeat(21);
        assert_eq!(truncate(&title, 40), title);

        let long = "é".repeat(50);
        let cut = truncate(&long, 40);
        assert_eq!(cut.chars().count(), 40);
        assert!(cut.ends_with("..."));
    }
}
