//! Atelier CLI
//!
//! Command-line interface for Atelier - studio projects and work logs
//! kept in sync with a Notion workspace.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atelier_core::{Config, SqliteStore};

mod commands;
mod output;
mod pull;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Atelier - studio records with Notion sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage local project records
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Inspect or mutate the remote database schema (admin only)
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Push local changes to Notion
    Push {
        #[command(subcommand)]
        command: PushCommands,
    },
    /// Pull remote projects into the local store
    Sync,
    /// Show sync status (last sync, linkage counts)
    Status,
    /// Manage operators and their tokens
    Operator {
        #[command(subcommand)]
        command: OperatorCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a new project
    #[command(alias = "add")]
    Create {
        /// Project title
        title: String,
    },
    /// List all projects
    #[command(alias = "ls")]
    List,
    /// Link a project to a Notion page (or clear the linkage)
    Link {
        /// Project ID (full UUID or prefix)
        id: String,
        /// Notion page id
        notion_id: Option<String>,
        /// Remove the existing linkage
        #[arg(long, conflicts_with = "notion_id")]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Fetch a database schema
    Get {
        /// Notion database id (hyphenated or bare)
        database_id: String,
        /// Operator bearer token
        #[arg(long)]
        token: String,
    },
    /// Create a property on a database
    AddProperty {
        /// Notion database id (hyphenated or bare)
        database_id: String,
        /// Property name
        name: String,
        /// Property type (unrecognized types fall back to rich_text)
        #[arg(value_name = "TYPE")]
        property_type: String,
        /// Operator bearer token
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
enum PushCommands {
    /// Push project fields to its linked Notion page
    Project {
        /// Project ID (full UUID or prefix)
        id: String,
        /// JSON property map to send
        #[arg(long)]
        data: String,
        /// Surface a notification with the result
        #[arg(long)]
        announce: bool,
    },
    /// Push a work-log entry
    WorkLog {
        /// Hours worked (0 < hours <= 24)
        #[arg(long)]
        hours: f64,
        /// When the work happened (RFC 3339, defaults to now)
        #[arg(long)]
        date: Option<String>,
        /// Task type (repeatable, at least one)
        #[arg(short, long = "task-type")]
        task_type: Vec<String>,
        /// Notes (max 500 characters)
        #[arg(long)]
        notes: Option<String>,
        /// Project title the work belongs to
        #[arg(long)]
        project: String,
        /// Surface a notification with the result
        #[arg(long)]
        announce: bool,
    },
}

#[derive(Subcommand)]
enum OperatorCommands {
    /// Register an operator and mint a bearer token
    Add {
        /// Operator name
        name: String,
        /// Role ("admin" unlocks schema operations)
        #[arg(long, default_value = "member")]
        role: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, notion.token, notion.base_url, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load()?;
    let store = SqliteStore::open(&config.sqlite_path())?;

    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommands::Create { title } => commands::project::add(&store, title, &output),
            ProjectCommands::List => commands::project::list(&store, &output),
            ProjectCommands::Link {
                id,
                notion_id,
                clear,
            } => commands::project::link(&store, id, notion_id, clear, &output),
        },
        Commands::Schema { command } => match command {
            SchemaCommands::Get { database_id, token } => {
                commands::schema::get(&config, &store, token, database_id, &output).await
            }
            SchemaCommands::AddProperty {
                database_id,
                name,
                property_type,
                token,
            } => {
                commands::schema::add_property(
                    &config,
                    &store,
                    token,
                    database_id,
                    name,
                    property_type,
                    &output,
                )
                .await
            }
        },
        Commands::Push { command } => match command {
            PushCommands::Project { id, data, announce } => {
                commands::push::project(&config, &store, id, data, announce, &output).await
            }
            PushCommands::WorkLog {
                hours,
                date,
                task_type,
                notes,
                project,
                announce,
            } => {
                commands::push::work_log(
                    &config, &store, hours, date, task_type, notes, project, announce, &output,
                )
                .await
            }
        },
        Commands::Sync => commands::sync::run(&config, &store, &output).await,
        Commands::Status => commands::status::show(&config, &store, &output),
        Commands::Operator { command } => match command {
            OperatorCommands::Add { name, role } => {
                commands::operator::add(&store, name, role, &output)
            }
        },
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atelier_core=warn,atelier_cli=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
