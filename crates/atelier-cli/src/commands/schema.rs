//! Schema command handlers
//!
//! Schema operations always go through the sync gateway, so the same
//! admin-only authorization applies whether the caller is this CLI or
//! anything else holding an operator token.

use anyhow::{bail, Result};

use atelier_core::remote::{RemoteClient, RemoteProperty};
use atelier_core::{Config, GatewayResponse, SchemaRequest, SqliteStore, StatusClass, SyncGateway};

use crate::output::{Output, OutputFormat};

/// Fetch and display a remote database schema
pub async fn get(
    config: &Config,
    store: &SqliteStore,
    token: String,
    database_id: String,
    output: &Output,
) -> Result<()> {
    let request = SchemaRequest {
        action: "get_schema".to_string(),
        database_id: Some(database_id),
        property_name: None,
        property_type: None,
    };

    let response = dispatch(config, store, &token, &request).await?;

    let properties: Vec<RemoteProperty> =
        serde_json::from_value(response.body["properties"].clone())?;
    output.print_properties(&properties);
    Ok(())
}

/// Create a property on a remote database
pub async fn add_property(
    config: &Config,
    store: &SqliteStore,
    token: String,
    database_id: String,
    name: String,
    property_type: String,
    output: &Output,
) -> Result<()> {
    let request = SchemaRequest {
        action: "create_property".to_string(),
        database_id: Some(database_id),
        property_name: Some(name.clone()),
        property_type: Some(property_type),
    };

    let response = dispatch(config, store, &token, &request).await?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&response.body["property"])?
            );
        }
        _ => {
            let stored = response.body["property"]["type"]
                .as_str()
                .unwrap_or("rich_text")
                .to_string();
            output.success(&format!("Created property {} ({})", name, stored));
        }
    }
    Ok(())
}

/// Run one request through the gateway and fail on non-success classes
async fn dispatch(
    config: &Config,
    store: &SqliteStore,
    token: &str,
    request: &SchemaRequest,
) -> Result<GatewayResponse> {
    let client = RemoteClient::new(&config.notion)?;
    let gateway = SyncGateway::new(client, store);

    let authorization = format!("Bearer {}", token);
    let response = gateway.handle(Some(&authorization), request).await;

    if response.status != StatusClass::Ok {
        bail!(
            "{} ({})",
            response.body["error"].as_str().unwrap_or("request failed"),
            response.status.code()
        );
    }
    Ok(response)
}
