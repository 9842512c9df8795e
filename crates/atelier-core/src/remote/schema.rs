//! Remote schema discovery and mutation
//!
//! Translates Notion's typed-property database schema into the local
//! property model, and builds the type-specific configuration envelopes
//! used to create new properties.

use reqwest::Method;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use super::client::{format_database_id, RemoteTransport};
use crate::error::SyncError;

/// A property kind as the remote service models it
///
/// Closed over the kinds this subsystem understands; anything else is
/// carried opaquely in `Other` on read and falls back to rich text on
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Status,
    Other(String),
}

impl PropertyKind {
    /// Parse a remote type string
    pub fn parse(s: &str) -> Self {
        match s {
            "rich_text" => PropertyKind::RichText,
            "number" => PropertyKind::Number,
            "select" => PropertyKind::Select,
            "multi_select" => PropertyKind::MultiSelect,
            "date" => PropertyKind::Date,
            "checkbox" => PropertyKind::Checkbox,
            "url" => PropertyKind::Url,
            "email" => PropertyKind::Email,
            "phone_number" => PropertyKind::PhoneNumber,
            "status" => PropertyKind::Status,
            other => PropertyKind::Other(other.to_string()),
        }
    }

    /// The remote type string for this kind
    pub fn as_str(&self) -> &str {
        match self {
            PropertyKind::RichText => "rich_text",
            PropertyKind::Number => "number",
            PropertyKind::Select => "select",
            PropertyKind::MultiSelect => "multi_select",
            PropertyKind::Date => "date",
            PropertyKind::Checkbox => "checkbox",
            PropertyKind::Url => "url",
            PropertyKind::Email => "email",
            PropertyKind::PhoneNumber => "phone_number",
            PropertyKind::Status => "status",
            PropertyKind::Other(s) => s,
        }
    }

    /// Whether this kind carries an enumerated option list
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            PropertyKind::Select | PropertyKind::MultiSelect | PropertyKind::Status
        )
    }

    /// Build the configuration envelope used to create a property of this
    /// kind on the remote database
    ///
    /// Exhaustive over all variants. Unrecognized kinds fall back to the
    /// rich-text configuration, as does `Status`, which the remote API
    /// does not allow creating.
    pub fn creation_config(&self) -> Value {
        match self {
            PropertyKind::Number => json!({"number": {"format": "number"}}),
            PropertyKind::Select => json!({"select": {"options": []}}),
            PropertyKind::MultiSelect => json!({"multi_select": {"options": []}}),
            PropertyKind::Date => json!({"date": {}}),
            PropertyKind::Checkbox => json!({"checkbox": {}}),
            PropertyKind::Url => json!({"url": {}}),
            PropertyKind::Email => json!({"email": {}}),
            PropertyKind::PhoneNumber => json!({"phone_number": {}}),
            PropertyKind::RichText | PropertyKind::Status | PropertyKind::Other(_) => {
                json!({"rich_text": {}})
            }
        }
    }
}

impl Serialize for PropertyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(D::Error::custom("empty property kind"));
        }
        Ok(PropertyKind::parse(&s))
    }
}

/// One option of a select / multi_select / status property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One column/field definition in the remote schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteProperty {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Present only for kinds that carry enumerated options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

/// Result of a successful property creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedProperty {
    pub id: String,
    pub name: String,
    /// The kind the remote service actually stored, which may differ
    /// from the request if the service normalized it
    #[serde(rename = "type")]
    pub kind: PropertyKind,
}

/// Translates the remote schema into the local property model and back
pub struct SchemaMapper<T: RemoteTransport> {
    remote: T,
}

impl<T: RemoteTransport> SchemaMapper<T> {
    pub fn new(remote: T) -> Self {
        Self { remote }
    }

    /// Fetch every declared property of a remote database
    ///
    /// Option lists are copied verbatim for select / multi_select / status
    /// kinds. The result is sorted byte-wise by property name (plain
    /// `str::cmp`, no locale collation) for deterministic display.
    pub async fn fetch_schema(&self, database_id: &str) -> Result<Vec<RemoteProperty>, SyncError> {
        let path = format!("/databases/{}", format_database_id(database_id));
        let body = self
            .remote
            .call(Method::GET, &path, None)
            .await?
            .ok_or_else(|| SyncError::Remote("database response was not valid JSON".to_string()))?;

        let mut properties = Vec::new();
        if let Some(declared) = body.get("properties").and_then(Value::as_object) {
            for (name, prop) in declared {
                properties.push(map_property(name, prop));
            }
        }

        properties.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "fetched schema for {}: {} properties",
            database_id,
            properties.len()
        );
        Ok(properties)
    }

    /// Create a new property on a remote database
    ///
    /// `requested` is the logical type name; unrecognized values fall back
    /// to rich text. Returns the id and the type the remote service
    /// actually stored.
    pub async fn create_property(
        &self,
        database_id: &str,
        name: &str,
        requested: &str,
    ) -> Result<CreatedProperty, SyncError> {
        let kind = PropertyKind::parse(requested);
        let payload = json!({
            "properties": {
                name: kind.creation_config()
            }
        });

        let path = format!("/databases/{}", format_database_id(database_id));
        let body = self
            .remote
            .call(Method::PATCH, &path, Some(payload))
            .await?
            .ok_or_else(|| SyncError::Remote("database response was not valid JSON".to_string()))?;

        let created = body
            .get("properties")
            .and_then(|p| p.get(name))
            .ok_or_else(|| {
                SyncError::Remote(format!("created property '{}' missing from response", name))
            })?;

        Ok(CreatedProperty {
            id: created
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: name.to_string(),
            kind: PropertyKind::parse(
                created
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("rich_text"),
            ),
        })
    }
}

/// Map one declared remote property into the local model
fn map_property(name: &str, prop: &Value) -> RemoteProperty {
    let kind = PropertyKind::parse(prop.get("type").and_then(Value::as_str).unwrap_or(""));

    let options = if kind.has_options() {
        prop.get(kind.as_str())
            .and_then(|cfg| cfg.get("options"))
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .map(|opt| SelectOption {
                        name: opt
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        color: opt
                            .get("color")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    })
                    .collect()
            })
    } else {
        None
    };

    RemoteProperty {
        id: prop
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: name.to_string(),
        kind,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTransport;

    #[test]
    fn test_property_kind_round_trip() {
        for s in [
            "rich_text",
            "number",
            "select",
            "multi_select",
            "date",
            "checkbox",
            "url",
            "email",
            "phone_number",
            "status",
        ] {
            assert_eq!(PropertyKind::parse(s).as_str(), s);
        }

        // Unrecognized kinds pass through opaquely on read
        let kind = PropertyKind::parse("rollup");
        assert_eq!(kind, PropertyKind::Other("rollup".to_string()));
        assert_eq!(kind.as_str(), "rollup");
    }

    #[test]
    fn test_unrecognized_kind_falls_back_to_rich_text_config() {
        for requested in ["rollup", "formula", "people", ""] {
            let config = PropertyKind::parse(requested).creation_config();
            assert!(
                config.get("rich_text").is_some(),
                "{:?} should fall back to rich_text",
                requested
            );
        }
    }

    #[test]
    fn test_number_config_has_display_format() {
        let config = PropertyKind::Number.creation_config();
        assert_eq!(config["number"]["format"], "number");
    }

    #[test]
    fn test_select_configs_start_with_empty_options() {
        assert_eq!(
            PropertyKind::Select.creation_config()["select"]["options"],
            json!([])
        );
        assert_eq!(
            PropertyKind::MultiSelect.creation_config()["multi_select"]["options"],
            json!([])
        );
    }

    #[tokio::test]
    async fn test_fetch_schema_sorts_and_copies_options() {
        let stub = StubTransport::new();
        stub.push_response(Ok(Some(json!({
            "properties": {
                "Zeta": {"id": "z1", "type": "rich_text", "rich_text": {}},
                "Alpha": {
                    "id": "a1",
                    "type": "select",
                    "select": {"options": [{"name": "A", "color": "red"}]}
                },
                "Middle": {"id": "m1", "type": "number", "number": {"format": "number"}}
            }
        }))));

        let mapper = SchemaMapper::new(&stub);
        let properties = mapper.fetch_schema("db-1").await.unwrap();

        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Middle", "Zeta"]);

        let alpha = &properties[0];
        assert_eq!(alpha.kind, PropertyKind::Select);
        assert_eq!(
            alpha.options,
            Some(vec![SelectOption {
                name: "A".to_string(),
                color: Some("red".to_string()),
            }])
        );

        // Kinds without enumerated options carry no options field
        assert!(properties[1].options.is_none());
        assert!(properties[2].options.is_none());
    }

    #[tokio::test]
    async fn test_fetch_schema_canonicalizes_database_path() {
        let stub = StubTransport::new();
        stub.push_response(Ok(Some(json!({"properties": {}}))));

        let mapper = SchemaMapper::new(&stub);
        mapper
            .fetch_schema("abcdefabcdefabcdefabcdefabcdef12")
            .await
            .unwrap();

        let (method, path, _) = stub.last_request().unwrap();
        assert_eq!(method, Method::GET);
        assert_eq!(path, "/databases/abcdefab-cdef-abcd-efab-cdefabcdef12");
    }

    #[tokio::test]
    async fn test_fetch_schema_unparseable_body() {
        let stub = StubTransport::new();
        stub.push_response(Ok(None));

        let mapper = SchemaMapper::new(&stub);
        let err = mapper.fetch_schema("db-1").await.unwrap_err();
        assert!(matches!(err, SyncError::Remote(_)));
    }

    #[tokio::test]
    async fn test_create_property_returns_stored_type() {
        let stub = StubTransport::new();
        stub.push_response(Ok(Some(json!({
            "properties": {
                "Priority": {"id": "p9", "type": "rich_text", "rich_text": {}}
            }
        }))));

        let mapper = SchemaMapper::new(&stub);
        // Service normalized an unsupported request down to rich_text
        let created = mapper
            .create_property("db-1", "Priority", "formula")
            .await
            .unwrap();

        assert_eq!(created.id, "p9");
        assert_eq!(created.kind, PropertyKind::RichText);

        let (method, path, body) = stub.last_request().unwrap();
        assert_eq!(method, Method::PATCH);
        assert_eq!(path, "/databases/db-1");
        assert!(body.unwrap()["properties"]["Priority"]["rich_text"].is_object());
    }

    #[tokio::test]
    async fn test_create_property_surfaces_remote_failure() {
        let stub = StubTransport::new();
        stub.push_response(Err(SyncError::from_response(400, "validation failed")));

        let mapper = SchemaMapper::new(&stub);
        let err = mapper
            .create_property("db-1", "Priority", "select")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "400: validation failed");
    }
}
