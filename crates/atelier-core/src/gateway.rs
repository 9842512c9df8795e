//! Sync gateway
//!
//! The authorization and routing boundary for all Notion-facing schema
//! operations. Schema discovery and mutation are admin-only, stricter
//! than general app access control: the request is authenticated, the
//! caller's role resolved through the external access store, and only
//! then is anything dispatched to the schema mapper.
//!
//! Per request: `received -> authenticate -> authorize -> dispatch ->
//! respond`. Failures fall into exactly three classes: unauthorized
//! (401), forbidden-or-bad-request (403/400), and internal fault (500).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::SyncError;
use crate::remote::{RemoteTransport, SchemaMapper};

/// Caller role, resolved once per request into an explicit capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    /// Parse a stored role string; anything that is not "admin" is a
    /// plain member
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Member
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

/// External store resolving caller tokens and roles
///
/// Session issuance and role storage live outside the sync subsystem;
/// this is the capability it consumes.
pub trait AccessStore {
    /// Resolve a bearer token to a user identifier
    fn authenticate(&self, token: &str) -> Result<Option<String>, SyncError>;

    /// Resolve a user's role; `None` means no role record exists
    fn role_of(&self, user: &str) -> Result<Option<Role>, SyncError>;
}

impl<T: AccessStore + ?Sized> AccessStore for &T {
    fn authenticate(&self, token: &str) -> Result<Option<String>, SyncError> {
        (**self).authenticate(token)
    }

    fn role_of(&self, user: &str) -> Result<Option<Role>, SyncError> {
        (**self).role_of(user)
    }
}

/// Inbound schema operation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRequest {
    /// Action discriminator: "get_schema" or "create_property"
    pub action: String,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
}

/// HTTP-style outcome class of a gateway response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Operation succeeded
    Ok,
    /// Request was malformed or the operation itself failed
    BadRequest,
    /// No usable caller token
    Unauthorized,
    /// Caller lacks the admin role
    Forbidden,
    /// Unexpected internal fault
    Internal,
}

impl StatusClass {
    pub fn code(&self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::BadRequest => 400,
            StatusClass::Unauthorized => 401,
            StatusClass::Forbidden => 403,
            StatusClass::Internal => 500,
        }
    }
}

/// Response envelope produced by the gateway
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusClass,
    pub body: Value,
}

impl GatewayResponse {
    fn success(body: Value) -> Self {
        Self {
            status: StatusClass::Ok,
            body,
        }
    }

    fn failure(status: StatusClass, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({"success": false, "error": message.into()}),
        }
    }
}

/// Authenticated, authorized entry point for schema operations
pub struct SyncGateway<T: RemoteTransport, A: AccessStore> {
    mapper: SchemaMapper<T>,
    access: A,
}

impl<T: RemoteTransport, A: AccessStore> SyncGateway<T, A> {
    pub fn new(remote: T, access: A) -> Self {
        Self {
            mapper: SchemaMapper::new(remote),
            access,
        }
    }

    /// Handle one schema request
    ///
    /// `authorization` is the raw authorization header value, if any.
    /// Never panics; every failure is normalized into a response envelope.
    pub async fn handle(
        &self,
        authorization: Option<&str>,
        request: &SchemaRequest,
    ) -> GatewayResponse {
        // authenticate
        let Some(token) = bearer_token(authorization) else {
            return GatewayResponse::failure(
                StatusClass::Unauthorized,
                "Missing or malformed authorization header",
            );
        };

        let user = match self.access.authenticate(token) {
            Ok(Some(user)) => user,
            Ok(None) => {
                return GatewayResponse::failure(StatusClass::Unauthorized, "Invalid token");
            }
            Err(e) => {
                warn!("access store failure during authentication: {}", e);
                return GatewayResponse::failure(StatusClass::Internal, e.to_string());
            }
        };

        // authorize: schema operations are admin-only
        match self.access.role_of(&user) {
            Ok(Some(role)) if role.is_admin() => {}
            Ok(_) => {
                info!("user {} denied schema access (not admin)", user);
                return GatewayResponse::failure(StatusClass::Forbidden, "Admin role required");
            }
            Err(e) => {
                warn!("access store failure during authorization: {}", e);
                return GatewayResponse::failure(StatusClass::Internal, e.to_string());
            }
        }

        // dispatch: both actions require a database id, checked before
        // any remote call is attempted
        let Some(database_id) = request.database_id.as_deref() else {
            return GatewayResponse::failure(StatusClass::BadRequest, "database_id is required");
        };

        match request.action.as_str() {
            "get_schema" => match self.mapper.fetch_schema(database_id).await {
                Ok(properties) => {
                    GatewayResponse::success(json!({"success": true, "properties": properties}))
                }
                Err(e) => GatewayResponse::failure(StatusClass::BadRequest, e.to_string()),
            },
            "create_property" => {
                let (Some(name), Some(kind)) = (
                    request.property_name.as_deref(),
                    request.property_type.as_deref(),
                ) else {
                    return GatewayResponse::failure(
                        StatusClass::BadRequest,
                        "property_name and property_type are required",
                    );
                };

                match self.mapper.create_property(database_id, name, kind).await {
                    Ok(property) => {
                        GatewayResponse::success(json!({"success": true, "property": property}))
                    }
                    Err(e) => GatewayResponse::failure(StatusClass::BadRequest, e.to_string()),
                }
            }
            other => GatewayResponse::failure(
                StatusClass::BadRequest,
                format!("Unknown action: {}", other),
            ),
        }
    }
}

/// Extract the token from a `Bearer <token>` authorization header
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
