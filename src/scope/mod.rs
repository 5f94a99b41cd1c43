//! Authorization scope model.
//!
//! A scope is a named authorization unit bundling server and tool access,
//! UI permission grants and identity-group mappings. This module holds the
//! canonical wire shape ([`ScopeConfig`]); the editable form state lives in
//! [`form`], the conversion between the two in [`codec`], and guarded file
//! imports in [`import`].
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "scope_name": "currenttime-users",
//!   "description": "Users with access to currenttime server",
//!   "server_access": [
//!     {
//!       "server": "currenttime",
//!       "methods": ["initialize", "tools/list", "tools/call"],
//!       "tools": ["current_time_by_timezone"]
//!     }
//!   ],
//!   "group_mappings": ["currenttime-users"],
//!   "ui_permissions": { "list_service": ["currenttime"] },
//!   "create_in_idp": true
//! }
//! ```
//!
//! Optional members are absent rather than `null` or empty when they carry no
//! grant.

pub mod codec;
pub mod form;
pub mod import;

pub use codec::{FieldUpdate, ScopePatch, decode, decode_value, encode};
pub use form::{ScopeForm, ServerAccessEntry};
pub use import::{CompletedImport, ImportEpoch, ImportTicket};

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel meaning "all" in both the `server` and `tools` positions.
pub const WILDCARD: &str = "*";

/// Method list emitted when a rule selects no methods.
pub const ALL_METHODS: &str = "all";

/// Token granting a UI permission on every resource.
pub const ALL_RESOURCES: &str = "all";

/// File name used when the example scope is downloaded.
pub const EXAMPLE_SCOPE_FILE_NAME: &str = "example-group-scope.json";

/// Protocol methods the group form offers as toggles.
pub const COMMON_METHODS: [&str; 11] = [
    "initialize",
    "notifications/initialized",
    "ping",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/templates/list",
    "GET",
    "POST",
    "PUT",
    "DELETE",
];

/// The canonical authorization unit as exchanged with the Management API
/// and as stored in downloaded scope files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub scope_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_access: Vec<ServerAccessRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_mappings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_access: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ui_permissions: BTreeMap<String, PermissionGrant>,
    #[serde(default = "default_create_in_idp")]
    pub create_in_idp: bool,
}

fn default_create_in_idp() -> bool {
    true
}

impl ScopeConfig {
    /// Create an otherwise empty scope with the given name.
    pub fn named(scope_name: impl Into<String>) -> Self {
        Self {
            scope_name: scope_name.into(),
            description: None,
            server_access: Vec::new(),
            group_mappings: Vec::new(),
            agent_access: Vec::new(),
            ui_permissions: BTreeMap::new(),
            create_in_idp: true,
        }
    }

    /// The example scope offered for download as [`EXAMPLE_SCOPE_FILE_NAME`].
    pub fn example() -> Self {
        let mut ui_permissions = BTreeMap::new();
        ui_permissions.insert(
            UiPermissionKey::ListService.as_str().to_string(),
            PermissionGrant::Named(vec!["currenttime".to_string()]),
        );
        ui_permissions.insert(
            UiPermissionKey::HealthCheckService.as_str().to_string(),
            PermissionGrant::Named(vec!["currenttime".to_string()]),
        );

        Self {
            scope_name: "currenttime-users".to_string(),
            description: Some("Users with access to currenttime server".to_string()),
            server_access: vec![ServerAccessRule {
                server: "currenttime".to_string(),
                methods: vec![
                    "initialize".to_string(),
                    "tools/list".to_string(),
                    "tools/call".to_string(),
                ],
                tools: Some(ToolGrant::Named(vec!["current_time_by_timezone".to_string()])),
            }],
            group_mappings: vec!["currenttime-users".to_string()],
            agent_access: Vec::new(),
            ui_permissions,
            create_in_idp: true,
        }
    }

    /// Convert to a JSON value.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Render as the pretty-printed document users download.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The scope members other than `scope_name` and `description`.
    ///
    /// Group creation sends name and description separately, so this is the
    /// `scope_config` part of a creation request.
    pub fn settings(&self) -> serde_json::Result<serde_json::Map<String, serde_json::Value>> {
        let mut settings = match self.to_value()? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        settings.remove("scope_name");
        settings.remove("description");
        Ok(settings)
    }
}

/// Access granted on one server (or on every server, via [`WILDCARD`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAccessRule {
    pub server: String,
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolGrant>,
}

impl ServerAccessRule {
    /// Whether this rule covers every server.
    pub fn is_all_servers(&self) -> bool {
        self.server == WILDCARD
    }
}

/// The tools a server-access rule grants.
///
/// Serialized as the literal string `"*"` for [`ToolGrant::All`] and as an
/// array of names otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolGrant {
    All,
    Named(Vec<String>),
}

impl ToolGrant {
    /// The form-side representation: `["*"]` for all tools.
    pub fn to_names(&self) -> Vec<String> {
        match self {
            ToolGrant::All => vec![WILDCARD.to_string()],
            ToolGrant::Named(names) => names.clone(),
        }
    }
}

impl Serialize for ToolGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToolGrant::All => serializer.serialize_str(WILDCARD),
            ToolGrant::Named(names) => names.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ToolGrant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawGrant {
            Text(String),
            Names(Vec<String>),
        }

        match RawGrant::deserialize(deserializer)? {
            RawGrant::Text(text) if text == WILDCARD => Ok(ToolGrant::All),
            RawGrant::Text(text) => Err(de::Error::custom(format!(
                "tools must be \"*\" or a list of tool names, got \"{text}\""
            ))),
            RawGrant::Names(names) => Ok(ToolGrant::Named(names)),
        }
    }
}

/// The resources a UI permission applies to.
///
/// Serialized as the literal string `"all"` for [`PermissionGrant::All`] and
/// as an array of resource names otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionGrant {
    All,
    Named(Vec<String>),
}

impl PermissionGrant {
    /// The comma-separated text shown in the permission input.
    pub fn form_text(&self) -> String {
        match self {
            PermissionGrant::All => ALL_RESOURCES.to_string(),
            PermissionGrant::Named(names) => names.join(", "),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PermissionGrant::All => 1,
            PermissionGrant::Named(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for PermissionGrant {
    fn from(names: Vec<String>) -> Self {
        PermissionGrant::Named(names)
    }
}

impl Serialize for PermissionGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PermissionGrant::All => serializer.serialize_str(ALL_RESOURCES),
            PermissionGrant::Named(names) => names.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PermissionGrant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawGrant {
            Text(String),
            Names(Vec<String>),
        }

        match RawGrant::deserialize(deserializer)? {
            RawGrant::Text(text) if text == ALL_RESOURCES => Ok(PermissionGrant::All),
            RawGrant::Text(text) => Err(de::Error::custom(format!(
                "permission must be \"all\" or a list of resource names, got \"{text}\""
            ))),
            RawGrant::Names(names) => Ok(PermissionGrant::Named(names)),
        }
    }
}

/// Capability names gating console features, independent of server grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiPermissionKey {
    ListService,
    RegisterService,
    HealthCheckService,
    ToggleService,
    ModifyService,
    DeleteService,
    ListAgents,
    GetAgent,
    PublishAgent,
    ModifyAgent,
    DeleteAgent,
}

impl UiPermissionKey {
    /// Every key, in the order the group form lists them.
    pub const ALL: [UiPermissionKey; 11] = [
        UiPermissionKey::ListService,
        UiPermissionKey::RegisterService,
        UiPermissionKey::HealthCheckService,
        UiPermissionKey::ToggleService,
        UiPermissionKey::ModifyService,
        UiPermissionKey::DeleteService,
        UiPermissionKey::ListAgents,
        UiPermissionKey::GetAgent,
        UiPermissionKey::PublishAgent,
        UiPermissionKey::ModifyAgent,
        UiPermissionKey::DeleteAgent,
    ];

    /// The key as it appears in scope documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            UiPermissionKey::ListService => "list_service",
            UiPermissionKey::RegisterService => "register_service",
            UiPermissionKey::HealthCheckService => "health_check_service",
            UiPermissionKey::ToggleService => "toggle_service",
            UiPermissionKey::ModifyService => "modify_service",
            UiPermissionKey::DeleteService => "delete_service",
            UiPermissionKey::ListAgents => "list_agents",
            UiPermissionKey::GetAgent => "get_agent",
            UiPermissionKey::PublishAgent => "publish_agent",
            UiPermissionKey::ModifyAgent => "modify_agent",
            UiPermissionKey::DeleteAgent => "delete_agent",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            UiPermissionKey::ListService => "List Services",
            UiPermissionKey::RegisterService => "Register Service",
            UiPermissionKey::HealthCheckService => "Health Check Service",
            UiPermissionKey::ToggleService => "Toggle Service",
            UiPermissionKey::ModifyService => "Modify Service",
            UiPermissionKey::DeleteService => "Delete Service",
            UiPermissionKey::ListAgents => "List Agents",
            UiPermissionKey::GetAgent => "Get Agent",
            UiPermissionKey::PublishAgent => "Publish Agent",
            UiPermissionKey::ModifyAgent => "Modify Agent",
            UiPermissionKey::DeleteAgent => "Delete Agent",
        }
    }

    /// Look a key up by its document name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }
}

impl fmt::Display for UiPermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
