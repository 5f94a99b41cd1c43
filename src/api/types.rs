//! Request and response types of the Management API.
//!
//! Field names follow the JSON the API speaks. Optional request members are
//! omitted rather than sent as `null`.

use crate::scope::{PermissionGrant, ScopeConfig, ServerAccessRule};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Email domain the identity provider assigns to machine accounts.
pub const SERVICE_ACCOUNT_EMAIL_DOMAIN: &str = "@service-account.local";

/// Default page size when listing users.
pub const DEFAULT_USER_LIMIT: u32 = 500;

/// A group as shown in the groups list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_count: Option<u32>,
}

/// A user or machine account as listed by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamUser {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(
        rename = "serviceAccountsEnabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub service_accounts_enabled: Option<bool>,
}

impl IamUser {
    /// Whether this account is a machine-to-machine service account.
    ///
    /// The identity provider gives every service account the email
    /// `{client_id}@service-account.local`.
    pub fn is_service_account(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| email.ends_with(SERVICE_ACCOUNT_EMAIL_DOMAIN))
    }
}

/// Credentials returned once when a machine account is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2mCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHumanUserPayload {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateM2mPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

/// Group creation request.
///
/// Only `name` and `description` are guaranteed to be persisted. The API
/// accepts `scope_config` but callers must not expect to read it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_config: Option<Map<String, Value>>,
}

impl CreateGroupPayload {
    /// Split an encoded scope into a creation request: name and description
    /// travel on their own, the remaining members become `scope_config`.
    pub fn from_scope(scope: &ScopeConfig) -> serde_json::Result<Self> {
        let settings = scope.settings()?;
        Ok(Self {
            name: scope.scope_name.clone(),
            description: scope.description.clone(),
            scope_config: (!settings.is_empty()).then_some(settings),
        })
    }
}

/// Full view of one group, including its stored scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_access: Option<Vec<ServerAccessRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_mappings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_permissions: Option<BTreeMap<String, PermissionGrant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_access: Option<Vec<String>>,
}

impl GroupDetail {
    /// The stored scope as a scope document.
    pub fn to_scope(&self) -> ScopeConfig {
        let mut scope = ScopeConfig::named(self.name.clone());
        scope.description = self.description.clone().filter(|d| !d.is_empty());
        scope.server_access = self.server_access.clone().unwrap_or_default();
        scope.group_mappings = self.group_mappings.clone().unwrap_or_default();
        scope.agent_access = self.agent_access.clone().unwrap_or_default();
        scope.ui_permissions = self.ui_permissions.clone().unwrap_or_default();
        scope
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupScopeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_access: Option<Vec<ServerAccessRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_permissions: Option<BTreeMap<String, PermissionGrant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_access: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_config: Option<GroupScopeUpdate>,
}

impl UpdateGroupPayload {
    /// Replace a group's description and stored scope with `scope`.
    pub fn from_scope(scope: &ScopeConfig) -> Self {
        Self {
            description: scope.description.clone(),
            scope_config: Some(GroupScopeUpdate {
                server_access: Some(scope.server_access.clone()),
                ui_permissions: Some(scope.ui_permissions.clone()),
                agent_access: Some(scope.agent_access.clone()),
            }),
        }
    }
}

/// Result of replacing a user's group set. The server computes the diff;
/// no ordering is promised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserGroupsResponse {
    pub username: String,
    pub groups: Vec<String>,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// Query parameters for the user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_USER_LIMIT,
            search: None,
        }
    }
}

impl UserQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

/// One entry of the server catalog listing.
///
/// The listing serves several views, so nearly everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogServer {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_official: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_stars: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_tools: Option<u32>,
}

/// One entry of the agent catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAgent {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A list response that is either wrapped in an object member or bare.
///
/// The groups endpoint answers `{"groups": [...]}` while older deployments
/// answer with the bare array; the same holds for users.
pub fn parse_list<T: DeserializeOwned>(body: Value, member: &str) -> serde_json::Result<Vec<T>> {
    match body {
        Value::Array(_) => serde_json::from_value(body),
        Value::Object(mut members) => match members.remove(member) {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items),
        },
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other),
    }
}
