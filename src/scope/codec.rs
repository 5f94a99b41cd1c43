//! Conversion between scope form state and scope documents.
//!
//! [`encode`] is total: blank or whitespace-only inputs degrade to omitted
//! members, never to an error. [`decode`] fails only when the text is not a
//! JSON object; below that level every recognized member is decoded on its
//! own, and a malformed member is skipped without affecting the others.
//!
//! Members that `encode` omits decode to "unchanged" rather than "cleared",
//! so `decode(encode(form))` reproduces every non-empty field of `form`.

use super::form::{ScopeForm, ServerAccessEntry};
use super::{
    ALL_METHODS, PermissionGrant, ScopeConfig, ServerAccessRule, ToolGrant, UiPermissionKey,
    WILDCARD,
};
use crate::error::ParseError;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Build the scope document described by the form.
///
/// The name is trimmed but not checked: callers only submit forms with a
/// non-empty name.
pub fn encode(form: &ScopeForm) -> ScopeConfig {
    let description = form.description.trim();

    let server_access = form
        .server_access
        .iter()
        .filter(|entry| !entry.server.trim().is_empty())
        .map(encode_server_entry)
        .collect();

    let mut ui_permissions = BTreeMap::new();
    for key in UiPermissionKey::ALL {
        let Some(text) = form.ui_permissions.get(key.as_str()) else {
            continue;
        };
        let items = split_list(text);
        if !items.is_empty() {
            ui_permissions.insert(key.as_str().to_string(), PermissionGrant::Named(items));
        }
    }

    ScopeConfig {
        scope_name: form.name.trim().to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        server_access,
        group_mappings: split_list(&form.group_mappings),
        agent_access: form.selected_agents.clone(),
        ui_permissions,
        create_in_idp: form.create_in_idp,
    }
}

fn encode_server_entry(entry: &ServerAccessEntry) -> ServerAccessRule {
    let methods = if entry.methods.is_empty() {
        vec![ALL_METHODS.to_string()]
    } else {
        entry.methods.clone()
    };

    let tools = if entry.tools.iter().any(|tool| tool == WILDCARD) {
        Some(ToolGrant::All)
    } else if !entry.tools.is_empty() {
        Some(ToolGrant::Named(entry.tools.clone()))
    } else {
        None
    };

    ServerAccessRule {
        server: entry.server.trim().to_string(),
        methods,
        tools,
    }
}

/// Split comma-separated text into trimmed, non-empty items, keeping order.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// A form-state patch produced by [`decode`].
///
/// `None` means the document did not (usefully) mention the field and the
/// form keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub create_in_idp: Option<bool>,
    pub group_mappings: Option<String>,
    pub server_access: Option<Vec<ServerAccessEntry>>,
    pub selected_agents: Option<Vec<String>>,
    pub ui_permissions: Option<BTreeMap<String, String>>,
}

impl ScopePatch {
    /// Record a decoded field.
    pub fn set(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Name(name) => self.name = Some(name),
            FieldUpdate::Description(description) => self.description = Some(description),
            FieldUpdate::CreateInIdp(flag) => self.create_in_idp = Some(flag),
            FieldUpdate::GroupMappings(text) => self.group_mappings = Some(text),
            FieldUpdate::ServerAccess(entries) => self.server_access = Some(entries),
            FieldUpdate::Agents(agents) => self.selected_agents = Some(agents),
            FieldUpdate::UiPermissions(perms) => self.ui_permissions = Some(perms),
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == ScopePatch::default()
    }
}

/// One decoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    Description(String),
    CreateInIdp(bool),
    GroupMappings(String),
    ServerAccess(Vec<ServerAccessEntry>),
    Agents(Vec<String>),
    UiPermissions(BTreeMap<String, String>),
}

/// Decoder for one top-level member. Returns `None` when the member is
/// present but unusable.
struct FieldMapper {
    key: &'static str,
    decode: fn(&Value) -> Option<FieldUpdate>,
}

const FIELD_MAPPERS: &[FieldMapper] = &[
    FieldMapper {
        key: "scope_name",
        decode: decode_name,
    },
    FieldMapper {
        key: "description",
        decode: decode_description,
    },
    FieldMapper {
        key: "create_in_idp",
        decode: decode_create_in_idp,
    },
    FieldMapper {
        key: "group_mappings",
        decode: decode_group_mappings,
    },
    FieldMapper {
        key: "server_access",
        decode: decode_server_access,
    },
    FieldMapper {
        key: "agent_access",
        decode: decode_agent_access,
    },
    FieldMapper {
        key: "ui_permissions",
        decode: decode_ui_permissions,
    },
];

/// Decode uploaded scope text into a form patch.
///
/// # Errors
///
/// Returns [`ParseError`] when the text is not JSON or not a JSON object.
/// Malformed individual members are skipped, not reported.
pub fn decode(text: &str) -> Result<ScopePatch, ParseError> {
    let document: Value = serde_json::from_str(text)?;
    decode_value(&document)
}

/// Decode an already parsed scope document into a form patch.
pub fn decode_value(document: &Value) -> Result<ScopePatch, ParseError> {
    let Value::Object(members) = document else {
        return Err(ParseError::NotAnObject {
            found: json_type_name(document),
        });
    };

    let mut patch = ScopePatch::default();
    for mapper in FIELD_MAPPERS {
        let Some(raw) = members.get(mapper.key) else {
            continue;
        };
        match (mapper.decode)(raw) {
            Some(update) => patch.set(update),
            None => debug!("Skipping unusable scope member '{}'", mapper.key),
        }
    }
    Ok(patch)
}

fn decode_name(raw: &Value) -> Option<FieldUpdate> {
    non_empty_str(raw).map(|name| FieldUpdate::Name(name.to_string()))
}

fn decode_description(raw: &Value) -> Option<FieldUpdate> {
    non_empty_str(raw).map(|text| FieldUpdate::Description(text.to_string()))
}

fn decode_create_in_idp(raw: &Value) -> Option<FieldUpdate> {
    raw.as_bool().map(FieldUpdate::CreateInIdp)
}

fn decode_group_mappings(raw: &Value) -> Option<FieldUpdate> {
    raw.as_array()
        .map(|items| FieldUpdate::GroupMappings(join_items(items)))
}

fn decode_server_access(raw: &Value) -> Option<FieldUpdate> {
    let entries: Vec<ServerAccessEntry> = raw
        .as_array()?
        .iter()
        .filter_map(decode_server_entry)
        .collect();

    // An empty or fully invalid list leaves existing entries alone.
    if entries.is_empty() {
        return None;
    }
    Some(FieldUpdate::ServerAccess(entries))
}

fn decode_server_entry(raw: &Value) -> Option<ServerAccessEntry> {
    let server = non_empty_str(raw.get("server")?)?;

    let methods = raw
        .get("methods")
        .and_then(Value::as_array)
        .map(|items| strings(items))
        .unwrap_or_default();

    let tools = match raw.get("tools") {
        Some(Value::Array(items)) => strings(items),
        Some(Value::String(text)) if text == WILDCARD => vec![WILDCARD.to_string()],
        _ => Vec::new(),
    };

    Some(ServerAccessEntry {
        server: server.to_string(),
        methods,
        tools,
    })
}

fn decode_agent_access(raw: &Value) -> Option<FieldUpdate> {
    raw.as_array()
        .map(|items| FieldUpdate::Agents(strings(items)))
}

fn decode_ui_permissions(raw: &Value) -> Option<FieldUpdate> {
    let perms = raw
        .as_object()?
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Array(items) => join_items(items),
                other => scalar_text(other),
            };
            (key.clone(), text)
        })
        .collect();
    Some(FieldUpdate::UiPermissions(perms))
}

fn non_empty_str(raw: &Value) -> Option<&str> {
    raw.as_str().filter(|text| !text.is_empty())
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Join list members into form text. `null` members contribute an empty piece.
fn join_items(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => scalar_text(other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
