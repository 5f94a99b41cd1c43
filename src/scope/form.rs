//! Editable scope form state.
//!
//! Mirrors what a user types into the group creation form: free text for the
//! comma-separated fields, selections for methods, tools and agents.

use super::codec::{self, ScopePatch, split_list};
use super::{ScopeConfig, WILDCARD};
use std::collections::BTreeMap;

/// One server-access row of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerAccessEntry {
    pub server: String,
    pub methods: Vec<String>,
    pub tools: Vec<String>,
}

impl ServerAccessEntry {
    /// Whether the row targets every server.
    pub fn is_all_servers(&self) -> bool {
        self.server == WILDCARD
    }

    /// Tools as shown in the tools text input.
    pub fn tools_text(&self) -> String {
        self.tools.join(", ")
    }
}

/// Form state for creating a group scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeForm {
    pub name: String,
    pub description: String,
    pub server_access: Vec<ServerAccessEntry>,
    /// Comma-separated identity-provider group names.
    pub group_mappings: String,
    pub selected_agents: Vec<String>,
    /// Permission key to comma-separated resource names.
    pub ui_permissions: BTreeMap<String, String>,
    pub create_in_idp: bool,
}

impl Default for ScopeForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            server_access: vec![ServerAccessEntry::default()],
            group_mappings: String::new(),
            selected_agents: Vec::new(),
            ui_permissions: BTreeMap::new(),
            create_in_idp: true,
        }
    }
}

impl ScopeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every field back to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The name as it will be submitted.
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    /// Encode the form into a scope document.
    pub fn encode(&self) -> ScopeConfig {
        codec::encode(self)
    }

    /// Pretty-printed scope document, or `None` while the name is blank.
    pub fn preview(&self) -> Option<String> {
        if self.trimmed_name().is_empty() {
            return None;
        }
        self.encode().to_pretty_json().ok()
    }

    /// Overwrite the fields a decoded document provided.
    pub fn apply(&mut self, patch: ScopePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(flag) = patch.create_in_idp {
            self.create_in_idp = flag;
        }
        if let Some(mappings) = patch.group_mappings {
            self.group_mappings = mappings;
        }
        if let Some(entries) = patch.server_access {
            self.server_access = entries;
        }
        if let Some(agents) = patch.selected_agents {
            self.selected_agents = agents;
        }
        if let Some(perms) = patch.ui_permissions {
            self.ui_permissions = perms;
        }
    }

    pub fn add_server_entry(&mut self) {
        self.server_access.push(ServerAccessEntry::default());
    }

    /// Remove a server-access row. The last remaining row cannot be removed.
    pub fn remove_server_entry(&mut self, index: usize) -> bool {
        if self.server_access.len() <= 1 || index >= self.server_access.len() {
            return false;
        }
        self.server_access.remove(index);
        true
    }

    /// Select the server for a row. Changing the server clears its tools.
    pub fn set_server(&mut self, index: usize, server: impl Into<String>) {
        if let Some(entry) = self.server_access.get_mut(index) {
            entry.server = server.into();
            entry.tools.clear();
        }
    }

    /// Toggle a method on a row.
    pub fn toggle_method(&mut self, index: usize, method: &str) {
        let Some(entry) = self.server_access.get_mut(index) else {
            return;
        };
        if let Some(pos) = entry.methods.iter().position(|m| m == method) {
            entry.methods.remove(pos);
        } else {
            entry.methods.push(method.to_string());
        }
    }

    /// Set a row's tools from the tools text input.
    ///
    /// Ignored until a server is chosen, and for the all-servers row whose
    /// tools are implicitly "everything".
    pub fn set_tools_text(&mut self, index: usize, text: &str) {
        let Some(entry) = self.server_access.get_mut(index) else {
            return;
        };
        if entry.server.is_empty() || entry.is_all_servers() {
            return;
        }
        entry.tools = if text == WILDCARD {
            vec![WILDCARD.to_string()]
        } else {
            split_list(text)
        };
    }

    /// Add an agent to the selection; already selected agents are ignored.
    pub fn add_agent(&mut self, agent: impl Into<String>) {
        let agent = agent.into();
        if agent.is_empty() || self.selected_agents.contains(&agent) {
            return;
        }
        self.selected_agents.push(agent);
    }

    pub fn remove_agent(&mut self, agent: &str) {
        self.selected_agents.retain(|a| a != agent);
    }

    /// Set the comma-separated text for a permission key.
    pub fn set_ui_permission(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.ui_permissions.insert(key.into(), text.into());
    }
}
