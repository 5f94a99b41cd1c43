//! Fluent builders for test data.

use iam_console::api::{CatalogAgent, CatalogServer};
use iam_console::scope::{ScopeForm, ServerAccessEntry};

/// Builder for scope forms as a user would fill them in.
#[derive(Debug, Clone)]
pub struct ScopeFormBuilder {
    form: ScopeForm,
}

impl ScopeFormBuilder {
    pub fn new(name: &str) -> Self {
        let mut form = ScopeForm::new();
        form.name = name.to_string();
        form.server_access.clear();
        Self { form }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.form.description = description.to_string();
        self
    }

    pub fn server(mut self, server: &str, methods: &[&str], tools: &[&str]) -> Self {
        self.form.server_access.push(ServerAccessEntry {
            server: server.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn group_mappings(mut self, text: &str) -> Self {
        self.form.group_mappings = text.to_string();
        self
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.form.add_agent(agent);
        self
    }

    pub fn ui_permission(mut self, key: &str, text: &str) -> Self {
        self.form.set_ui_permission(key, text);
        self
    }

    pub fn create_in_idp(mut self, flag: bool) -> Self {
        self.form.create_in_idp = flag;
        self
    }

    pub fn build(mut self) -> ScopeForm {
        if self.form.server_access.is_empty() {
            self.form.add_server_entry();
        }
        self.form
    }
}

/// A catalog server entry with the given display fields.
pub fn catalog_server(path: &str, server_name: &str) -> CatalogServer {
    CatalogServer {
        path: path.to_string(),
        server_name: Some(server_name.to_string()),
        description: Some(format!("The {server_name} server")),
        ..CatalogServer::default()
    }
}

pub fn catalog_agent(name: &str) -> CatalogAgent {
    CatalogAgent {
        name: name.to_string(),
        path: format!("/agents/{name}"),
        description: None,
    }
}
