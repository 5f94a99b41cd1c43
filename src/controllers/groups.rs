//! Groups screen.
//!
//! Lists IAM groups and creates new ones from a [`ScopeForm`]. The form can
//! be filled by hand or from an uploaded scope document; uploads complete
//! asynchronously and are dropped if the user has left the form meanwhile.
//!
//! # Example Usage
//!
//! ```rust
//! use iam_console::api::InMemoryManagementApi;
//! use iam_console::controllers::GroupsController;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut groups = GroupsController::new(Arc::new(InMemoryManagementApi::new()));
//! groups.refresh().await;
//!
//! groups.open_create();
//! groups.form_mut().name = "ops".to_string();
//! groups.form_mut().set_server(0, "currenttime");
//! groups.create().await?;
//!
//! assert_eq!(groups.filtered_groups().len(), 1);
//! # Ok(())
//! # }
//! ```

use super::{DeleteConfirmation, ListState, View, matches_query};
use crate::api::{CreateGroupPayload, GroupDetail, IamGroup, ManagementApi, UpdateGroupPayload};
use crate::catalog::{self, AgentInfo, ServerInfo};
use crate::error::{ApiResult, ConsoleResult, ValidationError};
use crate::notify::Notifications;
use crate::scope::{
    self, CompletedImport, EXAMPLE_SCOPE_FILE_NAME, ImportEpoch, ImportTicket, ScopeConfig,
    ScopeForm,
};
use crate::select::{SearchableSelect, SelectOption};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

/// A file offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub contents: String,
}

/// State behind the groups screen.
pub struct GroupsController<A: ManagementApi> {
    api: Arc<A>,
    groups: ListState<IamGroup>,
    search: String,
    view: View,
    form: ScopeForm,
    imports: ImportEpoch,
    delete: DeleteConfirmation,
    servers: Vec<ServerInfo>,
    agents: Vec<AgentInfo>,
    notifications: Notifications,
}

impl<A: ManagementApi> GroupsController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            groups: ListState::new(),
            search: String::new(),
            view: View::List,
            form: ScopeForm::new(),
            imports: ImportEpoch::new(),
            delete: DeleteConfirmation::default(),
            servers: Vec::new(),
            agents: Vec::new(),
            notifications: Notifications::new(),
        }
    }

    /// Re-fetch the group list.
    pub async fn refresh(&mut self) {
        self.groups.begin_load();
        let result = self.api.list_groups().await;
        self.groups.finish_load(result, "Failed to load groups");
    }

    /// Fetch the server and agent catalogs used by the form pickers.
    ///
    /// A failed catalog leaves its picker empty.
    pub async fn load_catalog(&mut self) {
        match catalog::load_servers(self.api.as_ref()).await {
            Ok(servers) => self.servers = servers,
            Err(e) => debug!("Server catalog unavailable: {}", e),
        }
        match catalog::load_agents(self.api.as_ref()).await {
            Ok(agents) => self.agents = agents,
            Err(e) => debug!("Agent catalog unavailable: {}", e),
        }
    }

    pub fn groups(&self) -> &ListState<IamGroup> {
        &self.groups
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Groups whose name or description contains the search query.
    pub fn filtered_groups(&self) -> Vec<&IamGroup> {
        self.groups
            .items()
            .iter()
            .filter(|g| {
                matches_query(&self.search, &[Some(g.name.as_str()), g.description.as_deref()])
            })
            .collect()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn form(&self) -> &ScopeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ScopeForm {
        &mut self.form
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn open_create(&mut self) {
        self.view = View::Create;
    }

    /// Leave the create view. The form is reset and imports still in flight
    /// will be discarded when they complete.
    pub fn close_create(&mut self) {
        self.imports.advance();
        self.form.reset();
        self.view = View::List;
    }

    /// Whether the create button is enabled.
    pub fn can_submit(&self) -> bool {
        !self.form.trimmed_name().is_empty()
    }

    /// Submit the creation form.
    ///
    /// Only name and description are guaranteed to be stored; the rest of
    /// the scope travels as `scope_config` and may be ignored by the server.
    pub async fn create(&mut self) -> ConsoleResult<IamGroup> {
        let name = self.form.trimmed_name().to_string();
        if name.is_empty() {
            return Err(ValidationError::required("name", "Group name is required").into());
        }

        let payload = CreateGroupPayload::from_scope(&self.form.encode())?;
        match self.api.create_group(payload).await {
            Ok(group) => {
                self.notifications
                    .success(format!("Group \"{name}\" created successfully"));
                self.close_create();
                self.refresh().await;
                Ok(group)
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to create group"));
                Err(e.into())
            }
        }
    }

    /// Fill the form from pasted or already loaded scope JSON.
    pub fn import_json(&mut self, text: &str) -> ConsoleResult<()> {
        let completed = self.imports.begin().complete(text);
        match self.finish_import(completed) {
            Some(result) => result,
            None => Ok(()),
        }
    }

    /// Start an import for the current form.
    ///
    /// [`ImportTicket::load`] reads the file without borrowing the
    /// controller; hand its output to [`finish_import`](Self::finish_import).
    pub fn begin_import(&self) -> ImportTicket {
        self.imports.begin()
    }

    /// Apply a completed import, unless the form it was meant for is gone.
    ///
    /// Returns `None` for a discarded import.
    pub fn finish_import(&mut self, completed: CompletedImport) -> Option<ConsoleResult<()>> {
        match self.imports.accept(completed)? {
            Ok(patch) => {
                self.form.apply(patch);
                self.notifications.success("JSON loaded");
                Some(Ok(()))
            }
            Err(e) => {
                self.notifications.error(e.user_message("Invalid JSON file"));
                Some(Err(e))
            }
        }
    }

    /// Read a scope file and apply it to the form.
    pub async fn import_file(&mut self, path: impl Into<PathBuf>) -> Option<ConsoleResult<()>> {
        let completed = self.begin_import().load(path).await;
        self.finish_import(completed)
    }

    /// The example scope document.
    pub fn download_example(&self) -> ConsoleResult<Download> {
        Ok(Download {
            file_name: EXAMPLE_SCOPE_FILE_NAME,
            contents: ScopeConfig::example().to_pretty_json()?,
        })
    }

    /// Options for a server-access row's server picker.
    pub fn server_select(&self, index: usize) -> SearchableSelect {
        let value = self
            .form
            .server_access
            .get(index)
            .map(|entry| entry.server.clone())
            .unwrap_or_default();
        SearchableSelect::new(catalog::server_options(&self.servers))
            .with_special_options(vec![catalog::all_servers_option()])
            .with_value(value)
    }

    /// Options for agents not selected yet.
    pub fn agent_options(&self) -> Vec<SelectOption> {
        catalog::agent_options(&self.agents, &self.form.selected_agents)
    }

    /// Load a group's stored scope into the form.
    pub async fn edit_scope(&mut self, name: &str) -> ConsoleResult<GroupDetail> {
        let detail = match self.api.get_group(name).await {
            Ok(detail) => detail,
            Err(e) => {
                self.notifications.error(e.message_or("Failed to load group"));
                return Err(e.into());
            }
        };
        let patch = scope::decode_value(&detail.to_scope().to_value()?)?;
        self.imports.advance();
        self.form.reset();
        self.form.apply(patch);
        self.view = View::Create;
        Ok(detail)
    }

    /// Store the form's scope on an existing group.
    pub async fn save_scope(&mut self, name: &str) -> ApiResult<GroupDetail> {
        let payload = UpdateGroupPayload::from_scope(&self.form.encode());
        match self.api.update_group(name, payload).await {
            Ok(detail) => {
                self.notifications.success(format!("Group \"{name}\" updated"));
                self.close_create();
                self.refresh().await;
                Ok(detail)
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to update group"));
                Err(e)
            }
        }
    }

    pub fn request_delete(&mut self, name: impl Into<String>) {
        self.delete.request(name);
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.delete.pending()
    }

    /// Delete the group awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(name) = self.delete.take() else {
            return Ok(());
        };
        match self.api.delete_group(&name).await {
            Ok(()) => {
                info!("Group '{}' deleted", name);
                self.notifications.success(format!("Group \"{name}\" deleted"));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to delete group"));
                Err(e)
            }
        }
    }
}
