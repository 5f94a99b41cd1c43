//! Machine-to-machine accounts screen.
//!
//! Service accounts are ordinary users as far as the Management API is
//! concerned; they are told apart by their `@service-account.local` email.
//! Creating one returns a client secret exactly once, so the controller holds
//! it until the user takes or dismisses it and then forgets it for good.

use super::{DeleteConfirmation, ListState, View, matches_query, toggle};
use crate::api::{CreateM2mPayload, IamGroup, IamUser, M2mCredentials, ManagementApi, UserQuery};
use crate::error::{ApiResult, ConsoleResult, FieldErrors};
use crate::notify::Notifications;
use log::{debug, info};
use std::sync::Arc;

/// Placeholder shown instead of a hidden client secret.
pub const MASKED_SECRET: &str = "••••••••••••••••";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct M2mForm {
    pub name: String,
    pub description: String,
    pub groups: Vec<String>,
}

impl M2mForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.groups.is_empty() {
            errors.insert("groups", "At least one group is required");
        }
        errors
    }

    pub fn to_payload(&self) -> CreateM2mPayload {
        let description = self.description.trim();
        CreateM2mPayload {
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            groups: Some(self.groups.clone()),
        }
    }
}

/// Freshly issued credentials, held until taken or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    credentials: M2mCredentials,
    revealed: bool,
}

impl IssuedCredentials {
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn name(&self) -> &str {
        &self.credentials.name
    }

    /// The secret itself, for copying; unaffected by masking.
    pub fn client_secret(&self) -> &str {
        &self.credentials.client_secret
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// The secret as displayed: masked unless revealed.
    pub fn displayed_secret(&self) -> &str {
        if self.revealed {
            &self.credentials.client_secret
        } else {
            MASKED_SECRET
        }
    }
}

/// State behind the machine accounts screen.
pub struct M2mController<A: ManagementApi> {
    api: Arc<A>,
    users: ListState<IamUser>,
    groups: ListState<IamGroup>,
    search: String,
    view: View,
    form: M2mForm,
    errors: FieldErrors,
    issued: Option<IssuedCredentials>,
    delete: DeleteConfirmation,
    notifications: Notifications,
}

impl<A: ManagementApi> M2mController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            users: ListState::new(),
            groups: ListState::new(),
            search: String::new(),
            view: View::List,
            form: M2mForm::default(),
            errors: FieldErrors::new(),
            issued: None,
            delete: DeleteConfirmation::default(),
            notifications: Notifications::new(),
        }
    }

    pub async fn refresh(&mut self) {
        self.users.begin_load();
        let result = self.api.list_users(UserQuery::default()).await;
        self.users.finish_load(result, "Failed to load users");
    }

    pub async fn load_groups(&mut self) {
        self.groups.begin_load();
        let result = self.api.list_groups().await;
        self.groups.finish_load(result, "Failed to load groups");
    }

    pub fn users(&self) -> &ListState<IamUser> {
        &self.users
    }

    pub fn available_groups(&self) -> &[IamGroup] {
        self.groups.items()
    }

    /// Every service account in the user list.
    pub fn accounts(&self) -> Vec<&IamUser> {
        self.users
            .items()
            .iter()
            .filter(|u| u.is_service_account())
            .collect()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Service accounts whose username or email contains the search query.
    pub fn filtered_accounts(&self) -> Vec<&IamUser> {
        self.accounts()
            .into_iter()
            .filter(|u| {
                matches_query(&self.search, &[Some(u.username.as_str()), u.email.as_deref()])
            })
            .collect()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn form(&self) -> &M2mForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn open_create(&mut self) {
        self.view = View::Create;
    }

    pub fn close_create(&mut self) {
        self.reset_form();
        self.view = View::List;
    }

    fn reset_form(&mut self) {
        self.form = M2mForm::default();
        self.errors = FieldErrors::new();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
        self.errors.clear("name");
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    pub fn toggle_group(&mut self, group: &str) {
        toggle(&mut self.form.groups, group);
        self.errors.clear("groups");
    }

    /// Validate and submit the creation form. On success the credentials
    /// view opens with the secret hidden.
    pub async fn create(&mut self) -> ConsoleResult<()> {
        self.errors = self.form.validate();
        if let Err(e) = self.errors.clone().into_result() {
            debug!("M2M form rejected: {}", e);
            return Err(e.into());
        }

        let payload = self.form.to_payload();
        match self.api.create_m2m_account(payload).await {
            Ok(credentials) => {
                self.notifications
                    .success(format!("M2M account \"{}\" created", credentials.name));
                self.issued = Some(IssuedCredentials {
                    credentials,
                    revealed: false,
                });
                self.reset_form();
                self.view = View::Credentials;
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .error(e.message_or("Failed to create M2M account"));
                Err(e.into())
            }
        }
    }

    /// The credentials awaiting acknowledgement, if any.
    pub fn issued(&self) -> Option<&IssuedCredentials> {
        self.issued.as_ref()
    }

    pub fn toggle_reveal_secret(&mut self) {
        if let Some(issued) = self.issued.as_mut() {
            issued.revealed = !issued.revealed;
        }
    }

    /// Report a value copied to the clipboard, e.g. `copied("Client ID")`.
    pub fn copied(&mut self, label: &str) {
        self.notifications.info(format!("{label} copied to clipboard"));
    }

    pub fn copy_failed(&mut self) {
        self.notifications.error("Failed to copy to clipboard");
    }

    /// Hand the credentials over and forget them. Returns `None` once they
    /// have been taken or dismissed.
    pub async fn take_credentials(&mut self) -> Option<M2mCredentials> {
        let issued = self.issued.take()?;
        self.finish_credentials().await;
        Some(issued.credentials)
    }

    /// Forget the credentials without handing them over.
    pub async fn dismiss_credentials(&mut self) {
        if self.issued.take().is_some() {
            self.finish_credentials().await;
        }
    }

    async fn finish_credentials(&mut self) {
        self.view = View::List;
        self.refresh().await;
    }

    pub fn request_delete(&mut self, username: impl Into<String>) {
        self.delete.request(username);
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.delete.pending()
    }

    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(username) = self.delete.take() else {
            return Ok(());
        };
        match self.api.delete_user(&username).await {
            Ok(()) => {
                info!("Service account '{}' deleted", username);
                self.notifications
                    .success(format!("Account \"{username}\" deleted"));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .error(e.message_or("Failed to delete account"));
                Err(e)
            }
        }
    }
}
