//! Users screen.
//!
//! Lists human and machine users, creates human users and edits group
//! membership. Membership saves send the complete new set; the server answers
//! with what was added and removed.

use super::{DeleteConfirmation, ListState, View, matches_query, toggle};
use crate::api::{
    CreateHumanUserPayload, IamGroup, IamUser, ManagementApi, UpdateUserGroupsResponse, UserQuery,
};
use crate::catalog;
use crate::error::{ApiResult, ConsoleResult, FieldErrors};
use crate::notify::Notifications;
use crate::select::SearchableSelect;
use log::{debug, info};
use std::sync::Arc;

/// Editable fields of the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Username,
    Email,
    FirstName,
    LastName,
    Password,
}

impl UserField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Password => "password",
        }
    }
}

/// Human user creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub show_password: bool,
    pub groups: Vec<String>,
}

impl UserForm {
    pub fn set(&mut self, field: UserField, value: impl Into<String>) {
        let value = value.into();
        match field {
            UserField::Username => self.username = value,
            UserField::Email => self.email = value,
            UserField::FirstName => self.first_name = value,
            UserField::LastName => self.last_name = value,
            UserField::Password => self.password = value,
        }
    }

    pub fn toggle_group(&mut self, group: &str) {
        toggle(&mut self.groups, group);
    }

    /// Check every field, collecting one message per offending field.
    ///
    /// The password is not trimmed: whitespace is a valid password.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !looks_like_email(email) {
            errors.insert("email", "Enter a valid email address");
        }
        if self.first_name.trim().is_empty() {
            errors.insert("first_name", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.insert("last_name", "Last name is required");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        errors
    }

    /// The creation request for this form. Groups are omitted when none
    /// are selected.
    pub fn to_payload(&self) -> CreateHumanUserPayload {
        CreateHumanUserPayload {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password: Some(self.password.clone()),
            groups: (!self.groups.is_empty()).then(|| self.groups.clone()),
        }
    }
}

/// Loose email check: somewhere in the text, non-blank characters, an `@`,
/// more non-blank characters, a dot, and at least one more.
pub fn looks_like_email(text: &str) -> bool {
    text.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            if c != '@' || at == 0 {
                return false;
            }
            let domain = &token[at + 1..];
            domain
                .char_indices()
                .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}

/// Membership being edited for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEdit {
    pub username: String,
    pub groups: Vec<String>,
}

/// State behind the users screen.
pub struct UsersController<A: ManagementApi> {
    api: Arc<A>,
    users: ListState<IamUser>,
    groups: ListState<IamGroup>,
    search: String,
    view: View,
    form: UserForm,
    errors: FieldErrors,
    editing: Option<GroupEdit>,
    delete: DeleteConfirmation,
    notifications: Notifications,
}

impl<A: ManagementApi> UsersController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            users: ListState::new(),
            groups: ListState::new(),
            search: String::new(),
            view: View::List,
            form: UserForm::default(),
            errors: FieldErrors::new(),
            editing: None,
            delete: DeleteConfirmation::default(),
            notifications: Notifications::new(),
        }
    }

    pub async fn refresh(&mut self) {
        self.users.begin_load();
        let result = self.api.list_users(UserQuery::default()).await;
        self.users.finish_load(result, "Failed to load users");
    }

    /// Fetch the groups offered in the form and the membership editor.
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

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Users whose username, email or name contains the search query.
    pub fn filtered_users(&self) -> Vec<&IamUser> {
        self.users
            .items()
            .iter()
            .filter(|u| {
                matches_query(
                    &self.search,
                    &[
                        Some(u.username.as_str()),
                        u.email.as_deref(),
                        u.first_name.as_deref(),
                        u.last_name.as_deref(),
                    ],
                )
            })
            .collect()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn form(&self) -> &UserForm {
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
        self.form = UserForm::default();
        self.errors = FieldErrors::new();
        self.view = View::List;
    }

    /// Edit a form field, clearing its validation message.
    pub fn set_field(&mut self, field: UserField, value: impl Into<String>) {
        self.form.set(field, value);
        self.errors.clear(field.key());
    }

    pub fn toggle_form_group(&mut self, group: &str) {
        self.form.toggle_group(group);
    }

    pub fn toggle_show_password(&mut self) {
        self.form.show_password = !self.form.show_password;
    }

    /// Validate and submit the creation form.
    pub async fn create(&mut self) -> ConsoleResult<IamUser> {
        self.errors = self.form.validate();
        if let Err(e) = self.errors.clone().into_result() {
            debug!("User form rejected: {}", e);
            return Err(e.into());
        }

        let payload = self.form.to_payload();
        let username = payload.username.clone();
        match self.api.create_human_user(payload).await {
            Ok(user) => {
                self.notifications
                    .success(format!("User \"{username}\" created successfully"));
                self.close_create();
                self.refresh().await;
                Ok(user)
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to create user"));
                Err(e.into())
            }
        }
    }

    /// Begin editing a listed user's groups.
    pub fn start_edit_groups(&mut self, username: &str) {
        let groups = self
            .users
            .items()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.groups.clone())
            .unwrap_or_default();
        self.editing = Some(GroupEdit {
            username: username.to_string(),
            groups,
        });
    }

    pub fn editing(&self) -> Option<&GroupEdit> {
        self.editing.as_ref()
    }

    pub fn cancel_edit_groups(&mut self) {
        self.editing = None;
    }

    pub fn toggle_edit_group(&mut self, group: &str) {
        if let Some(edit) = self.editing.as_mut() {
            toggle(&mut edit.groups, group);
        }
    }

    pub fn add_group_to_edit(&mut self, group: &str) {
        if let Some(edit) = self.editing.as_mut() {
            if !group.is_empty() && !edit.groups.iter().any(|g| g == group) {
                edit.groups.push(group.to_string());
            }
        }
    }

    pub fn remove_group_from_edit(&mut self, group: &str) {
        if let Some(edit) = self.editing.as_mut() {
            edit.groups.retain(|g| g != group);
        }
    }

    /// Picker for adding a group the edited user is not in yet.
    pub fn group_select(&self) -> SearchableSelect {
        let selected = self.editing.iter().flat_map(|edit| edit.groups.iter());
        SearchableSelect::new(catalog::group_options(self.groups.items(), selected))
            .with_max_description_words(5)
    }

    /// Save the edited membership. Does nothing when no edit is open.
    pub async fn save_groups(&mut self) -> ApiResult<Option<UpdateUserGroupsResponse>> {
        let Some(edit) = self.editing.clone() else {
            return Ok(None);
        };
        match self.api.update_user_groups(&edit.username, edit.groups).await {
            Ok(response) => {
                let (added, removed) = (response.added.len(), response.removed.len());
                if added > 0 || removed > 0 {
                    self.notifications
                        .success(format!("Groups updated: {added} added, {removed} removed"));
                } else {
                    self.notifications.info("No changes made");
                }
                self.editing = None;
                self.refresh().await;
                Ok(Some(response))
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to update groups"));
                Err(e)
            }
        }
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
                info!("User '{}' deleted", username);
                self.notifications.success(format!("User \"{username}\" deleted"));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.notifications.error(e.message_or("Failed to delete user"));
                Err(e)
            }
        }
    }
}
