//! Screen controllers for groups, users and machine accounts.
//!
//! Each controller owns the state behind one settings screen and talks to the
//! Management API through a shared [`ManagementApi`](crate::api::ManagementApi)
//! handle. They all follow the same cycle:
//!
//! 1. Load a list and filter it client-side with a search query.
//! 2. Fill in a creation form, validated before anything is sent.
//! 3. Submit, notify the outcome, and re-fetch the list on success.
//!
//! Deletes are two-step: [`DeleteConfirmation::request`] marks a target,
//! and nothing is sent until the caller confirms.

pub mod groups;
pub mod m2m;
pub mod users;

pub use groups::{Download, GroupsController};
pub use m2m::{IssuedCredentials, M2mController, M2mForm};
pub use users::{GroupEdit, UserField, UserForm, UsersController};

use crate::error::ApiResult;
use log::{debug, warn};

/// Which part of a screen is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Create,
    /// Freshly issued machine credentials.
    Credentials,
}

/// A list fetched from the Management API.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    is_loading: bool,
    error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_load(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Record a fetch outcome. A failure empties the list and keeps the
    /// server's message, or `fallback` when there is none.
    pub fn finish_load(&mut self, result: ApiResult<Vec<T>>, fallback: &str) {
        self.is_loading = false;
        match result {
            Ok(items) => {
                debug!("Loaded {} items", items.len());
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                warn!("{}: {}", fallback, e);
                self.items.clear();
                self.error = Some(e.message_or(fallback));
            }
        }
    }
}

/// Case-insensitive substring match over a record's display fields.
///
/// An empty query matches everything; missing fields never match.
pub fn matches_query(query: &str, fields: &[Option<&str>]) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Pending delete awaiting confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    target: Option<String>,
}

impl DeleteConfirmation {
    /// Ask for confirmation before deleting `target`.
    pub fn request(&mut self, target: impl Into<String>) {
        self.target = Some(target.into());
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    pub fn pending(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Take the confirmed target, leaving nothing pending.
    pub fn take(&mut self) -> Option<String> {
        self.target.take()
    }
}

/// Toggle membership of `item` in an ordered selection.
pub(crate) fn toggle(selection: &mut Vec<String>, item: &str) {
    if let Some(pos) = selection.iter().position(|s| s == item) {
        selection.remove(pos);
    } else {
        selection.push(item.to_string());
    }
}
