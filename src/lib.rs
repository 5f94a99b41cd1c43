//! Administration core for an MCP registry console.
//!
//! Manages identity-and-access state through the registry's Management API:
//! groups carrying scope documents, human users, and machine-to-machine
//! service accounts. Everything here is UI-agnostic; a front end renders the
//! controller state and forwards user events.
//!
//! # Core Components
//!
//! - [`scope`] - Scope documents, the editable scope form and the codec between them
//! - [`api::ManagementApi`] - Contract with the Management API, plus an in-memory backend
//! - [`controllers`] - Groups, users and machine accounts screens
//! - [`config`] - Registry deployment configuration, fetched once and cached
//! - [`select`] - Type-ahead picker used by the forms
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iam_console::api::InMemoryManagementApi;
//! use iam_console::controllers::GroupsController;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(InMemoryManagementApi::new());
//! let mut groups = GroupsController::new(api);
//!
//! groups.import_json(r#"{"scope_name": "ops", "group_mappings": ["ops"]}"#)?;
//! groups.create().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod controllers;
pub mod error;
pub mod notify;
pub mod permissions;
pub mod scope;
pub mod select;

// Re-export commonly used types for convenience
pub use api::{InMemoryManagementApi, ManagementApi};
pub use config::{RegistryConfig, get_config, reset_config_cache};
pub use controllers::{GroupsController, M2mController, UsersController};
pub use error::{ConsoleError, ConsoleResult, ParseError, RequestError, ValidationError};
pub use notify::{Notification, NotificationKind};
pub use permissions::can_access_settings;
pub use scope::{ScopeConfig, ScopeForm};
