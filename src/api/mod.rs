//! Management API contract.
//!
//! The console never talks to the identity provider directly. Every read and
//! mutation goes through the Management API, described here by the
//! [`ManagementApi`] trait so the controllers stay independent of transport.
//!
//! # Consistency
//!
//! The only guarantee the console relies on is "re-fetch after mutation":
//! after each create, update or delete the affected list is loaded again.
//! Requests are never de-duplicated or cancelled; when two submissions race
//! the last response wins.
//!
//! # Example Usage
//!
//! ```rust
//! use iam_console::api::{CreateGroupPayload, InMemoryManagementApi, ManagementApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryManagementApi::new();
//! api.create_group(CreateGroupPayload {
//!     name: "ops".to_string(),
//!     description: None,
//!     scope_config: None,
//! })
//! .await?;
//!
//! let groups = api.list_groups().await?;
//! assert_eq!(groups[0].name, "ops");
//! # Ok(())
//! # }
//! ```

pub mod in_memory;
pub mod types;

pub use in_memory::InMemoryManagementApi;
pub use types::{
    CatalogAgent, CatalogServer, CreateGroupPayload, CreateHumanUserPayload, CreateM2mPayload,
    GroupDetail, GroupScopeUpdate, IamGroup, IamUser, M2mCredentials, UpdateGroupPayload,
    UpdateUserGroupsResponse, UserQuery, parse_list,
};

use crate::config::RegistryConfig;
use crate::error::ApiResult;
use std::future::Future;

/// Operations the console performs against the Management API.
///
/// Failures are reported as [`RequestError`](crate::error::RequestError)
/// carrying the HTTP status and the server's `detail`, if any.
///
/// # List Responses
///
/// Depending on the deployment, list endpoints answer either with an
/// envelope (`{"groups": [...]}`, `{"users": [...]}`, `{"servers": [...]}`,
/// `{"agents": [...]}`) or with the bare array. HTTP implementations must
/// decode list bodies with [`parse_list`], passing the envelope member, so
/// both shapes reach the controllers as the same `Vec`.
pub trait ManagementApi: Send + Sync {
    /// `GET /api/management/iam/groups`, envelope member `groups`
    fn list_groups(&self) -> impl Future<Output = ApiResult<Vec<IamGroup>>> + Send;

    /// `POST /api/management/iam/groups`
    fn create_group(
        &self,
        payload: CreateGroupPayload,
    ) -> impl Future<Output = ApiResult<IamGroup>> + Send;

    /// `DELETE /api/management/iam/groups/{name}`
    fn delete_group(&self, name: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// `GET /api/management/iam/groups/{name}`
    fn get_group(&self, name: &str) -> impl Future<Output = ApiResult<GroupDetail>> + Send;

    /// `PATCH /api/management/iam/groups/{name}`
    fn update_group(
        &self,
        name: &str,
        payload: UpdateGroupPayload,
    ) -> impl Future<Output = ApiResult<GroupDetail>> + Send;

    /// `GET /api/management/iam/users`, envelope member `users`
    fn list_users(&self, query: UserQuery) -> impl Future<Output = ApiResult<Vec<IamUser>>> + Send;

    /// `POST /api/management/iam/users/human`
    fn create_human_user(
        &self,
        payload: CreateHumanUserPayload,
    ) -> impl Future<Output = ApiResult<IamUser>> + Send;

    /// `POST /api/management/iam/users/m2m`
    ///
    /// The returned secret is never retrievable again.
    fn create_m2m_account(
        &self,
        payload: CreateM2mPayload,
    ) -> impl Future<Output = ApiResult<M2mCredentials>> + Send;

    /// `DELETE /api/management/iam/users/{username}`
    fn delete_user(&self, username: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// `PATCH /api/management/iam/users/{username}/groups`
    ///
    /// `groups` is the complete new set, not a delta.
    fn update_user_groups(
        &self,
        username: &str,
        groups: Vec<String>,
    ) -> impl Future<Output = ApiResult<UpdateUserGroupsResponse>> + Send;

    /// `GET /api/config`
    fn get_registry_config(&self) -> impl Future<Output = ApiResult<RegistryConfig>> + Send;

    /// `GET /api/servers`, envelope member `servers`
    fn list_servers(&self) -> impl Future<Output = ApiResult<Vec<CatalogServer>>> + Send;

    /// `GET /api/agents`, envelope member `agents`
    fn list_agents(&self) -> impl Future<Output = ApiResult<Vec<CatalogAgent>>> + Send;
}
