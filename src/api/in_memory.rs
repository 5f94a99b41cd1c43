//! In-memory Management API.
//!
//! A thread-safe stand-in for the real Management API, used by tests, demos
//! and the documentation examples. It enforces the same contract the console
//! relies on:
//!
//! * Group creation persists only `name` and `description`; `scope_config`
//!   is accepted and dropped. Scope members become visible only after an
//!   explicit group update.
//! * Machine-account secrets are returned once. Only a SHA-256 digest is
//!   kept, so the secret cannot be read back, only verified.
//! * Group membership updates replace the whole set and report the diff.
//!
//! Failures can be scripted with [`InMemoryManagementApi::fail_next`] to
//! exercise error paths, and every request is counted so tests can assert
//! that client-side validation kept a form from reaching the API.

use super::ManagementApi;
use super::types::{
    CatalogAgent, CatalogServer, CreateGroupPayload, CreateHumanUserPayload, CreateM2mPayload,
    GroupDetail, IamGroup, IamUser, M2mCredentials, SERVICE_ACCOUNT_EMAIL_DOMAIN,
    UpdateGroupPayload, UpdateUserGroupsResponse, UserQuery,
};
use crate::config::RegistryConfig;
use crate::error::{ApiResult, RequestError};
use crate::scope::{PermissionGrant, ServerAccessRule};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct GroupRecord {
    id: String,
    name: String,
    description: Option<String>,
    server_access: Option<Vec<ServerAccessRule>>,
    group_mappings: Option<Vec<String>>,
    ui_permissions: Option<BTreeMap<String, PermissionGrant>>,
    agent_access: Option<Vec<String>>,
}

impl GroupRecord {
    fn detail(&self) -> GroupDetail {
        GroupDetail {
            id: self.id.clone(),
            name: self.name.clone(),
            path: Some(format!("/{}", self.name)),
            description: self.description.clone(),
            server_access: self.server_access.clone(),
            group_mappings: self.group_mappings.clone(),
            ui_permissions: self.ui_permissions.clone(),
            agent_access: self.agent_access.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Directory {
    groups: BTreeMap<String, GroupRecord>,
    users: BTreeMap<String, IamUser>,
    // username -> digest; humans store a password digest, machines a secret digest
    credential_digests: HashMap<String, String>,
}

impl Directory {
    fn members_count(&self, group: &str) -> u32 {
        self.users
            .values()
            .filter(|user| user.groups.iter().any(|g| g == group))
            .count() as u32
    }

    fn check_groups_exist(&self, groups: &[String]) -> ApiResult<()> {
        match groups.iter().find(|g| !self.groups.contains_key(g.as_str())) {
            Some(missing) => Err(RequestError::with_detail(
                400,
                format!("Group '{missing}' does not exist"),
            )),
            None => Ok(()),
        }
    }
}

/// Thread-safe in-memory implementation of [`ManagementApi`].
///
/// Clones share the same directory.
#[derive(Clone, Default)]
pub struct InMemoryManagementApi {
    directory: Arc<RwLock<Directory>>,
    failures: Arc<Mutex<VecDeque<RequestError>>>,
    requests: Arc<AtomicUsize>,
    config: Option<RegistryConfig>,
    servers: Vec<CatalogServer>,
    agents: Vec<CatalogAgent>,
}

impl InMemoryManagementApi {
    /// Create an empty API with the default registry configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this registry configuration from the config endpoint.
    pub fn with_registry_config(mut self, config: RegistryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Serve these entries from the server catalog.
    pub fn with_servers(mut self, servers: Vec<CatalogServer>) -> Self {
        self.servers = servers;
        self
    }

    /// Serve these entries from the agent catalog.
    pub fn with_agents(mut self, agents: Vec<CatalogAgent>) -> Self {
        self.agents = agents;
        self
    }

    /// Make the next request fail with `error`. Queued failures are consumed
    /// in order, one per request.
    pub async fn fail_next(&self, error: RequestError) {
        self.failures.lock().await.push_back(error);
    }

    /// Number of requests received so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Check a machine-account secret against the stored digest.
    pub async fn verify_client_secret(&self, client_id: &str, secret: &str) -> bool {
        let directory = self.directory.read().await;
        directory
            .credential_digests
            .get(&service_account_username(client_id))
            .is_some_and(|stored| *stored == digest(secret))
    }

    async fn begin_request(&self, operation: &str) -> ApiResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().await.pop_front() {
            warn!("Scripted failure for {}: status {}", operation, error.status);
            return Err(error);
        }
        debug!("Handling {}", operation);
        Ok(())
    }
}

impl ManagementApi for InMemoryManagementApi {
    async fn list_groups(&self) -> ApiResult<Vec<IamGroup>> {
        self.begin_request("list_groups").await?;
        let directory = self.directory.read().await;
        Ok(directory
            .groups
            .values()
            .map(|record| IamGroup {
                name: record.name.clone(),
                description: record.description.clone(),
                path: Some(format!("/{}", record.name)),
                members_count: Some(directory.members_count(&record.name)),
            })
            .collect())
    }

    async fn create_group(&self, payload: CreateGroupPayload) -> ApiResult<IamGroup> {
        self.begin_request("create_group").await?;
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(RequestError::unprocessable(&[("name", "field required")]));
        }

        let mut directory = self.directory.write().await;
        if directory.groups.contains_key(&name) {
            return Err(RequestError::conflict("Group", &name));
        }
        if payload.scope_config.is_some() {
            debug!("Group '{}': scope_config accepted but not persisted", name);
        }

        let record = GroupRecord {
            id: Uuid::new_v4().to_string(),
            name: name.clone(),
            description: payload.description.filter(|d| !d.is_empty()),
            server_access: None,
            group_mappings: None,
            ui_permissions: None,
            agent_access: None,
        };
        let group = IamGroup {
            name: name.clone(),
            description: record.description.clone(),
            path: Some(format!("/{name}")),
            members_count: Some(0),
        };
        directory.groups.insert(name.clone(), record);
        info!("Created group '{}'", name);
        Ok(group)
    }

    async fn delete_group(&self, name: &str) -> ApiResult<()> {
        self.begin_request("delete_group").await?;
        let mut directory = self.directory.write().await;
        if directory.groups.remove(name).is_none() {
            return Err(RequestError::not_found("Group", name));
        }
        for user in directory.users.values_mut() {
            user.groups.retain(|g| g != name);
        }
        info!("Deleted group '{}'", name);
        Ok(())
    }

    async fn get_group(&self, name: &str) -> ApiResult<GroupDetail> {
        self.begin_request("get_group").await?;
        let directory = self.directory.read().await;
        directory
            .groups
            .get(name)
            .map(GroupRecord::detail)
            .ok_or_else(|| RequestError::not_found("Group", name))
    }

    async fn update_group(
        &self,
        name: &str,
        payload: UpdateGroupPayload,
    ) -> ApiResult<GroupDetail> {
        self.begin_request("update_group").await?;
        let mut directory = self.directory.write().await;
        let record = directory
            .groups
            .get_mut(name)
            .ok_or_else(|| RequestError::not_found("Group", name))?;

        if let Some(description) = payload.description {
            record.description = Some(description);
        }
        if let Some(scope) = payload.scope_config {
            if let Some(server_access) = scope.server_access {
                record.server_access = Some(server_access);
            }
            if let Some(ui_permissions) = scope.ui_permissions {
                record.ui_permissions = Some(ui_permissions);
            }
            if let Some(agent_access) = scope.agent_access {
                record.agent_access = Some(agent_access);
            }
        }
        info!("Updated group '{}'", name);
        Ok(record.detail())
    }

    async fn list_users(&self, query: UserQuery) -> ApiResult<Vec<IamUser>> {
        self.begin_request("list_users").await?;
        let directory = self.directory.read().await;
        let term = query.search.as_deref().map(str::to_lowercase);
        Ok(directory
            .users
            .values()
            .filter(|user| match &term {
                Some(term) => user_matches(user, term),
                None => true,
            })
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn create_human_user(&self, payload: CreateHumanUserPayload) -> ApiResult<IamUser> {
        self.begin_request("create_human_user").await?;
        let mut invalid = Vec::new();
        if payload.username.trim().is_empty() {
            invalid.push(("username", "field required"));
        }
        if !payload.email.contains('@') {
            invalid.push(("email", "value is not a valid email address"));
        }
        if !invalid.is_empty() {
            return Err(RequestError::unprocessable(&invalid));
        }

        let mut directory = self.directory.write().await;
        if directory.users.contains_key(&payload.username) {
            return Err(RequestError::conflict("User", &payload.username));
        }
        let groups = payload.groups.unwrap_or_default();
        directory.check_groups_exist(&groups)?;

        let user = IamUser {
            username: payload.username.clone(),
            email: Some(payload.email),
            first_name: Some(payload.first_name),
            last_name: Some(payload.last_name),
            groups,
            enabled: Some(true),
            is_admin: Some(false),
            account_type: Some("human".to_string()),
            service_accounts_enabled: Some(false),
        };
        if let Some(password) = payload.password {
            directory
                .credential_digests
                .insert(user.username.clone(), digest(&password));
        }
        directory.users.insert(user.username.clone(), user.clone());
        info!("Created user '{}'", user.username);
        Ok(user)
    }

    async fn create_m2m_account(&self, payload: CreateM2mPayload) -> ApiResult<M2mCredentials> {
        self.begin_request("create_m2m_account").await?;
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(RequestError::unprocessable(&[("name", "field required")]));
        }

        let mut directory = self.directory.write().await;
        let username = service_account_username(&name);
        if directory.users.contains_key(&username) {
            return Err(RequestError::conflict("M2M account", &name));
        }
        let groups = payload.groups.unwrap_or_default();
        directory.check_groups_exist(&groups)?;

        let client_secret = generate_secret();
        directory
            .credential_digests
            .insert(username.clone(), digest(&client_secret));
        directory.users.insert(
            username.clone(),
            IamUser {
                username,
                email: Some(format!("{name}{SERVICE_ACCOUNT_EMAIL_DOMAIN}")),
                first_name: None,
                last_name: None,
                groups,
                enabled: Some(true),
                is_admin: Some(false),
                account_type: Some("m2m".to_string()),
                service_accounts_enabled: Some(true),
            },
        );
        info!("Created M2M account '{}'", name);

        Ok(M2mCredentials {
            client_id: name.clone(),
            client_secret,
            name,
        })
    }

    async fn delete_user(&self, username: &str) -> ApiResult<()> {
        self.begin_request("delete_user").await?;
        let mut directory = self.directory.write().await;
        if directory.users.remove(username).is_none() {
            return Err(RequestError::not_found("User", username));
        }
        directory.credential_digests.remove(username);
        info!("Deleted user '{}'", username);
        Ok(())
    }

    async fn update_user_groups(
        &self,
        username: &str,
        groups: Vec<String>,
    ) -> ApiResult<UpdateUserGroupsResponse> {
        self.begin_request("update_user_groups").await?;
        let mut directory = self.directory.write().await;
        directory.check_groups_exist(&groups)?;
        let user = directory
            .users
            .get_mut(username)
            .ok_or_else(|| RequestError::not_found("User", username))?;

        let mut requested: Vec<String> = Vec::with_capacity(groups.len());
        for group in groups {
            if !requested.contains(&group) {
                requested.push(group);
            }
        }
        let added: Vec<String> = requested
            .iter()
            .filter(|g| !user.groups.contains(g))
            .cloned()
            .collect();
        let removed: Vec<String> = user
            .groups
            .iter()
            .filter(|g| !requested.contains(g))
            .cloned()
            .collect();
        user.groups = requested;

        info!(
            "Updated groups for '{}': {} added, {} removed",
            username,
            added.len(),
            removed.len()
        );
        Ok(UpdateUserGroupsResponse {
            username: username.to_string(),
            groups: user.groups.clone(),
            added,
            removed,
        })
    }

    async fn get_registry_config(&self) -> ApiResult<RegistryConfig> {
        self.begin_request("get_registry_config").await?;
        Ok(self.config.clone().unwrap_or_default())
    }

    async fn list_servers(&self) -> ApiResult<Vec<CatalogServer>> {
        self.begin_request("list_servers").await?;
        Ok(self.servers.clone())
    }

    async fn list_agents(&self) -> ApiResult<Vec<CatalogAgent>> {
        self.begin_request("list_agents").await?;
        Ok(self.agents.clone())
    }
}

fn user_matches(user: &IamUser, term: &str) -> bool {
    std::iter::once(Some(user.username.as_str()))
        .chain([
            user.email.as_deref(),
            user.first_name.as_deref(),
            user.last_name.as_deref(),
        ])
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

fn service_account_username(client_id: &str) -> String {
    format!("service-account-{client_id}")
}

fn generate_secret() -> String {
    let mut bytes = Vec::with_capacity(32);
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn digest(secret: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(secret.as_bytes()))
}
