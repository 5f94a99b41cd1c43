//! Registry configuration and its process-wide cache.
//!
//! The registry reports how it is deployed (`GET /api/config`). The console
//! asks once and reuses the answer; a failed fetch falls back to the default
//! configuration without caching it, so the next caller retries.
//!
//! # Example Usage
//!
//! ```rust
//! use iam_console::api::InMemoryManagementApi;
//! use iam_console::config::{self, DeploymentMode};
//!
//! # async fn example() {
//! let api = InMemoryManagementApi::new();
//! let config = config::get_config(&api).await;
//! assert_eq!(config.deployment_mode, DeploymentMode::WithGateway);
//! config::reset_config_cache().await;
//! # }
//! ```

use crate::api::ManagementApi;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tokio::sync::Mutex;

/// How the registry is deployed relative to the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    #[default]
    WithGateway,
    RegistryOnly,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WithGateway => "with-gateway",
            Self::RegistryOnly => "registry-only",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalogs the registry serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryMode {
    #[default]
    Full,
    SkillsOnly,
    McpServersOnly,
    AgentsOnly,
}

impl RegistryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::SkillsOnly => "skills-only",
            Self::McpServersOnly => "mcp-servers-only",
            Self::AgentsOnly => "agents-only",
        }
    }
}

impl fmt::Display for RegistryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature switches implied by the deployment and registry modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub mcp_servers: bool,
    pub agents: bool,
    pub skills: bool,
    pub federation: bool,
    pub gateway_proxy: bool,
}

impl Features {
    /// Derive the feature set for a pair of modes.
    pub fn for_modes(deployment: DeploymentMode, registry: RegistryMode) -> Self {
        use RegistryMode::*;
        Self {
            mcp_servers: matches!(registry, Full | McpServersOnly),
            agents: matches!(registry, Full | AgentsOnly),
            skills: matches!(registry, Full | SkillsOnly),
            federation: registry == Full,
            gateway_proxy: deployment == DeploymentMode::WithGateway,
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::for_modes(DeploymentMode::default(), RegistryMode::default())
    }
}

/// Registry deployment configuration as served by `GET /api/config`.
///
/// A response without `features` gets the feature set implied by its modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryConfigWire")]
pub struct RegistryConfig {
    pub deployment_mode: DeploymentMode,
    pub registry_mode: RegistryMode,
    pub nginx_updates_enabled: bool,
    pub features: Features,
}

/// `GET /api/config` body with every member optional.
#[derive(Deserialize)]
struct RegistryConfigWire {
    #[serde(default)]
    deployment_mode: DeploymentMode,
    #[serde(default)]
    registry_mode: RegistryMode,
    #[serde(default = "default_nginx_updates")]
    nginx_updates_enabled: bool,
    #[serde(default)]
    features: Option<Features>,
}

impl From<RegistryConfigWire> for RegistryConfig {
    fn from(wire: RegistryConfigWire) -> Self {
        let features = wire
            .features
            .unwrap_or_else(|| Features::for_modes(wire.deployment_mode, wire.registry_mode));
        Self {
            deployment_mode: wire.deployment_mode,
            registry_mode: wire.registry_mode,
            nginx_updates_enabled: wire.nginx_updates_enabled,
            features,
        }
    }
}

fn default_nginx_updates() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DeploymentMode::default(), RegistryMode::default())
    }
}

impl RegistryConfig {
    /// Build a configuration whose features follow from the modes.
    ///
    /// Nginx updates are only performed when the gateway is deployed.
    pub fn new(deployment_mode: DeploymentMode, registry_mode: RegistryMode) -> Self {
        Self {
            deployment_mode,
            registry_mode,
            nginx_updates_enabled: deployment_mode == DeploymentMode::WithGateway,
            features: Features::for_modes(deployment_mode, registry_mode),
        }
    }

    pub fn is_registry_only(&self) -> bool {
        self.deployment_mode == DeploymentMode::RegistryOnly
    }
}

/// Badge shown next to the product name, if any.
///
/// Nothing is shown while the configuration is still unknown.
pub fn deployment_badge(config: Option<&RegistryConfig>) -> Option<&'static str> {
    config
        .filter(|config| config.is_registry_only())
        .map(|_| "Registry Only")
}

/// Lazily fetched, resettable registry configuration.
///
/// The lock is held across the fetch so concurrent first callers issue a
/// single request.
#[derive(Debug, Default)]
pub struct RegistryConfigCache {
    cached: Mutex<Option<RegistryConfig>>,
}

impl RegistryConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached configuration, fetching it on first use.
    pub async fn get_or_load<A: ManagementApi>(&self, api: &A) -> RegistryConfig {
        let mut cached = self.cached.lock().await;
        if let Some(config) = cached.as_ref() {
            return config.clone();
        }

        match api.get_registry_config().await {
            Ok(config) => {
                debug!(
                    "Registry config loaded: {} / {}",
                    config.deployment_mode, config.registry_mode
                );
                *cached = Some(config.clone());
                config
            }
            Err(e) => {
                error!("Failed to fetch registry config: {}", e);
                RegistryConfig::default()
            }
        }
    }

    /// The cached configuration without fetching.
    pub async fn peek(&self) -> Option<RegistryConfig> {
        self.cached.lock().await.clone()
    }

    /// Forget the cached configuration.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
    }
}

static CONFIG_CACHE: LazyLock<RegistryConfigCache> = LazyLock::new(RegistryConfigCache::new);

/// Process-wide [`RegistryConfigCache::get_or_load`].
pub async fn get_config<A: ManagementApi>(api: &A) -> RegistryConfig {
    CONFIG_CACHE.get_or_load(api).await
}

/// Process-wide [`RegistryConfigCache::reset`].
pub async fn reset_config_cache() {
    CONFIG_CACHE.reset().await;
}
