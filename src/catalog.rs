//! Server and agent catalog views.
//!
//! The catalog listings feed the pickers of the group form and the dashboard
//! counters. Entries are normalized here so the rest of the console never
//! deals with the listing's optional fields.

use crate::api::{CatalogAgent, CatalogServer, IamGroup, ManagementApi};
use crate::error::ApiResult;
use crate::scope::WILDCARD;
use crate::select::SelectOption;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A server as offered in the server picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub path: String,
    pub name: String,
    pub description: String,
}

impl From<CatalogServer> for ServerInfo {
    fn from(server: CatalogServer) -> Self {
        let name = server
            .server_name
            .filter(|n| !n.is_empty())
            .or(server.name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| server.path.clone());
        Self {
            path: server.path,
            name,
            description: server.description.unwrap_or_default(),
        }
    }
}

/// An agent as offered in the agent picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub path: String,
    pub description: String,
}

impl From<CatalogAgent> for AgentInfo {
    fn from(agent: CatalogAgent) -> Self {
        Self {
            name: agent.name,
            path: agent.path,
            description: agent.description.unwrap_or_default(),
        }
    }
}

/// Normalize the server listing and sort it by name.
pub fn normalize_servers(servers: Vec<CatalogServer>) -> Vec<ServerInfo> {
    let mut servers: Vec<ServerInfo> = servers.into_iter().map(ServerInfo::from).collect();
    servers.sort_by(|a, b| a.name.cmp(&b.name));
    servers
}

/// Normalize the agent listing and sort it by name.
pub fn normalize_agents(agents: Vec<CatalogAgent>) -> Vec<AgentInfo> {
    let mut agents: Vec<AgentInfo> = agents.into_iter().map(AgentInfo::from).collect();
    agents.sort_by(|a, b| a.name.cmp(&b.name));
    agents
}

pub async fn load_servers<A: ManagementApi>(api: &A) -> ApiResult<Vec<ServerInfo>> {
    let servers = normalize_servers(api.list_servers().await?);
    debug!("Loaded {} catalog servers", servers.len());
    Ok(servers)
}

pub async fn load_agents<A: ManagementApi>(api: &A) -> ApiResult<Vec<AgentInfo>> {
    let agents = normalize_agents(api.list_agents().await?);
    debug!("Loaded {} catalog agents", agents.len());
    Ok(agents)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Picker options for a server-access row, keyed by server path.
pub fn server_options(servers: &[ServerInfo]) -> Vec<SelectOption> {
    servers
        .iter()
        .map(|s| SelectOption {
            value: s.path.clone(),
            label: format!("{} ({})", s.name, s.path),
            description: non_empty(&s.description),
        })
        .collect()
}

/// The option granting access to every server.
pub fn all_servers_option() -> SelectOption {
    SelectOption::new(WILDCARD, "* (All servers)").with_description("Grant access to all servers")
}

/// Picker options for agents not selected yet.
pub fn agent_options(agents: &[AgentInfo], selected: &[String]) -> Vec<SelectOption> {
    agents
        .iter()
        .filter(|a| !selected.contains(&a.name))
        .map(|a| SelectOption {
            value: a.name.clone(),
            label: a.name.clone(),
            description: non_empty(&a.description),
        })
        .collect()
}

/// Picker options for groups a user is not a member of yet.
pub fn group_options<'a>(
    groups: &[IamGroup],
    selected: impl IntoIterator<Item = &'a String>,
) -> Vec<SelectOption> {
    let selected: Vec<&String> = selected.into_iter().collect();
    groups
        .iter()
        .filter(|g| !selected.contains(&&g.name))
        .map(|g| SelectOption {
            value: g.name.clone(),
            label: g.name.clone(),
            description: g.path.as_deref().and_then(non_empty),
        })
        .collect()
}

/// Health of a server as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    /// Map the registry's free-form health string.
    pub fn from_report(status: &str) -> Self {
        match status {
            "" | "unknown" => Self::Unknown,
            "healthy" => Self::Healthy,
            s if s.contains("unhealthy") || s.contains("error") || s.contains("timeout") => {
                Self::Unhealthy
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
        })
    }
}

/// A dashboard card for one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub name: String,
    pub path: String,
    pub description: String,
    pub official: bool,
    pub enabled: bool,
    pub tags: Vec<String>,
    pub last_checked_time: Option<String>,
    pub rating: f64,
    pub status: HealthStatus,
    pub num_tools: u32,
}

impl From<&CatalogServer> for ServerSummary {
    fn from(server: &CatalogServer) -> Self {
        Self {
            name: server
                .display_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown Server".to_string()),
            path: server.path.clone(),
            description: server.description.clone().unwrap_or_default(),
            official: server.is_official.unwrap_or(false),
            enabled: server.is_enabled.unwrap_or(false),
            tags: server.tags.clone().unwrap_or_default(),
            last_checked_time: server.last_checked_iso.clone(),
            rating: server.num_stars.unwrap_or(0.0),
            status: HealthStatus::from_report(server.health_status.as_deref().unwrap_or("unknown")),
            num_tools: server.num_tools.unwrap_or(0),
        }
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub with_issues: usize,
}

impl ServerStats {
    pub fn from_summaries(servers: &[ServerSummary]) -> Self {
        let mut stats = Self::default();
        for server in servers {
            stats.total += 1;
            if server.enabled {
                stats.enabled += 1;
            } else {
                stats.disabled += 1;
            }
            if server.status == HealthStatus::Unhealthy {
                stats.with_issues += 1;
            }
        }
        stats
    }
}

/// Fetch the server listing and compute the dashboard view.
///
/// A failed fetch yields empty counters alongside the error.
pub async fn load_server_stats<A: ManagementApi>(
    api: &A,
) -> (Vec<ServerSummary>, ServerStats, Option<String>) {
    match api.list_servers().await {
        Ok(servers) => {
            let summaries: Vec<ServerSummary> = servers.iter().map(ServerSummary::from).collect();
            let stats = ServerStats::from_summaries(&summaries);
            (summaries, stats, None)
        }
        Err(e) => (
            Vec::new(),
            ServerStats::default(),
            Some(e.message_or("Failed to fetch servers")),
        ),
    }
}
