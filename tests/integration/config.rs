//! Registry configuration fetching.

use crate::common::init_logging;
use iam_console::api::{InMemoryManagementApi, ManagementApi};
use iam_console::config::{
    DeploymentMode, RegistryConfig, RegistryConfigCache, RegistryMode, deployment_badge,
    get_config, reset_config_cache,
};
use iam_console::error::RequestError;

fn registry_only_api() -> InMemoryManagementApi {
    InMemoryManagementApi::new().with_registry_config(RegistryConfig::new(
        DeploymentMode::RegistryOnly,
        RegistryMode::SkillsOnly,
    ))
}

// The only test touching the process-wide cache.
#[tokio::test]
async fn test_global_cache_fetches_once_until_reset() {
    init_logging();
    reset_config_cache().await;
    let api = registry_only_api();

    let first = get_config(&api).await;
    let second = get_config(&api).await;
    assert_eq!(first, second);
    assert!(first.is_registry_only());
    assert!(!first.nginx_updates_enabled);
    assert_eq!(api.request_count(), 1);

    reset_config_cache().await;
    get_config(&api).await;
    assert_eq!(api.request_count(), 2);
    reset_config_cache().await;
}

#[tokio::test]
async fn test_failed_fetch_falls_back_and_retries() {
    init_logging();
    let cache = RegistryConfigCache::new();
    let api = registry_only_api();
    api.fail_next(RequestError::new(503, None)).await;

    let fallback = cache.get_or_load(&api).await;
    assert_eq!(fallback, RegistryConfig::default());
    assert!(cache.peek().await.is_none());
    assert_eq!(deployment_badge(Some(&fallback)), None);

    let loaded = cache.get_or_load(&api).await;
    assert_eq!(loaded.registry_mode, RegistryMode::SkillsOnly);
    assert!(loaded.features.skills);
    assert!(!loaded.features.gateway_proxy);
    assert_eq!(deployment_badge(Some(&loaded)), Some("Registry Only"));
    assert_eq!(cache.peek().await, Some(loaded));
}

#[tokio::test]
async fn test_concurrent_first_callers_share_one_fetch() {
    let cache = RegistryConfigCache::new();
    let api = registry_only_api();

    let results = futures::future::join_all((0..8).map(|_| cache.get_or_load(&api))).await;
    assert!(results.iter().all(|c| c.is_registry_only()));
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn test_default_configuration() {
    let api = InMemoryManagementApi::new();
    let config = api.get_registry_config().await.unwrap();
    assert_eq!(config.deployment_mode, DeploymentMode::WithGateway);
    assert_eq!(config.registry_mode, RegistryMode::Full);
    assert!(config.nginx_updates_enabled);
    assert!(config.features.mcp_servers && config.features.agents);
    assert_eq!(deployment_badge(None), None);
}
