//! Concurrent use of a shared Management API handle.

use crate::common::{api_with_groups, shared_api};
use iam_console::api::{CreateGroupPayload, ManagementApi};
use iam_console::controllers::GroupsController;
use futures::future::join_all;

fn payload(name: &str) -> CreateGroupPayload {
    CreateGroupPayload {
        name: name.to_string(),
        description: None,
        scope_config: None,
    }
}

#[tokio::test]
async fn test_racing_duplicate_creates_store_one_group() {
    let api = shared_api();

    let results = join_all((0..10).map(|_| api.create_group(payload("ops")))).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.status == 409))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 9);
    assert_eq!(api.list_groups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_controllers_on_separate_tasks_share_state() {
    let api = api_with_groups(&["base"]).await;

    let handles: Vec<_> = ["alpha", "beta", "gamma"]
        .into_iter()
        .map(|name| {
            let api = api.clone();
            tokio::spawn(async move {
                let mut groups = GroupsController::new(api);
                groups.form_mut().name = name.to_string();
                groups.create().await.map(|g| g.name)
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut observer = GroupsController::new(api);
    observer.refresh().await;
    let names: Vec<&str> = observer
        .groups()
        .items()
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "base", "beta", "gamma"]);
}

#[test]
fn test_blocking_driver() {
    let api = shared_api();
    tokio_test::block_on(async {
        api.create_group(payload("ops")).await.unwrap();
        api.delete_group("ops").await.unwrap();
        assert!(api.delete_group("ops").await.is_err());
    });
    assert_eq!(api.request_count(), 3);
}
