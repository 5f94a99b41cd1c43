//! Machine account flows.

use crate::assert_field_error;
use crate::common::{api_with_groups, shared_api};
use iam_console::controllers::{M2mController, View};
use iam_console::controllers::m2m::MASKED_SECRET;

#[tokio::test]
async fn test_secret_is_handed_over_once() {
    let api = api_with_groups(&["ci"]).await;
    let mut m2m = M2mController::new(api.clone());
    m2m.load_groups().await;

    m2m.open_create();
    m2m.set_name(" pipeline ");
    m2m.set_description("Build pipeline");
    m2m.toggle_group("ci");
    m2m.create().await.unwrap();

    assert_eq!(m2m.view(), View::Credentials);
    let issued = m2m.issued().unwrap();
    assert_eq!(issued.client_id(), "pipeline");
    assert_eq!(issued.name(), "pipeline");
    assert_eq!(issued.displayed_secret(), MASKED_SECRET);
    assert_eq!(
        m2m.notifications().latest().unwrap().message,
        "M2M account \"pipeline\" created"
    );

    m2m.toggle_reveal_secret();
    let shown = m2m.issued().unwrap().displayed_secret().to_string();
    assert_eq!(shown.len(), 43);

    let copied = m2m.issued().unwrap().client_secret().to_string();
    m2m.copied("Client Secret");
    assert_eq!(
        m2m.notifications().latest().unwrap().message,
        "Client Secret copied to clipboard"
    );

    let credentials = m2m.take_credentials().await.unwrap();
    assert_eq!(credentials.client_secret, shown);
    assert_eq!(credentials.client_secret, copied);
    assert!(
        api.verify_client_secret(&credentials.client_id, &credentials.client_secret)
            .await
    );
    assert!(!api.verify_client_secret("pipeline", "guess").await);

    assert_eq!(m2m.take_credentials().await, None);
    assert_eq!(m2m.view(), View::List);
    let accounts: Vec<&str> = m2m.accounts().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(accounts, vec!["service-account-pipeline"]);
}

#[tokio::test]
async fn test_dismissed_secret_is_gone() {
    let api = api_with_groups(&["ci"]).await;
    let mut m2m = M2mController::new(api);
    m2m.set_name("deployer");
    m2m.toggle_group("ci");
    m2m.create().await.unwrap();

    m2m.dismiss_credentials().await;
    assert!(m2m.issued().is_none());
    assert_eq!(m2m.take_credentials().await, None);
    assert_eq!(m2m.accounts().len(), 1);
}

#[tokio::test]
async fn test_form_requires_name_and_group() {
    let api = shared_api();
    let mut m2m = M2mController::new(api.clone());

    let result = m2m.create().await;
    assert_field_error!(&result, "name");
    assert_field_error!(&result, "groups");
    assert_eq!(api.request_count(), 0);

    m2m.toggle_group("ci");
    assert_eq!(m2m.errors().get("groups"), None);
    assert_eq!(m2m.errors().get("name"), Some("Name is required"));
}

#[tokio::test]
async fn test_duplicate_account_keeps_form() {
    let api = api_with_groups(&["ci"]).await;
    let mut m2m = M2mController::new(api);
    for _ in 0..2 {
        m2m.open_create();
        m2m.set_name("pipeline");
        if m2m.form().groups.is_empty() {
            m2m.toggle_group("ci");
        }
        let _ = m2m.create().await;
    }

    assert_eq!(m2m.view(), View::Create);
    assert!(m2m.issued().is_some());
    assert_eq!(m2m.form().name, "pipeline");
    assert_eq!(
        m2m.notifications().latest().unwrap().message,
        "M2M account 'pipeline' already exists"
    );
}

#[tokio::test]
async fn test_delete_account() {
    let api = api_with_groups(&["ci"]).await;
    let mut m2m = M2mController::new(api.clone());
    m2m.set_name("pipeline");
    m2m.toggle_group("ci");
    m2m.create().await.unwrap();
    let credentials = m2m.take_credentials().await.unwrap();

    m2m.request_delete("service-account-pipeline");
    m2m.confirm_delete().await.unwrap();
    assert!(m2m.accounts().is_empty());
    assert_eq!(
        m2m.notifications().latest().unwrap().message,
        "Account \"service-account-pipeline\" deleted"
    );
    assert!(
        !api.verify_client_secret(&credentials.client_id, &credentials.client_secret)
            .await
    );
}
