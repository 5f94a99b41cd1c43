//! Users screen flows.

use crate::assert_field_error;
use crate::common::{api_with_groups, shared_api};
use iam_console::api::{CreateM2mPayload, ManagementApi, UserQuery};
use iam_console::controllers::{UserField, UsersController, View};
use iam_console::error::RequestError;
use iam_console::notify::NotificationKind;
use iam_console::permissions::{SessionUser, can_access_settings};

fn fill_form<A: ManagementApi>(users: &mut UsersController<A>, username: &str) {
    users.set_field(UserField::Username, format!(" {username} "));
    users.set_field(UserField::Email, format!("{username}@example.com"));
    users.set_field(UserField::FirstName, "Ada");
    users.set_field(UserField::LastName, "Lovelace");
    users.set_field(UserField::Password, "correct horse");
}

#[tokio::test]
async fn test_create_user_with_groups() {
    let api = api_with_groups(&["ops", "sre"]).await;
    let mut users = UsersController::new(api.clone());
    users.load_groups().await;
    assert_eq!(users.available_groups().len(), 2);

    users.open_create();
    fill_form(&mut users, "ada");
    users.toggle_form_group("ops");

    let created = users.create().await.unwrap();
    assert_eq!(created.username, "ada");
    assert_eq!(created.groups, vec!["ops"]);
    assert_eq!(created.is_admin, Some(false));
    assert_eq!(users.view(), View::List);
    assert_eq!(users.users().items().len(), 1);
    assert_eq!(
        users.notifications().latest().unwrap().message,
        "User \"ada\" created successfully"
    );
}

#[tokio::test]
async fn test_every_missing_field_is_reported() {
    let api = shared_api();
    let mut users = UsersController::new(api.clone());
    users.open_create();
    users.set_field(UserField::Email, "not-an-email");

    let result = users.create().await;
    assert_field_error!(&result, "username");
    assert_field_error!(&result, "password");
    assert_eq!(users.errors().len(), 5);
    assert_eq!(users.errors().get("email"), Some("Enter a valid email address"));
    assert_eq!(api.request_count(), 0);

    users.set_field(UserField::Email, "ada@example.com");
    assert_eq!(users.errors().get("email"), None);
    assert_eq!(users.errors().len(), 4);
}

#[tokio::test]
async fn test_unknown_group_is_reported_by_server() {
    let api = shared_api();
    let mut users = UsersController::new(api);
    users.open_create();
    fill_form(&mut users, "ada");
    users.toggle_form_group("ghosts");

    assert!(users.create().await.is_err());
    assert_eq!(users.view(), View::Create);
    assert_eq!(users.form().username, " ada ");
    let toast = users.notifications().latest().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.message, "Group 'ghosts' does not exist");
}

#[tokio::test]
async fn test_field_errors_from_server_are_joined() {
    let api = shared_api();
    api.fail_next(RequestError::unprocessable(&[
        ("username", "username taken"),
        ("email", "email rejected"),
    ]))
    .await;
    let mut users = UsersController::new(api);
    fill_form(&mut users, "ada");

    assert!(users.create().await.is_err());
    assert_eq!(
        users.notifications().latest().unwrap().message,
        "username taken, email rejected"
    );
}

#[tokio::test]
async fn test_group_edit_reports_changes() {
    let api = api_with_groups(&["ops", "sre", "finance"]).await;
    let mut users = UsersController::new(api.clone());
    users.load_groups().await;
    fill_form(&mut users, "ada");
    users.toggle_form_group("ops");
    users.create().await.unwrap();

    users.start_edit_groups("ada");
    assert_eq!(users.editing().unwrap().groups, vec!["ops"]);
    let offered: Vec<String> = users
        .group_select()
        .filtered_options()
        .iter()
        .map(|o| o.value.clone())
        .collect();
    assert_eq!(offered, vec!["finance", "sre"]);

    users.add_group_to_edit("sre");
    users.add_group_to_edit("finance");
    users.remove_group_from_edit("ops");
    let response = users.save_groups().await.unwrap().unwrap();
    assert_eq!(response.added, vec!["sre", "finance"]);
    assert_eq!(response.removed, vec!["ops"]);
    assert!(users.editing().is_none());
    assert_eq!(
        users.notifications().latest().unwrap().message,
        "Groups updated: 2 added, 1 removed"
    );

    users.start_edit_groups("ada");
    let response = users.save_groups().await.unwrap().unwrap();
    assert!(response.added.is_empty() && response.removed.is_empty());
    let toast = users.notifications().latest().unwrap();
    assert_eq!(toast.kind, NotificationKind::Info);
    assert_eq!(toast.message, "No changes made");
}

#[tokio::test]
async fn test_save_without_edit_is_noop() {
    let api = shared_api();
    let mut users = UsersController::new(api.clone());
    assert_eq!(users.save_groups().await.unwrap(), None);
    assert_eq!(api.request_count(), 0);
}

#[tokio::test]
async fn test_search_and_service_accounts() {
    let api = api_with_groups(&["ci"]).await;
    api.create_m2m_account(CreateM2mPayload {
        name: "pipeline".to_string(),
        description: None,
        groups: Some(vec!["ci".to_string()]),
    })
    .await
    .unwrap();
    let mut users = UsersController::new(api.clone());
    fill_form(&mut users, "ada");
    users.create().await.unwrap();

    assert_eq!(users.users().items().len(), 2);
    users.set_search("LOVELACE");
    let found: Vec<&str> = users
        .filtered_users()
        .iter()
        .map(|u| u.username.as_str())
        .collect();
    assert_eq!(found, vec!["ada"]);

    let limited = api
        .list_users(UserQuery {
            search: Some("service-account".to_string()),
            ..UserQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert!(limited[0].is_service_account());
}

#[tokio::test]
async fn test_delete_user() {
    let api = shared_api();
    let mut users = UsersController::new(api.clone());
    fill_form(&mut users, "ada");
    users.create().await.unwrap();

    users.request_delete("ada");
    users.confirm_delete().await.unwrap();
    assert!(users.users().items().is_empty());
    assert_eq!(
        users.notifications().latest().unwrap().message,
        "User \"ada\" deleted"
    );

    users.request_delete("ada");
    assert!(users.confirm_delete().await.is_err());
    assert_eq!(
        users.notifications().latest().unwrap().message,
        "User 'ada' not found"
    );
}

#[tokio::test]
async fn test_created_users_cannot_open_settings() {
    let api = shared_api();
    let mut users = UsersController::new(api);
    fill_form(&mut users, "ada");
    let created = users.create().await.unwrap();

    let session = SessionUser::from(&created);
    assert!(!can_access_settings(Some(&session)));

    let admin = SessionUser {
        is_admin: Some(true),
        ..session
    };
    assert!(can_access_settings(Some(&admin)));
    assert!(!can_access_settings(None));
}
