//! Common test utilities for the console test suite.

use iam_console::api::{CreateGroupPayload, InMemoryManagementApi, ManagementApi};
use std::sync::Arc;

pub mod builders;
pub mod fixtures;

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh in-memory API shared the way controllers share it.
pub fn shared_api() -> Arc<InMemoryManagementApi> {
    init_logging();
    Arc::new(InMemoryManagementApi::new())
}

/// A fresh API already holding the named groups.
pub async fn api_with_groups(names: &[&str]) -> Arc<InMemoryManagementApi> {
    let api = shared_api();
    for name in names {
        api.create_group(CreateGroupPayload {
            name: name.to_string(),
            description: None,
            scope_config: None,
        })
        .await
        .expect("seed group");
    }
    api
}

/// Assert that a result failed with a validation error on `field`.
#[macro_export]
macro_rules! assert_field_error {
    ($result:expr, $field:expr) => {
        match $result {
            Err(iam_console::ConsoleError::Validation(e)) => {
                assert!(
                    e.fields().get($field).is_some(),
                    "expected an error on '{}', got: {}",
                    $field,
                    e
                );
            }
            other => panic!("expected validation error on '{}', got {:?}", $field, other),
        }
    };
}
