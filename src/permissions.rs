//! Console access checks.

use crate::api::IamUser;
use serde::{Deserialize, Serialize};

/// The signed-in user as far as access checks are concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl From<&IamUser> for SessionUser {
    fn from(user: &IamUser) -> Self {
        Self {
            username: user.username.clone(),
            groups: user.groups.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Whether the settings area (groups, users, machine accounts) is reachable.
///
/// Only an explicit admin flag grants access; a missing flag denies it.
pub fn can_access_settings(user: Option<&SessionUser>) -> bool {
    user.is_some_and(|user| user.is_admin == Some(true))
}
