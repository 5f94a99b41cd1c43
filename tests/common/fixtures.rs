//! Scope documents used across tests.

use serde_json::{Value, json};

/// The example scope offered for download.
pub fn currenttime_users() -> Value {
    json!({
        "scope_name": "currenttime-users",
        "description": "Users with access to currenttime server",
        "server_access": [
            {
                "server": "currenttime",
                "methods": ["initialize", "tools/list", "tools/call"],
                "tools": ["current_time_by_timezone"]
            }
        ],
        "group_mappings": ["currenttime-users"],
        "ui_permissions": {
            "list_service": ["currenttime"],
            "health_check_service": ["currenttime"]
        },
        "create_in_idp": true
    })
}

/// A document mixing usable and malformed members.
pub fn partially_malformed() -> Value {
    json!({
        "scope_name": "",
        "description": 42,
        "create_in_idp": false,
        "group_mappings": ["ops", 7, null, "sre"],
        "server_access": [
            {"server": "", "methods": ["GET"]},
            {"methods": ["POST"]},
            {"server": "weather", "methods": "all", "tools": "*"}
        ],
        "agent_access": "not-a-list",
        "ui_permissions": {"list_service": ["weather", "currenttime"], "list_agents": "travel"}
    })
}
