//! Property-based tests for the scope codec.
//!
//! Uses proptest to generate form states and checks the encoding rules that
//! must hold for every input, with automatic shrinking on failure.

use iam_console::scope::{
    self, COMMON_METHODS, PermissionGrant, ScopeForm, ServerAccessEntry, ToolGrant,
    UiPermissionKey,
};
use proptest::prelude::*;

fn method_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(COMMON_METHODS.to_vec(), 0..=4)
        .prop_map(|methods| methods.into_iter().map(str::to_string).collect())
}

fn tools_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z_]{0,11}", 0..4)
}

prop_compose! {
    fn server_entry_strategy()
        (server in "[a-z][a-z0-9-]{0,10}",
         methods in method_strategy(),
         tools in tools_strategy())
        -> ServerAccessEntry {
        ServerAccessEntry { server, methods, tools }
    }
}

prop_compose! {
    fn comma_text_strategy()
        (items in prop::collection::vec("[a-z]{1,8}", 0..4),
         pad in prop::sample::select(vec!["", " ", "  "]))
        -> String {
        items
            .iter()
            .map(|item| format!("{pad}{item}{pad}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

prop_compose! {
    fn form_strategy()
        (name in "[a-z][a-z0-9-]{0,15}",
         description in prop::option::of("[A-Za-z ]{1,30}"),
         entries in prop::collection::vec(server_entry_strategy(), 1..4),
         group_mappings in comma_text_strategy(),
         agents in prop::collection::btree_set("[a-z]{1,8}", 0..3),
         list_service in comma_text_strategy(),
         list_agents in comma_text_strategy(),
         create_in_idp in any::<bool>())
        -> ScopeForm {
        let mut form = ScopeForm::new();
        form.name = name;
        form.description = description.unwrap_or_default();
        form.server_access = entries;
        form.group_mappings = group_mappings;
        form.selected_agents = agents.into_iter().collect();
        form.set_ui_permission(UiPermissionKey::ListService.as_str(), list_service);
        form.set_ui_permission(UiPermissionKey::ListAgents.as_str(), list_agents);
        form.create_in_idp = create_in_idp;
        form
    }
}

proptest! {
    /// Rows without a server never reach the document.
    #[test]
    fn prop_blank_servers_are_dropped(blanks in prop::collection::vec("[ \t]{0,3}", 1..5)) {
        let mut form = ScopeForm::new();
        form.name = "ops".to_string();
        form.server_access = blanks
            .into_iter()
            .map(|server| ServerAccessEntry { server, ..ServerAccessEntry::default() })
            .collect();

        let value = scope::encode(&form).to_value().unwrap();
        prop_assert!(value.get("server_access").is_none());
        prop_assert_eq!(&value["scope_name"], "ops");
        prop_assert!(value.get("create_in_idp").is_some());
    }

    /// A rule always names at least one method.
    #[test]
    fn prop_methods_default_to_all(form in form_strategy()) {
        let encoded = scope::encode(&form);
        for (rule, entry) in encoded.server_access.iter().zip(&form.server_access) {
            if entry.methods.is_empty() {
                prop_assert_eq!(&rule.methods, &vec!["all".to_string()]);
            } else {
                prop_assert_eq!(&rule.methods, &entry.methods);
            }
        }
    }

    /// Any wildcard among the tools grants every tool.
    #[test]
    fn prop_wildcard_tool_grants_all(
        mut entry in server_entry_strategy(),
        position in 0usize..4,
    ) {
        let at = position.min(entry.tools.len());
        entry.tools.insert(at, "*".to_string());
        let mut form = ScopeForm::new();
        form.name = "ops".to_string();
        form.server_access = vec![entry];

        let encoded = scope::encode(&form);
        prop_assert_eq!(encoded.server_access[0].tools.as_ref(), Some(&ToolGrant::All));
        let value = encoded.to_value().unwrap();
        prop_assert_eq!(&value["server_access"][0]["tools"], "*");
    }

    /// Permission lists are the trimmed, non-empty comma tokens in order.
    #[test]
    fn prop_ui_permission_tokens(text in comma_text_strategy()) {
        let mut form = ScopeForm::new();
        form.name = "ops".to_string();
        form.set_ui_permission("list_service", text.clone());

        let expected: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let encoded = scope::encode(&form);
        if expected.is_empty() {
            prop_assert!(encoded.ui_permissions.is_empty());
        } else {
            prop_assert_eq!(
                encoded.ui_permissions.get("list_service"),
                Some(&PermissionGrant::Named(expected))
            );
        }
    }

    /// Importing an exported document into a blank form reproduces the export.
    #[test]
    fn prop_export_import_export_is_stable(form in form_strategy()) {
        let exported = scope::encode(&form);
        let text = exported.to_pretty_json().unwrap();

        let mut imported = ScopeForm::new();
        imported.apply(scope::decode(&text).unwrap());

        prop_assert_eq!(scope::encode(&imported), exported);
    }

    /// Decoding never panics and rejects only non-objects.
    #[test]
    fn prop_decode_is_total(text in ".{0,64}") {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            prop_assert_eq!(scope::decode(&text).is_ok(), value.is_object());
        } else {
            prop_assert!(scope::decode(&text).is_err());
        }
    }
}
