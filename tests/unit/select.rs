//! Searchable select behaviour as the scope form uses it.

use crate::common::builders::{catalog_agent, catalog_server};
use iam_console::catalog::{
    agent_options, all_servers_option, normalize_agents, normalize_servers, server_options,
};
use iam_console::select::{
    MAX_VISIBLE_OPTIONS, SearchableSelect, SelectEvent, SelectOption, truncate_words,
};
use proptest::prelude::*;

fn server_picker() -> SearchableSelect {
    let servers = normalize_servers(vec![
        catalog_server("/weather", "Weather"),
        catalog_server("/currenttime", "Current Time"),
        catalog_server("/fininfo", "Financial Info"),
    ]);
    SearchableSelect::new(server_options(&servers))
        .with_special_options(vec![all_servers_option()])
        .allow_custom(true)
}

#[test]
fn test_search_matches_path_and_name() {
    let mut picker = server_picker();
    picker.handle(SelectEvent::Input("TIME".to_string()));
    let values: Vec<&str> = picker
        .filtered_options()
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(values, vec!["/currenttime"]);

    picker.handle(SelectEvent::Input("/fin".to_string()));
    assert_eq!(picker.filtered_options().len(), 1);
}

#[test]
fn test_wildcard_stays_available() {
    let mut picker = server_picker();
    picker.handle(SelectEvent::Input("zzz".to_string()));
    assert_eq!(picker.empty_text(), Some("No matches found"));
    assert_eq!(picker.special_options()[0].value, "*");

    assert_eq!(
        picker.handle(SelectEvent::Select("*".to_string())).as_deref(),
        Some("*")
    );
    assert!(!picker.is_open());
    assert_eq!(picker.display_text(), "* (All servers)");
}

#[test]
fn test_custom_server_path() {
    let mut picker = server_picker();
    picker.handle(SelectEvent::Focus);
    picker.handle(SelectEvent::Input("  /internal ".to_string()));
    assert_eq!(
        picker.handle(SelectEvent::Enter).as_deref(),
        Some("/internal")
    );
    assert_eq!(picker.value(), "/internal");
    assert_eq!(picker.display_text(), "/internal");
}

#[test]
fn test_selected_agents_are_not_offered_again() {
    let agents = normalize_agents(vec![catalog_agent("travel"), catalog_agent("billing")]);
    let options = agent_options(&agents, &["travel".to_string()]);
    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    assert!(!values.contains(&"travel"));
    assert!(values.contains(&"billing"));
}

#[test]
fn test_large_catalog_is_truncated() {
    let options = (0..MAX_VISIBLE_OPTIONS + 10)
        .map(|i| SelectOption::new(format!("/srv-{i}"), format!("Server {i}")))
        .collect();
    let mut picker = SearchableSelect::new(options);
    picker.handle(SelectEvent::Focus);

    assert_eq!(picker.filtered_options().len(), MAX_VISIBLE_OPTIONS);
    assert!(picker.is_truncated());

    picker.handle(SelectEvent::Input("srv-5".to_string()));
    assert!(!picker.is_truncated());
}

#[test]
fn test_descriptions_are_shortened() {
    let picker = SearchableSelect::new(Vec::new()).with_max_description_words(3);
    let option = SelectOption::new("/weather", "Weather")
        .with_description("Forecasts and alerts for any city worldwide");
    assert_eq!(
        picker.option_description(&option).as_deref(),
        Some("Forecasts and alerts...")
    );
}

proptest! {
    #[test]
    fn prop_truncate_words_keeps_prefix(
        words in prop::collection::vec("[a-z]{1,6}", 0..20),
        max in 1usize..10,
    ) {
        let text = words.join(" ");
        let shortened = truncate_words(&text, max);
        if words.len() <= max {
            prop_assert_eq!(shortened, text);
        } else {
            prop_assert!(shortened.ends_with("..."));
            let kept = shortened.trim_end_matches("...");
            prop_assert_eq!(kept.split_whitespace().count(), max);
            prop_assert!(text.starts_with(kept));
        }
    }
}
