//! Searchable select with type-ahead filtering.
//!
//! A text input whose dropdown narrows as the user types. "Special" options
//! (such as `*` for all servers) always stay on top and are never filtered.
//!
//! # Example Usage
//!
//! ```rust
//! use iam_console::select::{SearchableSelect, SelectEvent, SelectOption};
//!
//! let mut select = SearchableSelect::new(vec![
//!     SelectOption::new("/weather", "weather"),
//!     SelectOption::new("/currenttime", "currenttime"),
//! ])
//! .with_special_options(vec![SelectOption::new("*", "All servers")]);
//!
//! select.handle(SelectEvent::Input("time".into()));
//! assert_eq!(select.filtered_options().len(), 1);
//!
//! let changed = select.handle(SelectEvent::Select("/currenttime".into()));
//! assert_eq!(changed.as_deref(), Some("/currenttime"));
//! assert_eq!(select.display_text(), "currenttime");
//! ```

use serde::{Deserialize, Serialize};

/// Most options rendered in the dropdown at once.
pub const MAX_VISIBLE_OPTIONS: usize = 50;

/// Default word limit for option descriptions.
pub const DEFAULT_DESCRIPTION_WORDS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn matches(&self, query: &str) -> bool {
        self.label.to_lowercase().contains(query)
            || self.value.to_lowercase().contains(query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(query))
    }
}

/// Input events the select reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    Focus,
    /// The input text changed.
    Input(String),
    Escape,
    Enter,
    /// An option was clicked.
    Select(String),
    /// The clear button was pressed.
    Clear,
    /// A click landed outside the component.
    Blur,
}

/// State of one searchable select.
#[derive(Debug, Clone)]
pub struct SearchableSelect {
    options: Vec<SelectOption>,
    special_options: Vec<SelectOption>,
    value: String,
    query: String,
    is_open: bool,
    allow_custom: bool,
    disabled: bool,
    max_description_words: usize,
}

impl SearchableSelect {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            special_options: Vec::new(),
            value: String::new(),
            query: String::new(),
            is_open: false,
            allow_custom: false,
            disabled: false,
            max_description_words: DEFAULT_DESCRIPTION_WORDS,
        }
    }

    pub fn with_special_options(mut self, special: Vec<SelectOption>) -> Self {
        self.special_options = special;
        self
    }

    /// Accept free-text values not present in the options (committed with Enter).
    pub fn allow_custom(mut self, allow: bool) -> Self {
        self.allow_custom = allow;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_max_description_words(mut self, words: usize) -> Self {
        self.max_description_words = words;
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the dropdown is shown.
    pub fn is_open(&self) -> bool {
        self.is_open && !self.disabled
    }

    pub fn special_options(&self) -> &[SelectOption] {
        &self.special_options
    }

    /// Apply an event. Returns the new value when the selection changed.
    pub fn handle(&mut self, event: SelectEvent) -> Option<String> {
        if self.disabled {
            return None;
        }
        match event {
            SelectEvent::Focus => {
                self.is_open = true;
                None
            }
            SelectEvent::Input(text) => {
                self.query = text;
                self.is_open = true;
                None
            }
            SelectEvent::Escape | SelectEvent::Blur => {
                self.close();
                None
            }
            SelectEvent::Enter => {
                let custom = self.query.trim();
                if self.allow_custom && !custom.is_empty() {
                    let custom = custom.to_string();
                    Some(self.select(custom))
                } else {
                    None
                }
            }
            SelectEvent::Select(value) => Some(self.select(value)),
            SelectEvent::Clear => {
                self.value.clear();
                self.query.clear();
                Some(String::new())
            }
        }
    }

    fn select(&mut self, value: String) -> String {
        self.value = value.clone();
        self.close();
        value
    }

    fn close(&mut self) {
        self.is_open = false;
        self.query.clear();
    }

    /// Every regular option matching the query, case-insensitively.
    pub fn matching_options(&self) -> Vec<&SelectOption> {
        let query = self.query.to_lowercase();
        self.options.iter().filter(|o| o.matches(&query)).collect()
    }

    /// The matching options that fit in the dropdown.
    pub fn filtered_options(&self) -> Vec<&SelectOption> {
        let mut matching = self.matching_options();
        matching.truncate(MAX_VISIBLE_OPTIONS);
        matching
    }

    /// Whether matches were cut off at [`MAX_VISIBLE_OPTIONS`].
    pub fn is_truncated(&self) -> bool {
        self.matching_options().len() > MAX_VISIBLE_OPTIONS
    }

    /// Text in the input box.
    pub fn display_text(&self) -> &str {
        if self.is_open() {
            return &self.query;
        }
        self.special_options
            .iter()
            .chain(&self.options)
            .find(|o| o.value == self.value)
            .map(|o| o.label.as_str())
            .filter(|label| !label.is_empty())
            .unwrap_or(self.value.as_str())
    }

    /// Text shown when no regular option matches.
    pub fn empty_text(&self) -> Option<&'static str> {
        if !self.matching_options().is_empty() {
            return None;
        }
        Some(if self.query.is_empty() {
            "No options available"
        } else {
            "No matches found"
        })
    }

    /// An option's description, shortened for the dropdown.
    pub fn option_description(&self, option: &SelectOption) -> Option<String> {
        option
            .description
            .as_deref()
            .map(|d| truncate_words(d, self.max_description_words))
    }
}

/// Keep at most `max_words` whitespace-separated words, marking cuts with `...`.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    format!("{}...", words[..max_words].join(" "))
}
