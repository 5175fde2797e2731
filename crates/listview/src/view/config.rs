//! List-view configuration.
//!
//! A [`ListViewConfig`] carries everything a host reads from the list
//! element's attributes: the binding expression, the selection mode and the
//! trigger events. It can be built in code or loaded from JSON or TOML.
//!
//! # Example
//!
//! ```
//! use listview::model::SelectionMode;
//! use listview::view::ListViewConfig;
//!
//! let config = ListViewConfig::from_toml_str(
//!     r#"
//!     list = "item in vm.items"
//!     select_mode = "multi"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.select_mode, SelectionMode::Multi);
//! assert_eq!(config.select_on, "click");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ListViewError, Result};
use crate::model::SelectionMode;

/// Trigger event name that is debounced and used by default.
pub const CLICK_EVENT: &str = "click";

/// Default debounce window for click triggers, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Configuration for one list binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListViewConfig {
    /// The list-binding expression, e.g. `item in vm.items`.
    pub list: String,
    /// How many items may be selected at once.
    pub select_mode: SelectionMode,
    /// Event that toggles an item's selection.
    pub select_on: String,
    /// Event that toggles edit mode.
    pub edit_on: String,
    /// Window within which repeated click triggers are suppressed.
    pub debounce_ms: u64,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            list: String::new(),
            select_mode: SelectionMode::None,
            select_on: CLICK_EVENT.to_string(),
            edit_on: CLICK_EVENT.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl ListViewConfig {
    /// Creates a configuration for `list` with default settings.
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            ..Self::default()
        }
    }

    /// Sets the selection mode.
    pub fn with_select_mode(mut self, mode: SelectionMode) -> Self {
        self.select_mode = mode;
        self
    }

    /// Sets the event that toggles selection.
    pub fn with_select_on(mut self, event: impl Into<String>) -> Self {
        self.select_on = event.into();
        self
    }

    /// Sets the event that toggles edit mode.
    pub fn with_edit_on(mut self, event: impl Into<String>) -> Self {
        self.edit_on = event.into();
        self
    }

    /// Sets the click debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The click debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Loads a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ListViewError::config(e.to_string()))
    }

    /// Loads a configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| ListViewError::config(e.to_string()))
    }

    /// Serializes this configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ListViewError::config(e.to_string()))
    }
}
