//! The list view: configuration, the per-list controller and the event glue
//! between host UI events and the model.
//!
//! - `ListViewConfig`: Binding expression, selection mode and trigger events
//! - `ListView`: Parses the binding once and composes selection and mutation
//! - `ItemInteraction` / `EditModeInteraction` / `ItemEditInteraction`:
//!   Permission-gated, debounced trigger handling

mod config;
mod controller;
mod interaction;

pub use config::{CLICK_EVENT, DEFAULT_DEBOUNCE_MS, ListViewConfig};
pub use controller::ListView;
pub use interaction::{
    ClickDebouncer, EditModeInteraction, ItemEditAction, ItemEditInteraction, ItemInteraction,
    Outcome, Permission, PermissionGate,
};
