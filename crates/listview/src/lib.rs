//! listview - list bindings with selection and edit support.
//!
//! Binds a list view to a collection through an `item in collection`
//! expression, arbitrates item selection across the list (`none`, `single`,
//! `active` and `multi` modes), toggles an edit mode, and adds and removes
//! items of the bound collection.
//!
//! # Example
//!
//! ```
//! use listview::prelude::*;
//! use serde_json::json;
//!
//! let config = ListViewConfig::new("(id, user) in vm.users")
//!     .with_select_mode(SelectionMode::Multi);
//! let view: ListView<Scope> = ListView::new(config)?;
//!
//! let root = Scope::from_json(json!({"vm": {"users": {"u1": "Ann", "u2": "Bob"}}}));
//! let ann = root.child();
//! ann.set("id", "u1");
//! ann.set("user", "Ann");
//!
//! let _registration = view.register(ann.clone());
//! view.select(&ann);
//! assert!(view.selection().is_selected(&ann));
//!
//! view.remove(&ann)?;
//! assert_eq!(root.get("vm").member("users"), Value::from(json!({"u2": "Bob"})));
//! # Ok::<(), listview::ListViewError>(())
//! ```

pub use listview_core::*;

pub mod error;
pub mod model;
pub mod prelude;
pub mod view;

pub use error::{ListViewError, Result};
