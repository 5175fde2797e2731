//! Core systems for listview.
//!
//! This crate provides the plumbing shared by the listview components:
//!
//! - **Signal/Slot System**: Type-safe one-way notifications
//! - **Logging**: `tracing` target and span names for filtering
//!
//! # Signal/Slot Example
//!
//! ```
//! use listview_core::Signal;
//!
//! let edit_mode_changed = Signal::<bool>::new();
//!
//! let conn_id = edit_mode_changed.connect(|on| {
//!     println!("edit mode: {}", on);
//! });
//!
//! edit_mode_changed.emit(true);
//! edit_mode_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use signal::{ConnectionId, Signal};
