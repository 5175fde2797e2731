//! Logging facilities for listview.
//!
//! listview uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("listview=debug")
//!         .init();
//! }
//! ```
//!
//! Routine state transitions (select, deselect, emit) are logged at `trace`.
//! Rejected input and ignored calls (parse failures, stale selections,
//! suppressed triggers) are logged at `debug`.

/// Span names used throughout listview for tracing.
pub mod span_names {
    /// Permission-gated interaction span.
    pub const INTERACTION: &str = "listview::interaction";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Library target.
    pub const LISTVIEW: &str = "listview";
    /// Expression parser target.
    pub const PARSER: &str = "listview::parser";
    /// Selection controller target.
    pub const SELECTION: &str = "listview::selection";
    /// Collection mutator target.
    pub const MUTATOR: &str = "listview::mutator";
    /// Interaction glue target (debounce, permission gates).
    pub const INTERACTION: &str = "listview::interaction";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "listview_core::signal";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::PARSER,
            targets::SELECTION,
            targets::MUTATOR,
            targets::INTERACTION,
        ] {
            assert!(target.starts_with(targets::LISTVIEW));
        }
        assert!(span_names::INTERACTION.starts_with(targets::LISTVIEW));
    }
}
