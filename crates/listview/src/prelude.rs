//! Prelude module for listview.
//!
//! ```ignore
//! use listview::prelude::*;
//! ```
//!
//! This provides access to:
//! - Signal/slot system (`Signal`, `ConnectionId`)
//! - Values and scopes (`Value`, `Scope`, `Evaluator`)
//! - The list binding (`ExpressionParser`, `ParsedExpression`)
//! - Selection (`SelectionController`, `SelectionMode`, `Registration`)
//! - The list view and its event glue (`ListView`, `ListViewConfig`, `Outcome`, ...)

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    CollectionMutator, Evaluator, ExpressionParser, ParsedExpression, PathEvaluator,
    Registration, Scope, SelectionController, SelectionMode, Value,
};

// ============================================================================
// View
// ============================================================================

pub use crate::view::{
    EditModeInteraction, ItemEditAction, ItemEditInteraction, ItemInteraction, ListView,
    ListViewConfig, Outcome, Permission,
};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::ListViewError;
