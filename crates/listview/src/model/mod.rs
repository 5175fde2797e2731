//! Data model for list bindings.
//!
//! This module provides the types a list view is built on:
//!
//! - Parsing the list-binding expression (`item in collection`)
//! - Resolving its fragments against a [`Scope`]
//! - Tracking which items are selected and whether the list is in edit mode
//! - Adding items to and removing items from the bound collection
//!
//! # Core Types
//!
//! - `Value`: Loosely-typed runtime value; lists and maps are shared handles
//! - `Scope`: Prototype-chained name to value mapping
//! - `Evaluator`: Resolves an expression string against a scope
//! - `ExpressionParser` / `ParsedExpression`: The parsed list binding
//! - `SelectionController`: Selection and edit-mode state for one list
//! - `CollectionMutator`: Add/remove on the bound collection
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use listview::model::{CollectionMutator, ExpressionParser, Scope, Value};
//! use serde_json::json;
//!
//! let parsed = ExpressionParser::default().parse("item in vm.items").unwrap();
//! let mutator = CollectionMutator::new(Arc::new(parsed));
//!
//! let scope = Scope::from_json(json!({"vm": {"items": ["a"]}}));
//! mutator.add(Value::from("b"), None, &scope).unwrap();
//!
//! mutator.removed().connect(|(item, _collection)| {
//!     println!("Removed {item}");
//! });
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────┐  parse   ┌──────────────────┐
//! │ ExpressionParser │─────────>│ ParsedExpression │
//! └──────────────────┘          └──────────────────┘
//!                                        │ resolves against
//!                                        v
//! ┌──────────────────┐  mutates ┌──────────────────┐
//! │CollectionMutator │─────────>│ Scope / Value    │
//! └──────────────────┘          └──────────────────┘
//!
//! ┌──────────────────┐
//! │SelectionCtrl<T>  │  targets: any Clone + Eq + Hash identity
//! └──────────────────┘
//! ```

mod mutator;
mod parser;
mod scope;
pub mod selection;
mod value;

pub use mutator::CollectionMutator;
pub use parser::{ExpressionParser, INDEX_IDENTIFIER, ParsedExpression};
pub use scope::{Evaluator, PathEvaluator, Scope};
pub use selection::{Registration, SelectionController, SelectionMode};
pub use value::{ListRef, MapRef, Value};
