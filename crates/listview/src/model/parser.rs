//! Parser for list-binding expressions.
//!
//! A list binding names the collection to render and the identifiers each
//! item is exposed under:
//!
//! ```text
//! item in collection
//! (key, value) in collection
//! item in collection track by item.id
//! ```
//!
//! [`ExpressionParser::parse`] turns such a string into a [`ParsedExpression`],
//! which keeps the parsed fragments as data and resolves them against a
//! [`Scope`] through the parser's [`Evaluator`].
//!
//! # Example
//!
//! ```
//! use listview::model::{ExpressionParser, Scope};
//! use serde_json::json;
//!
//! let parser = ExpressionParser::default();
//! let parsed = parser.parse("(id, user) in vm.users").unwrap();
//!
//! assert_eq!(parsed.collection_expression(), "vm.users");
//! assert_eq!(parsed.key_identifier(), Some("id"));
//!
//! let scope = Scope::from_json(json!({"vm": {"users": {"u1": "Ann"}}}));
//! assert_eq!(parsed.collection(&scope).type_name(), "map");
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use listview_core::logging::targets;
use regex::Regex;

use super::scope::{Evaluator, PathEvaluator, Scope};
use super::value::Value;
use crate::error::{ListViewError, Result};

/// `lhs in collection`, with an optional trailing `track by` clause.
static LIST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\s\S]+?)\s+in\s+([\s\S]+?)(?:\s+track\s+by\s+([\s\S]+?))?\s*$")
        .expect("list pattern is valid")
});

/// `item` or `(key, value)`. Identifiers are ASCII word characters and `$`.
static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([$0-9A-Za-z_]+)|\(([$0-9A-Za-z_]+)\s*,\s*([$0-9A-Za-z_]+)\))$")
        .expect("item pattern is valid")
});

/// The positional index variable a repeat mechanism defines on each item
/// scope. Bare-identifier bindings resolve their key through it.
pub const INDEX_IDENTIFIER: &str = "$index";

/// A parsed list-binding expression.
///
/// Immutable once parsed; share it (it is cheap to clone) for the lifetime of
/// the binding.
#[derive(Clone)]
pub struct ParsedExpression {
    source: String,
    collection: String,
    item: String,
    key: Option<String>,
    track_by: Option<String>,
    evaluator: Arc<dyn Evaluator>,
}

impl ParsedExpression {
    /// The expression string this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The collection fragment, e.g. `vm.items`.
    pub fn collection_expression(&self) -> &str {
        &self.collection
    }

    /// The identifier each item is exposed under.
    pub fn item_identifier(&self) -> &str {
        &self.item
    }

    /// The explicit key identifier of a `(key, value)` binding.
    pub fn key_identifier(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The `track by` fragment, accepted but not interpreted.
    pub fn track_by(&self) -> Option<&str> {
        self.track_by.as_deref()
    }

    /// Resolves the bound collection.
    pub fn collection(&self, scope: &Scope) -> Value {
        self.evaluator.evaluate(&self.collection, scope)
    }

    /// Resolves the current item from an item scope.
    pub fn item(&self, scope: &Scope) -> Value {
        self.evaluator.evaluate(&self.item, scope)
    }

    /// Resolves the current key from an item scope.
    ///
    /// Uses the explicit key identifier when there is one and the positional
    /// index otherwise. Returns `None` when nothing resolves.
    pub fn key(&self, scope: &Scope) -> Option<Value> {
        let key = self.key.as_deref().unwrap_or(INDEX_IDENTIFIER);
        Some(self.evaluator.evaluate(key, scope)).filter(|value| !value.is_null())
    }
}

impl PartialEq for ParsedExpression {
    fn eq(&self, other: &Self) -> bool {
        self.collection == other.collection
            && self.item == other.item
            && self.key == other.key
            && self.track_by == other.track_by
    }
}

impl fmt::Debug for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedExpression")
            .field("collection", &self.collection)
            .field("item", &self.item)
            .field("key", &self.key)
            .field("track_by", &self.track_by)
            .finish()
    }
}

impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "({key}, {}) in {}", self.item, self.collection)?,
            None => write!(f, "{} in {}", self.item, self.collection)?,
        }
        if let Some(track_by) = &self.track_by {
            write!(f, " track by {track_by}")?;
        }
        Ok(())
    }
}

/// Parses list-binding expressions into [`ParsedExpression`]s.
#[derive(Clone)]
pub struct ExpressionParser {
    evaluator: Arc<dyn Evaluator>,
}

impl Default for ExpressionParser {
    fn default() -> Self {
        Self::new(PathEvaluator::new())
    }
}

impl fmt::Debug for ExpressionParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionParser").finish_non_exhaustive()
    }
}

impl ExpressionParser {
    /// Creates a parser whose accessors resolve through `evaluator`.
    pub fn new(evaluator: impl Evaluator + 'static) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }

    /// Creates a parser sharing an existing evaluator.
    pub fn with_evaluator(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Parses `expression`.
    ///
    /// # Errors
    ///
    /// - [`ListViewError::InvalidExpression`] if it is not of the form
    ///   `_lhs_ in _collection_ (track by _id_)?`.
    /// - [`ListViewError::InvalidItemIdentifier`] if the left-hand side is
    ///   neither an identifier nor a `(key, value)` pair.
    #[tracing::instrument(skip(self), target = "listview::parser", level = "trace")]
    pub fn parse(&self, expression: &str) -> Result<ParsedExpression> {
        let Some(list) = LIST_PATTERN.captures(expression) else {
            tracing::debug!(target: targets::PARSER, expression, "invalid list expression");
            return Err(ListViewError::invalid_expression(expression));
        };

        let lhs = &list[1];
        let Some(lhs_match) = ITEM_PATTERN.captures(lhs) else {
            tracing::debug!(target: targets::PARSER, lhs, "invalid item identifier");
            return Err(ListViewError::invalid_item_identifier(lhs));
        };

        let (item, key) = match lhs_match.get(1) {
            Some(item) => (item.as_str(), None),
            None => (&lhs_match[3], Some(lhs_match[2].to_string())),
        };

        Ok(ParsedExpression {
            source: expression.to_string(),
            collection: list[2].to_string(),
            item: item.to_string(),
            key,
            track_by: list.get(3).map(|m| m.as_str().to_string()),
            evaluator: self.evaluator.clone(),
        })
    }
}
