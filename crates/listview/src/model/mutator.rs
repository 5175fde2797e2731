//! Adding items to and removing items from a bound collection.
//!
//! [`CollectionMutator`] resolves the collection of a [`ParsedExpression`]
//! against a scope and mutates it in place. The runtime shape of the resolved
//! collection decides how: a list is appended to and searched by identity, a
//! map is written and removed by key.

use std::sync::Arc;

use listview_core::logging::targets;
use listview_core::Signal;

use super::parser::ParsedExpression;
use super::scope::Scope;
use super::value::Value;
use crate::error::{ListViewError, Result};

/// Mutates the collection bound by a list expression.
///
/// # Signals
///
/// - `added`: (item, collection) after an item was added
/// - `removed`: (item, collection) after an item was removed
pub struct CollectionMutator {
    expression: Arc<ParsedExpression>,
    added: Signal<(Value, Value)>,
    removed: Signal<(Value, Value)>,
}

impl CollectionMutator {
    /// Creates a mutator for a parsed list expression.
    pub fn new(expression: Arc<ParsedExpression>) -> Self {
        Self {
            expression,
            added: Signal::new(),
            removed: Signal::new(),
        }
    }

    /// The list expression this mutator resolves collections through.
    pub fn expression(&self) -> &Arc<ParsedExpression> {
        &self.expression
    }

    /// Emitted after an item was added. Args: (item, collection)
    pub fn added(&self) -> &Signal<(Value, Value)> {
        &self.added
    }

    /// Emitted after an item was removed. Args: (item, collection)
    pub fn removed(&self) -> &Signal<(Value, Value)> {
        &self.removed
    }

    /// Adds `item` to the collection resolved from `scope`.
    ///
    /// A list gets `item` appended and `key` is ignored. A map gets
    /// `collection[key] = item`.
    ///
    /// # Errors
    ///
    /// - [`ListViewError::MissingKey`] if the collection is a map and `key`
    ///   is absent or not usable as a key.
    /// - [`ListViewError::UnsupportedCollection`] if the collection is neither
    ///   a list nor a map.
    pub fn add(&self, item: Value, key: Option<&Value>, scope: &Scope) -> Result<()> {
        let collection = self.expression.collection(scope);

        match &collection {
            Value::List(list) => list.write().push(item.clone()),
            Value::Map(map) => {
                let key = key
                    .and_then(Value::as_key)
                    .ok_or_else(|| ListViewError::missing_key(self.collection_expression()))?;
                map.write().insert(key, item.clone());
            }
            other => return Err(self.unsupported(other)),
        }

        tracing::trace!(target: targets::MUTATOR, collection = self.collection_expression(), "added item");
        self.added.emit((item, collection));
        Ok(())
    }

    /// Removes the current item of the item scope `scope` from its collection.
    ///
    /// A list loses the first element identical to the resolved item. A map
    /// loses the entry under the resolved key, which requires a
    /// `(key, value)` binding.
    ///
    /// Returns the removed item, or `None` if the collection did not contain
    /// it (nothing is mutated or emitted in that case).
    ///
    /// # Errors
    ///
    /// - [`ListViewError::MissingKey`] if the collection is a map and no key
    ///   resolves from `scope`.
    /// - [`ListViewError::UnsupportedCollection`] if the collection is neither
    ///   a list nor a map.
    pub fn remove(&self, scope: &Scope) -> Result<Option<Value>> {
        let collection = self.expression.collection(scope);

        let removed = match &collection {
            Value::List(list) => {
                let item = self.expression.item(scope);
                let mut items = list.write();
                items
                    .iter()
                    .position(|candidate| candidate.same(&item))
                    .map(|index| items.remove(index))
            }
            Value::Map(map) => {
                let key = self
                    .expression
                    .key_identifier()
                    .and_then(|_| self.expression.key(scope))
                    .and_then(|key| key.as_key())
                    .ok_or_else(|| ListViewError::missing_key(self.collection_expression()))?;
                map.write().shift_remove(&key)
            }
            other => return Err(self.unsupported(other)),
        };

        match &removed {
            Some(item) => {
                tracing::trace!(target: targets::MUTATOR, collection = self.collection_expression(), "removed item");
                self.removed.emit((item.clone(), collection));
            }
            None => {
                tracing::debug!(
                    target: targets::MUTATOR,
                    collection = self.collection_expression(),
                    "item to remove not found in collection"
                );
            }
        }
        Ok(removed)
    }

    /// Returns a handler that removes the current item of `scope` each time
    /// it is called.
    pub fn remover(
        self: &Arc<Self>,
        scope: Scope,
    ) -> impl Fn() -> Result<Option<Value>> + Send + Sync + use<> {
        let mutator = Arc::clone(self);
        move || mutator.remove(&scope)
    }

    fn collection_expression(&self) -> &str {
        self.expression.collection_expression()
    }

    fn unsupported(&self, found: &Value) -> ListViewError {
        tracing::debug!(
            target: targets::MUTATOR,
            collection = self.collection_expression(),
            found = found.type_name(),
            "collection is neither a list nor a map"
        );
        ListViewError::unsupported_collection(self.collection_expression(), found.type_name())
    }
}

impl std::fmt::Debug for CollectionMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionMutator")
            .field("expression", &self.expression.to_string())
            .finish_non_exhaustive()
    }
}
