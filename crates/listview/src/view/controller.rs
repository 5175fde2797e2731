//! The per-list controller.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use listview_core::logging::targets;

use super::config::ListViewConfig;
use crate::error::Result;
use crate::model::{
    CollectionMutator, Evaluator, ExpressionParser, ParsedExpression, Registration, Scope,
    SelectionController, SelectionMode, Value,
};

/// Controller for one list binding.
///
/// Parses the binding once at construction and composes the selection state
/// with the collection mutator. `T` is the selection target type, typically
/// an item [`Scope`] or a host element handle.
///
/// # Example
///
/// ```
/// use listview::prelude::*;
/// use serde_json::json;
///
/// let config = ListViewConfig::new("item in items").with_select_mode(SelectionMode::Single);
/// let view: ListView<Scope> = ListView::new(config).unwrap();
///
/// let root = Scope::from_json(json!({"items": ["a", "b"]}));
/// let item = root.child();
/// item.set("item", "a");
///
/// let _registration = view.register(item.clone());
/// assert!(view.select(&item));
///
/// assert_eq!(view.remove(&item).unwrap(), Some(Value::from("a")));
/// ```
pub struct ListView<T> {
    config: ListViewConfig,
    selection: SelectionController<T>,
    mutator: Arc<CollectionMutator>,
}

impl<T> ListView<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// Creates a list view resolving expressions through the default path
    /// evaluator.
    ///
    /// # Errors
    ///
    /// Fails if `config.list` is not a valid list-binding expression.
    pub fn new(config: ListViewConfig) -> Result<Self> {
        Self::from_parser(config, &ExpressionParser::default())
    }

    /// Creates a list view resolving expressions through `evaluator`.
    ///
    /// # Errors
    ///
    /// Fails if `config.list` is not a valid list-binding expression.
    pub fn with_evaluator(config: ListViewConfig, evaluator: Arc<dyn Evaluator>) -> Result<Self> {
        Self::from_parser(config, &ExpressionParser::with_evaluator(evaluator))
    }

    fn from_parser(config: ListViewConfig, parser: &ExpressionParser) -> Result<Self> {
        let expression = parser.parse(&config.list)?;
        tracing::debug!(
            target: targets::LISTVIEW,
            expression = %expression,
            mode = %config.select_mode,
            "created list view"
        );
        Ok(Self {
            selection: SelectionController::new(config.select_mode),
            mutator: Arc::new(CollectionMutator::new(Arc::new(expression))),
            config,
        })
    }

    /// The configuration this view was built from.
    pub fn config(&self) -> &ListViewConfig {
        &self.config
    }

    /// The parsed list binding.
    pub fn expression(&self) -> &ParsedExpression {
        self.mutator.expression()
    }

    /// The selection state shared by every item of this list.
    pub fn selection(&self) -> &SelectionController<T> {
        &self.selection
    }

    /// The collection mutator.
    pub fn mutator(&self) -> &Arc<CollectionMutator> {
        &self.mutator
    }

    /// Whether items of this list get select handling at all.
    pub fn selection_enabled(&self) -> bool {
        self.selection.selection_mode() != SelectionMode::None
    }

    /// Registers a selectable target. See [`SelectionController::register`].
    pub fn register(&self, target: T) -> Registration<T> {
        self.selection.register(target)
    }

    /// Selects a target. See [`SelectionController::select`].
    pub fn select(&self, target: &T) -> bool {
        self.selection.select(target)
    }

    /// Deselects a target. See [`SelectionController::deselect`].
    pub fn deselect(&self, target: &T) -> bool {
        self.selection.deselect(target)
    }

    /// Flips edit mode, returning the new value.
    pub fn toggle_edit_mode(&self) -> bool {
        self.selection.toggle_edit_mode()
    }

    /// Adds an item to the bound collection. See [`CollectionMutator::add`].
    pub fn add(&self, item: Value, key: Option<&Value>, scope: &Scope) -> Result<()> {
        self.mutator.add(item, key, scope)
    }

    /// Removes the current item of an item scope. See
    /// [`CollectionMutator::remove`].
    pub fn remove(&self, scope: &Scope) -> Result<Option<Value>> {
        self.mutator.remove(scope)
    }

    /// Returns a handler removing the current item of `scope`.
    pub fn remover(&self, scope: Scope) -> impl Fn() -> Result<Option<Value>> + Send + Sync + use<T> {
        self.mutator.remover(scope)
    }
}

impl<T> fmt::Debug for ListView<T>
where
    T: Clone + Eq + Hash + Send + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("config", &self.config)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListViewError;
    use serde_json::json;

    #[test]
    fn test_construction_parses_binding() {
        let view: ListView<u32> = ListView::new(ListViewConfig::new("(k, v) in vm.map")).unwrap();
        assert_eq!(view.expression().key_identifier(), Some("k"));
        assert!(!view.selection_enabled());

        let err = ListView::<u32>::new(ListViewConfig::new("nonsense")).unwrap_err();
        assert_eq!(err, ListViewError::invalid_expression("nonsense"));
    }

    #[test]
    fn test_mode_from_config() {
        let view: ListView<u32> = ListView::new(
            ListViewConfig::new("x in xs").with_select_mode(SelectionMode::Multi),
        )
        .unwrap();
        assert!(view.selection_enabled());

        let _a = view.register(1);
        let _b = view.register(2);
        assert!(view.select(&1));
        assert!(view.select(&2));
        assert_eq!(view.selection().selected(), vec![1, 2]);
        assert!(view.deselect(&1));
        assert!(view.toggle_edit_mode());
    }

    #[test]
    fn test_custom_evaluator() {
        let root = Scope::from_json(json!({"data": {"rows": [1, 2, 3]}}));
        let evaluator: Arc<dyn Evaluator> = Arc::new(|expression: &str, scope: &Scope| {
            match expression {
                "rows" => scope.get("data").member("rows"),
                other => scope.get(other),
            }
        });
        let view: ListView<Scope> =
            ListView::with_evaluator(ListViewConfig::new("row in rows"), evaluator).unwrap();

        view.add(Value::from(4), None, &root).unwrap();
        assert_eq!(root.get("data").member("rows"), Value::from(json!([1, 2, 3, 4])));

        let item = root.child();
        item.set("row", 2);
        let remove = view.remover(item);
        assert_eq!(remove().unwrap(), Some(Value::from(2)));
        assert_eq!(root.get("data").member("rows"), Value::from(json!([1, 3, 4])));
    }
}
