//! Error types for listview.

/// Result type alias for listview operations.
pub type Result<T> = std::result::Result<T, ListViewError>;

/// Errors raised by the expression parser, the collection mutator and the
/// configuration layer.
///
/// All errors are raised synchronously by the operation that detects them and
/// are never retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListViewError {
    /// The list binding is not of the form `_item_ in _collection_`.
    #[error(
        "Expected expression in form of '_item_ in _collection_ (track by _id_)?' but got '{expression}'."
    )]
    InvalidExpression { expression: String },

    /// The left-hand side is neither an identifier nor a `(key, value)` pair.
    #[error(
        "'_item_' in '_item_ in _collection_' should be an identifier or '(_key_, _value_)' expression, but got '{lhs}'."
    )]
    InvalidItemIdentifier { lhs: String },

    /// A mapping-shaped collection was mutated without a resolvable key.
    #[error("A key is required to modify the mapping bound to '{collection}', but none was resolved.")]
    MissingKey { collection: String },

    /// The collection expression resolved to something that is neither a
    /// sequence nor a mapping.
    #[error("'{expression}' should resolve to a list or a map, but resolved to {found}.")]
    UnsupportedCollection {
        expression: String,
        found: &'static str,
    },

    /// An unknown selection mode name.
    #[error("Unknown select mode '{0}', expected one of none, single, active, multi.")]
    InvalidSelectMode(String),

    /// The list-view configuration could not be loaded.
    #[error("Invalid list-view configuration: {0}")]
    Config(String),
}

impl ListViewError {
    /// Create an invalid-expression error.
    pub fn invalid_expression(expression: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
        }
    }

    /// Create an invalid-item-identifier error.
    pub fn invalid_item_identifier(lhs: impl Into<String>) -> Self {
        Self::InvalidItemIdentifier { lhs: lhs.into() }
    }

    /// Create a missing-key error.
    pub fn missing_key(collection: impl Into<String>) -> Self {
        Self::MissingKey {
            collection: collection.into(),
        }
    }

    /// Create an unsupported-collection error.
    pub fn unsupported_collection(expression: impl Into<String>, found: &'static str) -> Self {
        Self::UnsupportedCollection {
            expression: expression.into(),
            found,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// A stable short code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidExpression { .. } => "iexp",
            Self::InvalidItemIdentifier { .. } => "iidexp",
            Self::MissingKey { .. } => "nokey",
            Self::UnsupportedCollection { .. } => "badcoll",
            Self::InvalidSelectMode(_) => "badmode",
            Self::Config(_) => "config",
        }
    }
}
