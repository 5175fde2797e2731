//! Loosely-typed runtime values held by a [`Scope`](super::Scope).
//!
//! Lists and maps are reference types: cloning a [`Value::List`] or
//! [`Value::Map`] clones the shared handle, so a mutation made through the
//! collection resolved from a scope is visible to every other holder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Shared handle to an ordered sequence of values.
pub type ListRef = Arc<RwLock<Vec<Value>>>;

/// Shared handle to an insertion-ordered, string-keyed mapping.
pub type MapRef = Arc<RwLock<IndexMap<String, Value>>>;

/// A value that can be stored in a scope or a bound collection.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent / unresolved.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// A shared, mutable sequence.
    List(ListRef),
    /// A shared, mutable mapping from string keys to values.
    Map(MapRef),
}

impl Value {
    /// Creates a new list value owning `items`.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// Creates a new map value from key/value pairs, preserving their order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Arc::new(RwLock::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the shared list handle, if this is a list.
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the shared map handle, if this is a map.
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Name of the runtime shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Strict identity.
    ///
    /// Primitives compare by value (`NaN` is never identical to itself);
    /// lists and maps compare by handle, never by contents.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Converts this value into a mapping key.
    ///
    /// Strings are used as-is, numbers in their shortest decimal form and
    /// booleans as `"true"`/`"false"`. Null and compound values have no key.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Looks up a member: a map entry by key, or a list element by index.
    pub fn member(&self, segment: &str) -> Value {
        match self {
            Value::Map(map) => map.read().get(segment).cloned().unwrap_or_default(),
            Value::List(list) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| list.read().get(i).cloned())
                .unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Converts to a `serde_json::Value` (a deep copy).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(list) => {
                serde_json::Value::Array(list.read().iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.read()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Deep structural equality. Use [`Value::same`] for identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            _ => self.same(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::list(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(Arc::new(RwLock::new(v)))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(entries) => {
                Value::map(entries.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_shares_collection() {
        let list = Value::list([Value::from(1), Value::from(2)]);
        let alias = list.clone();

        alias.as_list().unwrap().write().push(Value::from(3));
        assert_eq!(list.as_list().unwrap().read().len(), 3);
        assert!(list.same(&alias));
    }

    #[test]
    fn test_identity_vs_equality() {
        let a = Value::from(json!({"name": "a"}));
        let b = Value::from(json!({"name": "a"}));

        assert_eq!(a, b);
        assert!(!a.same(&b));
        assert!(a.same(&a.clone()));

        assert!(Value::from("x").same(&Value::from("x")));
        assert!(!Value::Number(f64::NAN).same(&Value::Number(f64::NAN)));
        assert!(!Value::from(1).same(&Value::from("1")));
    }

    #[test]
    fn test_as_key() {
        assert_eq!(Value::from("b").as_key().as_deref(), Some("b"));
        assert_eq!(Value::from(1.0).as_key().as_deref(), Some("1"));
        assert_eq!(Value::from(1.5).as_key().as_deref(), Some("1.5"));
        assert_eq!(Value::from(true).as_key().as_deref(), Some("true"));
        assert_eq!(Value::Null.as_key(), None);
        assert_eq!(Value::list([]).as_key(), None);
    }

    #[test]
    fn test_member_lookup() {
        let value = Value::from(json!({"items": [{"name": "a"}, {"name": "b"}]}));
        let items = value.member("items");
        assert_eq!(items.type_name(), "list");
        assert_eq!(items.member("1").member("name"), Value::from("b"));
        assert!(items.member("7").is_null());
        assert!(items.member("name").is_null());
        assert!(Value::from(3).member("x").is_null());
    }

    #[test]
    fn test_json_bridge_preserves_order() {
        let source = json!({"c": "C", "a": "A", "b": [1, 2.5, null, true]});
        let value = Value::from(source.clone());

        let keys: Vec<String> = value.as_map().unwrap().read().keys().cloned().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(2).to_string(), "2");
        assert_eq!(Value::from("two").to_string(), "two");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    }
}
