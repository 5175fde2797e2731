//! Scopes and the generic expression evaluator.
//!
//! A [`Scope`] is the dynamic context a list binding is evaluated against: a
//! mapping from names to [`Value`]s with an optional parent it falls back to.
//! An [`Evaluator`] resolves an expression string against a scope; the
//! default [`PathEvaluator`] supports plain member paths such as
//! `vm.items`, `list[0].name` or `groups['a b']`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use listview_core::logging::targets;
use parking_lot::RwLock;

use super::value::Value;

struct ScopeInner {
    vars: RwLock<IndexMap<String, Value>>,
    parent: Option<Scope>,
}

/// A prototype-chained mapping from names to values.
///
/// Cloning a `Scope` yields another handle to the same scope. Equality and
/// hashing are by identity, so scopes can be used directly as selection
/// targets.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Creates an empty root scope.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                vars: RwLock::new(IndexMap::new()),
                parent: None,
            }),
        }
    }

    /// Creates a root scope whose variables are the entries of a JSON object.
    ///
    /// Non-object JSON yields an empty scope.
    pub fn from_json(json: serde_json::Value) -> Self {
        let scope = Self::new();
        if let serde_json::Value::Object(entries) = json {
            for (name, value) in entries {
                scope.set(name, Value::from(value));
            }
        }
        scope
    }

    /// Creates a child scope. Names not defined on the child resolve through
    /// this scope.
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                vars: RwLock::new(IndexMap::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Returns the parent scope, if any.
    pub fn parent(&self) -> Option<&Scope> {
        self.inner.parent.as_ref()
    }

    /// Looks up a name, walking up the parent chain. Undefined names are null.
    pub fn get(&self, name: &str) -> Value {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.inner.vars.read().get(name) {
                return value.clone();
            }
            scope = current.parent();
        }
        Value::Null
    }

    /// Returns true if the name is defined on this scope or an ancestor.
    pub fn has(&self, name: &str) -> bool {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if current.inner.vars.read().contains_key(name) {
                return true;
            }
            scope = current.parent();
        }
        false
    }

    /// Defines (or overwrites) a name on this scope. Never writes to a parent.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.vars.write().insert(name.into(), value.into());
    }

    /// Removes a name defined on this scope, returning its value.
    pub fn unset(&self, name: &str) -> Option<Value> {
        self.inner.vars.write().shift_remove(name)
    }

    /// Names defined directly on this scope, in definition order.
    pub fn local_names(&self) -> Vec<String> {
        self.inner.vars.read().keys().cloned().collect()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("names", &self.local_names())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

/// Resolves an expression string against a scope.
///
/// This is the host's generic expression evaluator. Any
/// `Fn(&str, &Scope) -> Value` closure is an evaluator.
pub trait Evaluator: Send + Sync {
    /// Evaluates `expression` against `scope`.
    fn evaluate(&self, expression: &str, scope: &Scope) -> Value;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &Scope) -> Value + Send + Sync,
{
    fn evaluate(&self, expression: &str, scope: &Scope) -> Value {
        self(expression, scope)
    }
}

/// Path-based member access.
///
/// Grammar: an identifier followed by any number of `.name`, `[index]`,
/// `['key']` or `["key"]` accessors. Anything else, and any path that does
/// not resolve, evaluates to null.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator;

impl PathEvaluator {
    /// Creates a path evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Splits a path into its segments, or `None` if it is not a plain path.
    pub fn segments(expression: &str) -> Option<Vec<String>> {
        let mut chars = expression.trim().chars().peekable();
        let mut segments = Vec::new();

        let root = take_identifier(&mut chars);
        if root.is_empty() {
            return None;
        }
        segments.push(root);

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let name = take_identifier(&mut chars);
                    if name.is_empty() {
                        return None;
                    }
                    segments.push(name);
                }
                '[' => {
                    let segment = match chars.peek() {
                        Some(&quote) if quote == '\'' || quote == '"' => {
                            chars.next();
                            let mut key = String::new();
                            loop {
                                match chars.next()? {
                                    c if c == quote => break,
                                    c => key.push(c),
                                }
                            }
                            key
                        }
                        _ => {
                            let mut digits = String::new();
                            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                                digits.push(c);
                                chars.next();
                            }
                            if digits.is_empty() {
                                return None;
                            }
                            digits
                        }
                    };
                    if chars.next() != Some(']') {
                        return None;
                    }
                    segments.push(segment);
                }
                _ => return None,
            }
        }

        Some(segments)
    }
}

fn take_identifier(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(c) = chars
        .peek()
        .copied()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
    {
        name.push(c);
        chars.next();
    }
    name
}

impl Evaluator for PathEvaluator {
    fn evaluate(&self, expression: &str, scope: &Scope) -> Value {
        let Some(segments) = Self::segments(expression) else {
            if !expression.trim().is_empty() {
                tracing::debug!(
                    target: targets::PARSER,
                    expression,
                    "not a member path, evaluating to null"
                );
            }
            return Value::Null;
        };

        let mut segments = segments.iter();
        let Some(root) = segments.next() else {
            return Value::Null;
        };
        segments.fold(scope.get(root), |value, segment| value.member(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_scope_falls_through() {
        let root = Scope::new();
        root.set("items", Value::list([]));
        root.set("title", "root");

        let child = root.child();
        child.set("title", "child");

        assert_eq!(child.get("title"), Value::from("child"));
        assert_eq!(root.get("title"), Value::from("root"));
        assert!(child.get("items").same(&root.get("items")));
        assert!(child.has("items"));
        assert!(!child.has("missing"));
        assert!(child.get("missing").is_null());
        assert_eq!(child.parent(), Some(&root));
    }

    #[test]
    fn test_scope_identity() {
        let a = Scope::new();
        let b = Scope::new();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a.clone());
        set.insert(a.clone());
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_unset() {
        let scope = Scope::from_json(json!({"a": 1, "b": 2}));
        assert_eq!(scope.unset("a"), Some(Value::from(1)));
        assert_eq!(scope.local_names(), vec!["b"]);
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(
            PathEvaluator::segments(" vm.items[2]['a b'].$id "),
            Some(vec![
                "vm".to_string(),
                "items".to_string(),
                "2".to_string(),
                "a b".to_string(),
                "$id".to_string()
            ])
        );
        assert_eq!(PathEvaluator::segments(""), None);
        assert_eq!(PathEvaluator::segments("a."), None);
        assert_eq!(PathEvaluator::segments("a[x]"), None);
        assert_eq!(PathEvaluator::segments("a['x'"), None);
        assert_eq!(PathEvaluator::segments("a + b"), None);
    }

    #[test]
    fn test_path_evaluation() {
        let scope = Scope::from_json(json!({
            "vm": {"items": [{"name": "a"}, {"name": "b"}], "by id": {"x": 1}}
        }));
        let eval = PathEvaluator::new();

        assert_eq!(eval.evaluate("vm.items[1].name", &scope), Value::from("b"));
        assert_eq!(eval.evaluate("vm.items.0.name", &scope), Value::from("a"));
        assert_eq!(eval.evaluate("vm['by id'].x", &scope), Value::from(1));
        assert!(eval.evaluate("vm.nothing.here", &scope).is_null());
        assert!(eval.evaluate("1 + 1", &scope).is_null());
    }

    #[test]
    fn test_closure_evaluator() {
        let eval = |expression: &str, _scope: &Scope| Value::from(expression.len());
        assert_eq!(eval.evaluate("abc", &Scope::new()), Value::from(3usize));
    }
}
