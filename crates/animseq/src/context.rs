// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mutable key-value state threaded through one chain execution.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// A value stored in a [`Context`].
///
/// `Null` is a real, stored value: `get` returning `Some(Value::Null)`
/// means the key was set to nothing, while `None` means the key was never
/// set at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Present but empty
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f32),
    /// String
    Text(String),
}

impl Value {
    /// Get as bool if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as integer if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float if this is a `Float`
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice if this is a `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Shared mutable state for one chain execution.
///
/// Cloning a `Context` clones the handle, not the map: a parent chain and
/// the sub-chains it spawns via `parallel` all see the same entries.
/// Mutation ordering between concurrently running chains is caller-defined.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Rc<RefCell<IndexMap<String, Value>>>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, overwriting any previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }

    /// Look up `key`; `None` means the key was never set
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    /// Whether `key` has been set (even to [`Value::Null`])
    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_differs_from_null() {
        let ctx = Context::new();
        ctx.set("set-to-null", Value::Null);

        assert_eq!(ctx.get("never-set"), None);
        assert_eq!(ctx.get("set-to-null"), Some(Value::Null));
        assert!(ctx.contains("set-to-null"));
        assert!(!ctx.contains("never-set"));
    }

    #[test]
    fn test_overwrite_last_wins() {
        let ctx = Context::new();
        ctx.set("k", 1);
        ctx.set("k", "two");
        assert_eq!(ctx.get("k"), Some(Value::Text("two".into())));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_clone_shares_entries() {
        let ctx = Context::new();
        let shared = ctx.clone();
        shared.set("from-clone", 4.0f32);
        assert_eq!(ctx.get("from-clone").and_then(|v| v.as_float()), Some(4.0));
    }

    #[test]
    fn test_value_round_trips_through_json() {
        let value = Value::Text("payload".into());
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
