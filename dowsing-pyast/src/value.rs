//! The result of statically evaluating a Python expression: either a
//! concrete value, or the infectious `Unresolvable` sentinel.
//!
//! `Unresolvable` is a dedicated variant, never a string, so callers can
//! always tell a legitimate empty/placeholder string apart from "the
//! analyzer gave up here".

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// The result of a call to the whitelisted package-discovery helper.
    Discover { where_: Box<Value>, exclude: Box<Value>, include: Box<Value> },
    Unresolvable,
}

impl Value {
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Value::Unresolvable)
    }

    /// Python-style truthiness, used to decide whether a script-provided
    /// value should override an INI-provided one during merge.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(i) => *i != 0,
            Value::Bool(b) => *b,
            Value::None => false,
            Value::List(v) | Value::Tuple(v) => !v.is_empty(),
            Value::Dict(v) => !v.is_empty(),
            Value::Discover { .. } => true,
            Value::Unresolvable => false,
        }
    }

    /// `+`/`+=`: string/string, list/list and tuple/tuple concatenate;
    /// anything else, or either side `Unresolvable`, yields `Unresolvable`.
    pub fn add(&self, other: &Value) -> Value {
        if self.is_unresolvable() || other.is_unresolvable() {
            return Value::Unresolvable;
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Value::Str(format!("{a}{b}")),
            (Value::List(a), Value::List(b)) => {
                Value::List(a.iter().chain(b.iter()).cloned().collect())
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                Value::Tuple(a.iter().chain(b.iter()).cloned().collect())
            }
            (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            _ => Value::Unresolvable,
        }
    }

    /// `a[b]`: mappings return `get(b, Unresolvable)`, sequences index by
    /// integer; anything out of range or the wrong shape is `Unresolvable`.
    pub fn subscript(&self, index: &Value) -> Value {
        if self.is_unresolvable() || index.is_unresolvable() {
            return Value::Unresolvable;
        }
        match self {
            Value::Dict(entries) => entries
                .iter()
                .find(|(k, _)| k == index)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Unresolvable),
            Value::List(items) | Value::Tuple(items) => match index {
                Value::Int(i) => {
                    let idx = if *i < 0 { items.len() as i64 + i } else { *i };
                    if idx >= 0 && (idx as usize) < items.len() {
                        items[idx as usize].clone()
                    } else {
                        Value::Unresolvable
                    }
                }
                _ => Value::Unresolvable,
            },
            _ => Value::Unresolvable,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) | Value::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a (possibly partially unresolvable) list of values into a
    /// list of strings, dropping entries that did not resolve to strings.
    pub fn into_string_list(&self) -> Vec<String> {
        match self {
            Value::List(v) | Value::Tuple(v) => v
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect(),
            Value::Str(s) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Converts to a string-keyed mapping of strings, used for `dict(...)`
    /// results like `package_dir` and `project_urls`.
    pub fn into_string_dict(&self) -> BTreeMap<String, String> {
        match self {
            Value::Dict(entries) => entries
                .iter()
                .filter_map(|(k, v)| match (k.as_str(), v.as_str()) {
                    (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Converts to a string-keyed mapping of string lists, used for
    /// `dict(...)` results whose values are themselves lists, like
    /// `extras_require` and `entry_points`.
    pub fn into_string_dict_of_lists(&self) -> BTreeMap<String, Vec<String>> {
        match self {
            Value::Dict(entries) => entries
                .iter()
                .filter_map(|(k, v)| {
                    let k = k.as_str()?;
                    let list = v.into_string_list();
                    if list.is_empty() {
                        None
                    } else {
                        Some((k.to_string(), list))
                    }
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}
