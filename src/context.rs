//! Data context used to resolve bound values while interpreting
//!
//! The interpreter only talks to the [`DataContext`] trait; [`JsonContext`] is the
//! default implementation over `serde_json` values with mustache-style scoping.

use serde_json::Value;

use crate::graph::Expr;

/// How a section should treat its resolved value
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    /// Render nothing
    Skip,
    /// Render once in the current scope
    Once,
    /// Render once with the value pushed as a new scope
    Scoped(Value),
    /// Render once per item, each pushed as a scope with its index
    Iterate(Vec<Value>),
}

/// Resolves expressions against the data being rendered
pub trait DataContext {
    /// Resolve an expression to a value; unresolvable paths yield `Value::Null`
    fn lookup(&self, expr: &Expr) -> Value;

    /// Enter a child scope
    fn push_scope(&mut self, value: Value, index: Option<usize>);

    /// Leave the innermost child scope
    fn pop_scope(&mut self);

    /// Decide how a section renders for its value
    fn section(&self, expr: &Expr) -> SectionValue {
        classify(self.lookup(expr))
    }

    /// Text for an interpolated value
    fn text(&self, expr: &Expr) -> String {
        to_text(&self.lookup(expr))
    }
}

struct Scope {
    value: Value,
    index: Option<usize>,
}

/// Context over a stack of JSON scopes
pub struct JsonContext {
    scopes: Vec<Scope>,
}

impl JsonContext {
    pub fn new(data: Value) -> Self {
        Self {
            scopes: vec![Scope {
                value: data,
                index: None,
            }],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn current(&self) -> &Value {
        self.scopes
            .last()
            .map(|s| &s.value)
            .unwrap_or(&Value::Null)
    }

    fn current_index(&self) -> Option<usize> {
        self.scopes.iter().rev().find_map(|s| s.index)
    }
}

impl DataContext for JsonContext {
    fn lookup(&self, expr: &Expr) -> Value {
        let mut segments = expr.segments();
        let Some(first) = segments.next() else {
            return self.current().clone();
        };

        if first == "@index" {
            return self
                .current_index()
                .map(Value::from)
                .unwrap_or(Value::Null);
        }

        // Explicit `this.`/`.` paths stay in the current scope
        let path = expr.as_str();
        let explicit = path.starts_with('.') || path == "this" || path.starts_with("this.");
        let root = if explicit {
            self.current().get(first)
        } else {
            self.scopes.iter().rev().find_map(|s| s.value.get(first))
        };

        let mut value = match root {
            Some(v) => v,
            None => return Value::Null,
        };
        for segment in segments {
            value = match value {
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(i) => match items.get(i) {
                        Some(v) => v,
                        None => return Value::Null,
                    },
                    Err(_) => return Value::Null,
                },
                other => match other.get(segment) {
                    Some(v) => v,
                    None => return Value::Null,
                },
            };
        }
        value.clone()
    }

    fn push_scope(&mut self, value: Value, index: Option<usize>) {
        self.scopes.push(Scope { value, index });
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }
}

/// Whether a value counts as true for sections
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

/// Classify a resolved value for section rendering
pub fn classify(value: Value) -> SectionValue {
    match value {
        Value::Array(items) if items.is_empty() => SectionValue::Skip,
        Value::Array(items) => SectionValue::Iterate(items),
        Value::Object(_) => SectionValue::Scoped(value),
        other if is_truthy(&other) => SectionValue::Once,
        _ => SectionValue::Skip,
    }
}

/// Convert a value to interpolation text
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        compound => compound.to_string(),
    }
}
