//! One-shot query parameters and record matching
//!
//! The store only understands flat field comparisons: equality,
//! array-contains, ordering by a single field and a cursor value.
//! Everything richer stays client-side.

use serde_json::Value;
use std::cmp::Ordering;

/// Record filter applied before ordering and limiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every record in the collection.
    All,
    /// Field equals the given value.
    FieldEq(String, Value),
    /// Field is an array containing the given value.
    ArrayContains(String, Value),
}

impl Filter {
    pub fn field_eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::FieldEq(field.to_string(), value.into())
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Filter::ArrayContains(field.to_string(), value.into())
    }

    /// Whether a document matches this filter.
    pub fn matches(&self, data: &serde_json::Map<String, Value>) -> bool {
        match self {
            Filter::All => true,
            Filter::FieldEq(field, value) => data.get(field) == Some(value),
            Filter::ArrayContains(field, value) => data
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parameters for a one-shot `query` call.
#[derive(Debug, Clone)]
pub struct Query {
    pub filter: Filter,
    /// Field name and direction to order by.
    pub order_by: Option<(String, SortOrder)>,
    /// Maximum number of records returned.
    pub limit: Option<usize>,
    /// Cursor: only records strictly past this value of the `order_by`
    /// field, in sort direction, are returned.
    pub start_after: Option<Value>,
}

impl Query {
    pub fn all() -> Self {
        Query {
            filter: Filter::All,
            order_by: None,
            limit: None,
            start_after: None,
        }
    }

    pub fn filtered(filter: Filter) -> Self {
        Query {
            filter,
            order_by: None,
            limit: None,
            start_after: None,
        }
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: impl Into<Value>) -> Self {
        self.start_after = Some(cursor.into());
        self
    }
}

/// Total order over JSON values used for `order_by` and cursors.
///
/// Numbers compare numerically, strings lexicographically; values of
/// different types are ranked by type so the order is still total.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn type_rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
