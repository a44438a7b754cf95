//! Structural subset matching for expected request values.
//!
//! # Responsibilities
//! - Decide whether an actual JSON value satisfies an expected one
//! - Support the wildcard literal `"*"` (any present value)
//! - Support enumeration strings of the form `{A|B|C}`
//! - Recurse through objects (extra actual keys ignored) and arrays
//!   (order-independent, multiset semantics)
//!
//! # Design Decisions
//! - Values that are absent satisfy nothing, not even the wildcard
//! - `null` is a present value: it satisfies the wildcard and `null`,
//!   nothing else
//! - Expected array elements are visited in a total order over JSON
//!   values so matching is deterministic

use serde_json::Value;
use std::cmp::Ordering;

const WILDCARD: &str = "*";

/// Returns true if `actual` satisfies everything `expected` demands.
///
/// `actual` is `None` when the request carries no value at this position
/// (a missing key); a present `null` is `Some(&Value::Null)`.
pub fn is_subset(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    // Identical values always satisfy each other, including strings that
    // happen to look like a wildcard or an enumeration.
    if actual == expected {
        return true;
    }

    if let Value::String(pattern) = expected {
        if pattern == WILDCARD {
            return true;
        }
        if let Some(alternatives) = enumeration_alternatives(pattern) {
            return match actual {
                Value::String(value) => alternatives.contains(&value.as_str()),
                _ => false,
            };
        }
    }

    match expected {
        Value::Object(expected_map) => match actual {
            Value::Object(actual_map) => expected_map
                .iter()
                .all(|(key, value)| is_subset(actual_map.get(key), value)),
            _ => false,
        },
        Value::Array(expected_items) => match actual {
            Value::Array(actual_items) => array_subset(actual_items, expected_items),
            _ => false,
        },
        // Scalars of differing type or value fall through the equality
        // check above.
        _ => false,
    }
}

/// Splits an enumeration string `{A|B|C}` into its alternatives.
///
/// A string qualifies only when it is brace-delimited and contains at
/// least one `|`; a plain `{value}` string is matched literally.
fn enumeration_alternatives(pattern: &str) -> Option<Vec<&str>> {
    let inner = pattern.strip_prefix('{')?.strip_suffix('}')?;
    if !inner.contains('|') {
        return None;
    }
    Some(inner.split('|').collect())
}

/// Multiset matching: every expected element must consume one distinct,
/// recursively-matching actual element. Actual elements beyond those are
/// ignored; an expected element with no match fails the whole array.
fn array_subset(actual: &[Value], expected: &[Value]) -> bool {
    let mut expected: Vec<&Value> = expected.iter().collect();
    expected.sort_by(|a, b| value_order(a, b));

    let mut consumed = vec![false; actual.len()];
    for item in expected {
        let slot = actual
            .iter()
            .enumerate()
            .find(|(index, candidate)| !consumed[*index] && is_subset(Some(*candidate), item));
        match slot {
            Some((index, _)) => consumed[index] = true,
            None => return false,
        }
    }
    true
}

/// Total order over JSON values: type rank first, then value. Composite
/// values compare by their serialized form, which is stable enough to fix
/// the visit order.
fn value_order(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    })
}
