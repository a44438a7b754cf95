//! Rule lookup and dispatch.
//!
//! # Responsibilities
//! - Walk a registry snapshot in file → template → rule order
//! - Apply the path matcher, then the per-axis subset checks
//! - Return the first matching rule's response, or an explicit NotFound
//!
//! # Design Decisions
//! - First match wins; no scoring, no best-match heuristics
//! - Deterministic: the same registry and request always dispatch the
//!   same way
//! - Mismatches are control flow, not errors

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::schema::Rule;
use crate::registry::StubRegistry;
use crate::routing::matcher::match_path;
use crate::routing::subset::is_subset;

/// Everything dispatch needs to know about one request.
#[derive(Debug, Clone)]
pub struct RequestView {
    /// HTTP method, uppercase.
    pub method: String,
    /// Percent-decoded request path.
    pub path: String,
    /// Query parameters (GET) or parsed body fields (other methods), as
    /// a JSON object.
    pub queries: Value,
    /// Request headers as a JSON object, names lowercased.
    pub headers: Value,
}

/// Result of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched {
        status: u16,
        body: Value,
        lag_sec: u64,
    },
    NotFound,
}

/// Find the first rule satisfied by `request`.
pub fn dispatch(registry: &StubRegistry, request: &RequestView) -> Outcome {
    for file in &registry.files {
        for (template, rules) in &file.paths {
            tracing::debug!(file = %file.source, template = %template, "Comparing path template");
            let Some(captures) = match_path(template, &request.path) else {
                continue;
            };
            tracing::debug!(file = %file.source, template = %template, "Path matched");

            let params = captures_value(captures);
            for (index, rule) in rules.iter().enumerate() {
                if rule_matches(rule, request, &params) {
                    tracing::info!(
                        file = %file.source,
                        template = %template,
                        rule = index,
                        "Rule matched"
                    );
                    return Outcome::Matched {
                        status: rule.response.status,
                        body: rule.response.body.clone(),
                        lag_sec: rule.options.lag_sec,
                    };
                }
            }
        }
    }

    tracing::info!(method = %request.method, path = %request.path, "No rule matched");
    Outcome::NotFound
}

fn captures_value(captures: HashMap<String, String>) -> Value {
    Value::Object(
        captures
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect::<Map<_, _>>(),
    )
}

fn rule_matches(rule: &Rule, request: &RequestView, params: &Value) -> bool {
    let expected = &rule.request;

    if let Some(method) = &expected.method {
        if method != &request.method {
            return false;
        }
    }

    axis_matches(params, expected.params.as_ref())
        && axis_matches(&request.queries, expected.queries.as_ref())
        && axis_matches(&request.headers, expected.headers.as_ref())
}

/// An absent expectation leaves the axis unconstrained.
fn axis_matches(actual: &Value, expected: Option<&Value>) -> bool {
    expected.map_or(true, |expected| is_subset(Some(actual), expected))
}
