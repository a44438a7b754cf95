//! Stub rule schema definitions.
//!
//! Rule files map a path template to an ordered list of rules:
//!
//! ```yaml
//! /users/{id}/profile:
//!   - request:
//!       method: GET
//!       queries:
//!         verbose: "true"
//!     response:
//!       status: 200
//!       body:
//!         result: "OK!"
//!     options:
//!       lagSec: 1
//! ```
//!
//! All types derive Serde traits so the same schema deserializes from
//! both supported file formats.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One parsed rule file: path template → rules in source order.
pub type RuleFile = BTreeMap<String, Vec<Rule>>;

/// A single request-pattern → response mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Constraints the incoming request must satisfy.
    pub request: ExpectedRequest,

    /// Canned response returned on match.
    pub response: ResponseSpec,

    /// Per-rule behavior tweaks.
    #[serde(default)]
    pub options: RuleOptions,
}

impl Rule {
    /// Semantic validation beyond what Serde enforces.
    pub fn validate(&self) -> Result<(), String> {
        self.response.validate()
    }
}

/// Expected request shape. Every field is optional; an absent field
/// leaves that axis unconstrained.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpectedRequest {
    /// HTTP method, compared verbatim.
    pub method: Option<String>,

    /// Expected placeholder captures from the path template.
    pub params: Option<Value>,

    /// Expected query parameters (GET) or body fields (other methods).
    pub queries: Option<Value>,

    /// Expected headers, keyed by lowercase header name.
    pub headers: Option<Value>,
}

/// Canned response: status plus a body rendered verbatim as JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseSpec {
    pub status: u16,
    pub body: Value,
}

impl ResponseSpec {
    pub fn validate(&self) -> Result<(), String> {
        if !(100..=599).contains(&self.status) {
            return Err(format!("invalid status code: {}", self.status));
        }
        Ok(())
    }
}

/// Per-rule options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOptions {
    /// Artificial response delay in whole seconds.
    #[serde(rename = "lagSec", deserialize_with = "deserialize_lag_sec")]
    pub lag_sec: u64,
}

/// Deserialize `lagSec` leniently: numbers truncate toward zero, numeric
/// strings parse, anything negative or non-numeric normalizes to 0.
fn deserialize_lag_sec<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| s as u64)
        .unwrap_or(0))
}
