//! Path-template matching.
//!
//! # Responsibilities
//! - Compare a rule's path template against a decoded request path
//! - Extract named placeholder captures (`/users/{id}` → `id`)
//!
//! # Design Decisions
//! - Segment counts must be equal; there is no prefix matching and no
//!   trailing-slash normalization
//! - Literal segments compare byte-for-byte, case-sensitive
//! - A failed match never exposes partially collected captures

use std::collections::HashMap;

/// Matches `request_path` against `template`, returning the placeholder
/// captures on success.
///
/// A template segment of the exact form `{name}` matches any single
/// request segment and binds `name` to it, raw. If the same name appears
/// twice, the later capture wins.
pub fn match_path(template: &str, request_path: &str) -> Option<HashMap<String, String>> {
    let template_segments: Vec<&str> = template.split('/').collect();
    let request_segments: Vec<&str> = request_path.split('/').collect();

    if template_segments.len() != request_segments.len() {
        return None;
    }

    let mut captures = HashMap::new();
    for (pattern, segment) in template_segments.iter().zip(&request_segments) {
        if let Some(name) = placeholder_name(pattern) {
            captures.insert(name.to_string(), (*segment).to_string());
        } else if pattern != segment {
            return None;
        }
    }

    Some(captures)
}

/// Returns the placeholder name for segments shaped exactly `{name}`.
fn placeholder_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let captures = match_path("/hoge/fuga/get", "/hoge/fuga/get").unwrap();
        assert!(captures.is_empty());
    }

    #[test]
    fn test_placeholder_capture() {
        let captures = match_path("/hoge/{id}/get", "/hoge/1000/get").unwrap();
        assert_eq!(captures.get("id"), Some(&"1000".to_string()));
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_segment_count_mismatch() {
        assert!(match_path("/hoge/fuga/get", "/hoge/get").is_none());
        assert!(match_path("/hoge/{id}", "/hoge/1/extra").is_none());
        assert!(match_path("/hoge", "/hoge/").is_none());
    }

    #[test]
    fn test_literal_mismatch_discards_captures() {
        // The placeholder before the failing literal must not leak out.
        assert!(match_path("/{id}/fuga", "/1000/other").is_none());
    }

    #[test]
    fn test_case_sensitive_literals() {
        assert!(match_path("/Users/list", "/users/list").is_none());
    }

    #[test]
    fn test_duplicate_placeholder_later_wins() {
        let captures = match_path("/{id}/x/{id}", "/first/x/second").unwrap();
        assert_eq!(captures.get("id"), Some(&"second".to_string()));
    }

    #[test]
    fn test_malformed_braces_are_literals() {
        assert!(match_path("/{id/get", "/123/get").is_none());
        let captures = match_path("/{id/get", "/{id/get").unwrap();
        assert!(captures.is_empty());
    }

    #[test]
    fn test_placeholder_matches_any_single_segment() {
        let captures = match_path("/a/{v}", "/a/x%20y").unwrap();
        assert_eq!(captures.get("v"), Some(&"x%20y".to_string()));
    }
}
