//! Rule loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::RuleFile;
use crate::registry::{FileEntry, StubRegistry};

/// Error type for rule loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("invalid rule in {file}: {message}")]
    Validation { file: String, message: String },
}

/// Load every rule file in `dir` and build a fresh registry.
///
/// Two formats are supported: `.yml`/`.yaml` and `.json`. Markup files
/// are loaded first, then JSON files, each group in lexical file-name
/// order; that order is also the dispatch order across files. Any
/// unreadable or malformed file fails the whole load.
pub fn load_dir(dir: &Path) -> Result<StubRegistry, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut markup_files = Vec::new();
    let mut json_files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => markup_files.push(path),
            Some("json") => json_files.push(path),
            _ => {}
        }
    }
    markup_files.sort();
    json_files.sort();

    let mut files = Vec::new();
    for path in markup_files.iter().chain(&json_files) {
        files.push(load_file(path)?);
    }

    Ok(StubRegistry { files })
}

fn load_file(path: &Path) -> Result<FileEntry, LoadError> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    let paths: RuleFile = if is_json {
        serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            file: source.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|e| LoadError::Parse {
            file: source.clone(),
            message: e.to_string(),
        })?
    };

    for rules in paths.values() {
        for rule in rules {
            rule.validate().map_err(|message| LoadError::Validation {
                file: source.clone(),
                message,
            })?;
        }
    }

    tracing::debug!(file = %source, templates = paths.len(), "Rule file loaded");
    Ok(FileEntry { source, paths })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    const MINIMAL: &str = "/x:\n  - request: {}\n    response: {status: 200, body: null}\n";

    #[test]
    fn test_load_mixed_formats_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b.yml",
            "/b:\n  - request: {}\n    response: {status: 200, body: null}\n",
        );
        write(
            dir.path(),
            "a.json",
            r#"{"/a": [{"request": {}, "response": {"status": 200, "body": null}}]}"#,
        );
        write(
            dir.path(),
            "a.yaml",
            "/a:\n  - request: {}\n    response: {status: 200, body: null}\n",
        );
        write(dir.path(), "ignored.txt", "not rules");

        let registry = load_dir(dir.path()).unwrap();
        let sources: Vec<&str> = registry.files.iter().map(|f| f.source.as_str()).collect();
        // Markup files first, then JSON, each group lexical.
        assert_eq!(sources, vec!["a.yaml", "b.yml", "a.json"]);
        assert_eq!(registry.rule_count(), 3);
    }

    #[test]
    fn test_same_template_stays_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.yml", MINIMAL);
        write(dir.path(), "two.yml", MINIMAL);

        let registry = load_dir(dir.path()).unwrap();
        assert_eq!(registry.file_count(), 2);
        for file in &registry.files {
            assert_eq!(file.paths["/x"].len(), 1);
        }
    }

    #[test]
    fn test_rule_order_preserved_within_template() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "rules.yml",
            "/x:\n  - request: {method: GET}\n    response: {status: 200, body: null}\n  - request: {method: POST}\n    response: {status: 201, body: null}\n",
        );

        let registry = load_dir(dir.path()).unwrap();
        let rules = &registry.files[0].paths["/x"];
        assert_eq!(rules[0].request.method.as_deref(), Some("GET"));
        assert_eq!(rules[1].request.method.as_deref(), Some("POST"));
    }

    #[test]
    fn test_malformed_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.yml", MINIMAL);
        write(dir.path(), "bad.yml", "/x:\n  - request: [not a mapping\n");

        let error = load_dir(dir.path()).unwrap_err();
        assert!(matches!(error, LoadError::Parse { ref file, .. } if file == "bad.yml"));
    }

    #[test]
    fn test_invalid_status_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "bad.yml",
            "/x:\n  - request: {}\n    response: {status: 9999, body: null}\n",
        );
        let error = load_dir(dir.path()).unwrap_err();
        assert!(matches!(error, LoadError::Validation { .. }));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(load_dir(&missing), Err(LoadError::Io { .. })));
    }
}
