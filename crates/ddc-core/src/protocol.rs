//! Protocol catalog loading
//!
//! Each definition file maps string-encoded integers to `{name, description}`
//! objects. The file's base name, upper-cased, prefixes every symbol in it:
//! `chat.json` with `{"1": {"name": "SEND"}}` yields `CHAT_SEND = 1`.

use crate::error::{Error, Result};
use crate::parser::read_text;
use crate::scanner::strip_suffix_ignore_case;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One named integer constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolEntry {
    pub value: i64,
    /// `CATEGORY_name`
    pub name: String,
    pub description: String,
}

/// What to do when two entries share a symbol name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Log the duplicates and emit anyway
    #[default]
    Warn,
    /// Refuse to emit with `Error::DuplicateSymbols`
    Reject,
}

/// All entries of one run, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCatalog {
    pub entries: Vec<ProtocolEntry>,
}

impl ProtocolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbol names that occur more than once, in first-seen order
    pub fn duplicates(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.name.as_str()).or_default() += 1;
        }

        let mut duplicates: Vec<String> = Vec::new();
        for entry in &self.entries {
            if counts[entry.name.as_str()] > 1 && !duplicates.contains(&entry.name) {
                duplicates.push(entry.name.clone());
            }
        }
        duplicates
    }

    /// Apply the duplicate policy
    pub fn check_duplicates(&self, policy: DuplicatePolicy) -> Result<()> {
        let duplicates = self.duplicates();
        if duplicates.is_empty() {
            return Ok(());
        }

        match policy {
            DuplicatePolicy::Warn => {
                warn!("duplicate protocol symbols: {}", duplicates.join(", "));
                Ok(())
            }
            DuplicatePolicy::Reject => Err(Error::DuplicateSymbols(duplicates)),
        }
    }
}

/// Symbol prefix for a definition file: its base name upper-cased
pub fn category_of(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    strip_suffix_ignore_case(&file_name, ".json").to_uppercase()
}

/// Turn one parsed definition file into entries.
///
/// Entries keep the key order of the source text. An entry whose key is not
/// an integer, or that has no string `name`, is skipped.
pub fn parse_definitions(category: &str, document: &Value, path: &Path) -> Result<Vec<ProtocolEntry>> {
    let map = document
        .as_object()
        .ok_or_else(|| Error::NotAnObject(path.to_path_buf()))?;

    let mut entries = Vec::with_capacity(map.len());
    for (key, definition) in map {
        let Ok(value) = key.trim().parse::<i64>() else {
            warn!("{}: key '{}' is not an integer, skipped", path.display(), key);
            continue;
        };

        let Some(name) = definition.get("name").and_then(Value::as_str) else {
            warn!("{}: entry '{}' has no name, skipped", path.display(), key);
            continue;
        };

        let description = definition
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let entry = ProtocolEntry {
            value,
            name: format!("{}_{}", category, name),
            description: description.to_string(),
        };
        debug!("{} = {} | {}", entry.name, entry.value, entry.description);
        entries.push(entry);
    }

    Ok(entries)
}

/// Load one definition file
pub fn load_definition_file(path: &Path, encoding: &str) -> Result<Vec<ProtocolEntry>> {
    let text = read_text(path, encoding)?;
    let document: Value = serde_json::from_str(&text).map_err(|e| Error::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_definitions(&category_of(path), &document, path)
}

/// Load definition files in the given order into one catalog.
///
/// Files that are not a JSON object are skipped with a warning.
pub fn load_catalog(files: &[PathBuf], encoding: &str) -> Result<ProtocolCatalog> {
    let mut catalog = ProtocolCatalog::new();

    for path in files {
        info!("protocol category {} from {}", category_of(path), path.display());
        match load_definition_file(path, encoding) {
            Ok(entries) => catalog.entries.extend(entries),
            Err(e) if e.is_per_file() => warn!("skipping {}: {}", path.display(), e),
            Err(e) => return Err(e),
        }
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(category: &str, text: &str) -> Vec<ProtocolEntry> {
        let document: Value = serde_json::from_str(text).unwrap();
        parse_definitions(category, &document, Path::new("defs.json")).unwrap()
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category_of(Path::new("defs/chat.json")), "CHAT");
        assert_eq!(category_of(Path::new("Login.JSON")), "LOGIN");
        assert_eq!(category_of(Path::new("player_info.json")), "PLAYER_INFO");
    }

    #[test]
    fn test_parse_definitions() {
        let entries = parse("CHAT", r#"{"1": {"name": "SEND", "description": "d1", "extra": 5}}"#);
        assert_eq!(
            entries,
            vec![ProtocolEntry {
                value: 1,
                name: "CHAT_SEND".to_string(),
                description: "d1".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_keeps_source_key_order() {
        let entries = parse(
            "SCENE",
            r#"{"121": {"name": "CHANGE"}, "11": {"name": "ERROR"}, "-3": {"name": "NEG"}}"#,
        );
        let values: Vec<i64> = entries.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![121, 11, -3]);
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let entries = parse(
            "X",
            r#"{"one": {"name": "A"}, "2": {"description": "no name"}, "3": 7, "4": {"name": "OK"}}"#,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "X_OK");
    }

    #[test]
    fn test_non_object_document() {
        let err = parse_definitions("X", &json!([1, 2]), Path::new("x.json")).unwrap_err();
        assert!(matches!(err, Error::NotAnObject(_)));
        assert!(err.is_per_file());
    }

    #[test]
    fn test_duplicates() {
        let mut catalog = ProtocolCatalog::new();
        for (value, name) in [(1, "A_X"), (2, "A_Y"), (3, "A_X")] {
            catalog.entries.push(ProtocolEntry {
                value,
                name: name.to_string(),
                description: String::new(),
            });
        }

        assert_eq!(catalog.duplicates(), vec!["A_X".to_string()]);
        assert!(catalog.check_duplicates(DuplicatePolicy::Warn).is_ok());
        assert!(matches!(
            catalog.check_duplicates(DuplicatePolicy::Reject),
            Err(Error::DuplicateSymbols(_))
        ));
    }
}
