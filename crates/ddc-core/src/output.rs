//! Serialization and writing of compiled output files

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// Layout of emitted JSON documents
///
/// Non-ASCII text is always written as-is, never `\u` escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    /// No whitespace at all
    #[default]
    Compact,
    /// Single line with `", "` and `": "` separators
    Spaced,
    /// Indented, one value per line
    Pretty,
}

/// Single-line layout with a space after every separator
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Serialize a JSON value in the requested layout
pub fn to_json_bytes(value: &Value, style: JsonStyle) -> Result<Vec<u8>> {
    let bytes = match style {
        JsonStyle::Compact => serde_json::to_vec(value)?,
        JsonStyle::Pretty => serde_json::to_vec_pretty(value)?,
        JsonStyle::Spaced => {
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
            value.serialize(&mut ser)?;
            buf
        }
    };
    Ok(bytes)
}

/// Write a generated file, creating the output directory if needed
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, contents).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value, style: JsonStyle) -> String {
        String::from_utf8(to_json_bytes(value, style).unwrap()).unwrap()
    }

    #[test]
    fn test_compact_style() {
        let value = json!({"1": {"key": 1, "tags": [1, 2]}});
        assert_eq!(render(&value, JsonStyle::Compact), r#"{"1":{"key":1,"tags":[1,2]}}"#);
    }

    #[test]
    fn test_spaced_style() {
        let value = json!({"1": {"key": 1, "tags": [1, 2]}, "2": {}});
        assert_eq!(
            render(&value, JsonStyle::Spaced),
            r#"{"1": {"key": 1, "tags": [1, 2]}, "2": {}}"#
        );
    }

    #[test]
    fn test_unicode_is_not_escaped() {
        let value = json!({"name": "长剑"});
        assert_eq!(render(&value, JsonStyle::Compact), r#"{"name":"长剑"}"#);
    }

    #[test]
    fn test_write_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("Item.json");
        write_file(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}
