//! Table schema and compiled document types

use crate::error::{Error, Result};
use crate::value::TypeTag;
use serde_json::{Map, Value};
use std::path::Path;

/// One compiled row, keyed by lowercased column name
pub type Record = Map<String, Value>;

/// A column definition
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Lowercased column name
    pub name: String,
    /// Declared type
    pub tag: TypeTag,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: &str, tag: TypeTag, index: usize) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            tag,
            index,
        }
    }
}

/// Ordered column definitions of a keyed table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from the name row and the type row
    pub fn from_rows(path: &Path, names: &[String], types: &[String]) -> Result<Self> {
        if types.is_empty() {
            return Err(Error::NoTypedColumns(path.to_path_buf()));
        }
        if names.len() != types.len() {
            return Err(Error::ColumnMismatch {
                path: path.to_path_buf(),
                names: names.len(),
                types: types.len(),
            });
        }

        let columns = names
            .iter()
            .zip(types)
            .enumerate()
            .map(|(i, (name, tag))| Column::new(name, TypeTag::parse(tag), i))
            .collect();

        Ok(Self { columns })
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// A compiled table
#[derive(Debug, Clone, PartialEq)]
pub enum TableDocument {
    /// Records stored under their `key` column
    Keyed(Map<String, Value>),
    /// Records in source row order
    List(Vec<Value>),
}

impl TableDocument {
    /// Number of records in the document
    pub fn len(&self) -> usize {
        match self {
            TableDocument::Keyed(map) => map.len(),
            TableDocument::List(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_value(self) -> Value {
        match self {
            TableDocument::Keyed(map) => Value::Object(map),
            TableDocument::List(rows) => Value::Array(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_lowercases_names() {
        let schema = TableSchema::from_rows(
            Path::new("item.csv"),
            &strings(&["Key", "Name", "Price"]),
            &strings(&["int", "STRING", "float"]),
        )
        .unwrap();

        assert_eq!(schema.column_count(), 3);
        assert_eq!(schema.columns[0].name, "key");
        assert_eq!(schema.columns[1].tag, TypeTag::String);
        assert_eq!(schema.columns[2].name, "price");
        assert_eq!(schema.columns[2].index, 2);
    }

    #[test]
    fn test_schema_column_mismatch() {
        let err = TableSchema::from_rows(
            Path::new("item.csv"),
            &strings(&["key", "name"]),
            &strings(&["int"]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::ColumnMismatch { names: 2, types: 1, .. }));
    }

    #[test]
    fn test_schema_requires_types() {
        let err = TableSchema::from_rows(Path::new("item.csv"), &strings(&["key"]), &[]).unwrap_err();
        assert!(matches!(err, Error::NoTypedColumns(_)));
    }

    #[test]
    fn test_unknown_type_kept_as_column() {
        let schema = TableSchema::from_rows(
            Path::new("item.csv"),
            &strings(&["key", "note"]),
            &strings(&["int", "comment"]),
        )
        .unwrap();
        assert_eq!(schema.columns[1].tag, TypeTag::Unknown);
    }
}
