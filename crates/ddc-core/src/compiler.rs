//! Table compiler: designer CSV tables to JSON documents
//!
//! Two layouts are supported:
//! - keyed: a title row, a name row and a type row, then data; rows are
//!   coerced per declared type and stored under their `key` column
//! - list: a name row and a comment row, then data; cells are read as JSON
//!   literals and rows are kept in order

use crate::error::{Error, Result};
use crate::output::{to_json_bytes, write_file, JsonStyle};
use crate::parser::{check_encoding, delimiter_byte, read_table_rows};
use crate::scanner::{discover_tables, require_files, EmptyInputPolicy, FileOrder, TableSource};
use crate::table::{Record, TableDocument, TableSchema};
use crate::value::{coerce, infer, BoolPolicy};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Table layout variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    #[default]
    Keyed,
    List,
}

impl TableMode {
    /// Rows before the first data row
    pub fn header_rows(&self) -> usize {
        match self {
            TableMode::Keyed => 3,
            TableMode::List => 2,
        }
    }

    /// File-name delimiter used when none is configured
    pub fn default_name_delimiter(&self) -> &'static str {
        match self {
            TableMode::Keyed => "@",
            TableMode::List => "#",
        }
    }
}

/// Options for a table compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub mode: TableMode,
    /// Separates the display name from the output name in source file names
    pub name_delimiter: Option<String>,
    /// CSV field delimiter
    pub delimiter: char,
    pub encoding: String,
    pub style: JsonStyle,
    pub bools: BoolPolicy,
    pub order: FileOrder,
    pub empty_input: EmptyInputPolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            mode: TableMode::Keyed,
            name_delimiter: None,
            delimiter: ',',
            encoding: "utf-8".to_string(),
            style: JsonStyle::Compact,
            bools: BoolPolicy::Truthy,
            order: FileOrder::Listing,
            empty_input: EmptyInputPolicy::Fail,
        }
    }
}

impl TableOptions {
    /// Effective file-name delimiter
    pub fn name_delimiter(&self) -> &str {
        self.name_delimiter
            .as_deref()
            .unwrap_or_else(|| self.mode.default_name_delimiter())
    }
}

/// A table that was compiled and written
#[derive(Debug, Clone)]
pub struct WrittenTable {
    pub source: PathBuf,
    pub output: PathBuf,
    pub records: usize,
}

/// A table that produced no output
#[derive(Debug, Clone)]
pub struct SkippedTable {
    pub source: PathBuf,
    pub reason: String,
}

/// Outcome of compiling a batch of tables
#[derive(Debug, Clone, Default)]
pub struct TableReport {
    pub written: Vec<WrittenTable>,
    pub skipped: Vec<SkippedTable>,
}

/// Compile the rows of a keyed table.
///
/// Row 1 is a title and is ignored, row 2 names the columns, row 3 types them.
/// The first data row shorter than the schema ends the table. Rows without a
/// non-empty `key` are dropped.
pub fn compile_keyed(path: &Path, rows: &[Vec<String>], bools: BoolPolicy) -> Result<TableDocument> {
    let mut rows = rows.iter();
    let missing = |row| Error::MissingHeader {
        path: path.to_path_buf(),
        row,
    };

    rows.next().ok_or_else(|| missing("title"))?;
    let names = rows.next().ok_or_else(|| missing("name"))?;
    let types = rows.next().ok_or_else(|| missing("type"))?;

    let schema = TableSchema::from_rows(path, names, types)?;
    let count = schema.column_count();
    debug!(
        "{}: columns {:?}",
        path.display(),
        schema
            .columns
            .iter()
            .map(|c| format!("{}:{}", c.name, c.tag))
            .collect::<Vec<_>>()
    );

    // The last column called `key` supplies the record key
    let key_index = schema.columns.iter().rposition(|c| c.name == "key");
    if key_index.is_none() {
        warn!("{}: no 'key' column, every row will be dropped", path.display());
    }

    let mut records = Map::new();
    for (i, row) in rows.enumerate() {
        if row.len() < count {
            debug!(
                "{}: data row {} has {} of {} cells, end of table",
                path.display(),
                i + 1,
                row.len(),
                count
            );
            break;
        }

        let mut record = Record::new();
        let mut key = String::new();
        for column in &schema.columns {
            let value = coerce(&row[column.index], column.tag, bools);
            if Some(column.index) == key_index {
                key = value.key_string();
            }
            record.insert(column.name.clone(), value.into());
        }

        if key.is_empty() {
            debug!("{}: data row {} has no key, dropped", path.display(), i + 1);
            continue;
        }

        if records.insert(key.clone(), Value::Object(record)).is_some() {
            warn!("{}: duplicate key '{}', later row wins", path.display(), key);
        }
    }

    Ok(TableDocument::Keyed(records))
}

/// Compile the rows of a list table.
///
/// Row 1 names the columns, row 2 is a comment. Each cell is read as a JSON
/// literal, or kept as text when it is not one. Cells missing from a short
/// row are null.
pub fn compile_list(path: &Path, rows: &[Vec<String>]) -> Result<TableDocument> {
    let mut rows = rows.iter();
    let names: Vec<String> = rows
        .next()
        .ok_or_else(|| Error::MissingHeader {
            path: path.to_path_buf(),
            row: "name",
        })?
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();

    // Comment row
    rows.next();

    let mut records = Vec::new();
    for row in rows {
        if row.is_empty() {
            break;
        }

        let record: Record = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row.get(i).map(|cell| infer(cell)).unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect();
        records.push(Value::Object(record));
    }

    Ok(TableDocument::List(records))
}

/// Read and compile a single table file
pub fn compile_table_file(path: &Path, options: &TableOptions) -> Result<TableDocument> {
    let rows = read_table_rows(
        path,
        &options.encoding,
        options.delimiter,
        options.mode.header_rows(),
    )?;

    match options.mode {
        TableMode::Keyed => compile_keyed(path, &rows, options.bools),
        TableMode::List => compile_list(path, &rows),
    }
}

/// Compile tables in the given order and write one JSON file per table.
///
/// Structural problems in one file skip that file; I/O failures end the run.
pub fn compile_tables(
    sources: &[TableSource],
    output_dir: &Path,
    options: &TableOptions,
) -> Result<TableReport> {
    let mut report = TableReport::default();
    let mut outputs = HashSet::new();

    for source in sources {
        info!("loading table {} -> {}.json", source.path.display(), source.name);

        let document = match compile_table_file(&source.path, options) {
            Ok(document) => document,
            Err(e) if e.is_per_file() => {
                warn!("skipping {}: {}", source.path.display(), e);
                report.skipped.push(SkippedTable {
                    source: source.path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        if document.is_empty() {
            info!("{}: no records, nothing written", source.path.display());
            report.skipped.push(SkippedTable {
                source: source.path.clone(),
                reason: "no records".to_string(),
            });
            continue;
        }

        let records = document.len();
        let output = output_dir.join(format!("{}.json", source.name));
        if !outputs.insert(output.clone()) {
            warn!(
                "{} overwrites {} written earlier in this run",
                source.path.display(),
                output.display()
            );
        }
        let bytes = to_json_bytes(&document.into_value(), options.style)?;
        write_file(&output, &bytes)?;
        info!("wrote {} ({} records)", output.display(), records);

        report.written.push(WrittenTable {
            source: source.path.clone(),
            output,
            records,
        });
    }

    Ok(report)
}

/// Discover and compile every table in `input_dir`
pub fn run_tables(input_dir: &Path, output_dir: &Path, options: &TableOptions) -> Result<TableReport> {
    check_encoding(&options.encoding)?;
    delimiter_byte(options.delimiter)?;

    let sources = discover_tables(input_dir, options.name_delimiter(), options.order)?;
    let paths: Vec<PathBuf> = sources.iter().map(|s| s.path.clone()).collect();
    require_files(input_dir, &paths, options.empty_input)?;

    if sources.is_empty() {
        info!("no tables found in {}", input_dir.display());
    }

    compile_tables(&sources, output_dir, options)
}
