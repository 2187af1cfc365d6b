//! Error types for ddc-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ddc-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A definition file that is not valid JSON
    #[error("invalid JSON in '{path}': {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Source text is not valid in the configured encoding
    #[error("'{path}' is not valid {encoding} text")]
    Decode { path: PathBuf, encoding: String },

    /// A header row the table layout requires is absent
    #[error("missing {row} row in '{path}'")]
    MissingHeader { path: PathBuf, row: &'static str },

    /// Name row and type row disagree on the column count
    #[error("column mismatch in '{path}': {names} names, {types} types")]
    ColumnMismatch {
        path: PathBuf,
        names: usize,
        types: usize,
    },

    /// The type row declares no columns
    #[error("no column types declared in '{0}'")]
    NoTypedColumns(PathBuf),

    /// A protocol definition file whose top-level value is not an object
    #[error("'{0}' does not contain a JSON object")]
    NotAnObject(PathBuf),

    /// Discovery found nothing to compile
    #[error("no input files found in '{0}'")]
    NoInputFiles(PathBuf),

    /// The protocol catalog declares the same symbol more than once
    #[error("duplicate protocol symbols: {}", .0.join(", "))]
    DuplicateSymbols(Vec<String>),

    /// Encoding label is not recognized
    #[error("unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    /// The csv reader only splits on single-byte delimiters
    #[error("CSV delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Unknown emitter target name
    #[error("unknown target '{0}' (expected java, csharp, godot or lua)")]
    UnknownTarget(String),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error only concerns a single input file.
    ///
    /// Per-file errors skip the offending file; everything else ends the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::Csv { .. }
                | Error::InvalidJson { .. }
                | Error::Decode { .. }
                | Error::MissingHeader { .. }
                | Error::ColumnMismatch { .. }
                | Error::NoTypedColumns(_)
                | Error::NotAnObject(_)
        )
    }
}
