//! ddc-core: Core library for compiling designer data definitions
//!
//! This library provides functionality to:
//! - Coerce CSV cells into typed JSON values under a declared column type
//! - Compile designer tables into keyed or list-form JSON documents
//! - Load protocol code definitions into one flat catalog of constants
//! - Emit the catalog as constant declarations for Java, C#, Godot and Lua

pub mod compiler;
pub mod emitter;
pub mod error;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod protocol;
pub mod scanner;
pub mod table;
pub mod value;

pub use compiler::{compile_keyed, compile_list, compile_tables, run_tables, TableMode, TableOptions, TableReport};
pub use emitter::{emit_catalog, render, run_protocols, ProtocolOptions, ProtocolReport, Target};
pub use error::{Error, Result};
pub use manifest::{BuildManifest, ProtocolJob, TableJob};
pub use output::JsonStyle;
pub use protocol::{load_catalog, DuplicatePolicy, ProtocolCatalog, ProtocolEntry};
pub use scanner::{discover_protocols, discover_tables, EmptyInputPolicy, FileOrder, TableSource};
pub use table::{Column, TableDocument, TableSchema};
pub use value::{coerce, BoolPolicy, CellValue, TypeTag};
