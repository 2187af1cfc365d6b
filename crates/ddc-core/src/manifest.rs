//! Build manifests: a JSON file listing table and protocol jobs to run together

use crate::compiler::{TableMode, TableOptions};
use crate::emitter::ProtocolOptions;
use crate::error::{Error, Result};
use crate::output::write_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One table compilation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub options: TableOptions,
}

/// One protocol compilation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub options: ProtocolOptions,
}

/// A manifest file; jobs run in the order listed, tables first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub tables: Vec<TableJob>,
    #[serde(default)]
    pub protocols: Vec<ProtocolJob>,
}

impl BuildManifest {
    /// Load a manifest from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the manifest to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_file(path.as_ref(), content.as_bytes())
    }

    /// A starting point with one job of each kind
    pub fn template() -> Self {
        Self {
            tables: vec![
                TableJob {
                    input_dir: PathBuf::from("design/tables"),
                    output_dir: PathBuf::from("build/tables"),
                    options: TableOptions::default(),
                },
                TableJob {
                    input_dir: PathBuf::from("design/lists"),
                    output_dir: PathBuf::from("build/lists"),
                    options: TableOptions {
                        mode: TableMode::List,
                        ..TableOptions::default()
                    },
                },
            ],
            protocols: vec![ProtocolJob {
                input_dir: PathBuf::from("design/protocols"),
                output_dir: PathBuf::from("build/protocols"),
                options: ProtocolOptions::default(),
            }],
        }
    }

    pub fn job_count(&self) -> usize {
        self.tables.len() + self.protocols.len()
    }
}
