//! Directory scanner for discovering table and protocol source files

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Order in which discovered files are compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrder {
    /// Whatever order the platform lists the directory in
    #[default]
    Listing,
    /// Sorted by file name, reproducible across platforms
    Name,
}

/// What to do when discovery finds no source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyInputPolicy {
    /// Report `Error::NoInputFiles`
    #[default]
    Fail,
    /// Treat an empty directory as nothing to do
    Allow,
}

/// A designer table file and the output name derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    /// Full path to the file
    pub path: PathBuf,
    /// Output document name without extension (e.g. "Item" for "物品信息@Item.csv")
    pub name: String,
}

/// List the regular files directly inside `dir` that satisfy `filter`
pub fn discover<F>(dir: &Path, order: FileOrder, filter: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    if order == FileOrder::Name {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && filter(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Apply the empty-input policy to a discovery result
pub fn require_files(dir: &Path, files: &[PathBuf], policy: EmptyInputPolicy) -> Result<()> {
    if files.is_empty() && policy == EmptyInputPolicy::Fail {
        return Err(Error::NoInputFiles(dir.to_path_buf()));
    }
    Ok(())
}

/// Find designer tables whose file name carries the output-name delimiter
pub fn discover_tables(
    dir: &Path,
    name_delimiter: &str,
    order: FileOrder,
) -> Result<Vec<TableSource>> {
    let files = discover(dir, order, |p| has_extension(p, "csv"))?;

    Ok(files
        .into_iter()
        .filter_map(|path| {
            let file_name = path.file_name()?.to_str()?;
            let name = derive_table_name(file_name, name_delimiter)?;
            Some(TableSource { path, name })
        })
        .collect())
}

/// Find protocol definition files
pub fn discover_protocols(dir: &Path, order: FileOrder) -> Result<Vec<PathBuf>> {
    discover(dir, order, |p| has_extension(p, "json"))
}

/// Extract the output name from a table file name
///
/// Examples:
/// - "物品信息@Item.csv" with "@" -> Some("Item")
/// - "Item.csv" with "@" -> None (no delimiter)
/// - "物品信息@.csv" with "@" -> None (nothing after the delimiter)
pub fn derive_table_name(file_name: &str, delimiter: &str) -> Option<String> {
    if delimiter.is_empty() {
        return None;
    }
    let (_, tail) = file_name.split_once(delimiter)?;
    let name = strip_suffix_ignore_case(tail, ".csv");
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

pub(crate) fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> &'a str {
    if s.len() >= suffix.len()
        && s.is_char_boundary(s.len() - suffix.len())
        && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        &s[..s.len() - suffix.len()]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_derive_table_name() {
        assert_eq!(derive_table_name("物品信息@Item.csv", "@"), Some("Item".to_string()));
        assert_eq!(derive_table_name("Skill#Skill.CSV", "#"), Some("Skill".to_string()));
        assert_eq!(derive_table_name("a@b@c.csv", "@"), Some("b@c".to_string()));
    }

    #[test]
    fn test_derive_table_name_without_delimiter() {
        assert_eq!(derive_table_name("Item.csv", "@"), None);
        assert_eq!(derive_table_name("物品信息@.csv", "@"), None);
        assert_eq!(derive_table_name("Item@x.csv", ""), None);
    }

    #[test]
    fn test_discover_tables_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b@Beta.csv"), "").unwrap();
        fs::write(dir.path().join("a@Alpha.csv"), "").unwrap();
        fs::write(dir.path().join("plain.csv"), "").unwrap();
        fs::write(dir.path().join("notes@x.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub@dir.csv")).unwrap();

        let tables = discover_tables(dir.path(), "@", FileOrder::Name).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_discover_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("chat.json"), "{}").unwrap();
        fs::write(dir.path().join("login.json"), "{}").unwrap();

        let files = discover_protocols(dir.path(), FileOrder::Name).unwrap();
        assert_eq!(files, vec![dir.path().join("login.json")]);
    }

    #[test]
    fn test_require_files_policy() {
        let dir = Path::new("defs");
        assert!(matches!(
            require_files(dir, &[], EmptyInputPolicy::Fail),
            Err(Error::NoInputFiles(_))
        ));
        assert!(require_files(dir, &[], EmptyInputPolicy::Allow).is_ok());
    }
}
