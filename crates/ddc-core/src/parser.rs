//! CSV reading for designer tables

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::path::Path;

/// Resolve an encoding label such as `utf-8`, `gbk` or `shift_jis`
pub fn check_encoding(label: &str) -> Result<&'static Encoding> {
    let normalized = label.trim().to_lowercase();
    match normalized.as_str() {
        // Spellings the WHATWG label list does not carry
        "utf-8-sig" | "utf_8" | "utf8-sig" => Ok(UTF_8),
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| Error::UnsupportedEncoding(label.to_string())),
    }
}

/// Convert a delimiter character to the single byte the csv reader wants
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(Error::InvalidDelimiter(delimiter))
    }
}

/// Read a source file as text, stripping a leading byte order mark
pub fn read_text(path: &Path, encoding: &str) -> Result<String> {
    let encoding_impl = check_encoding(encoding)?;

    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let text = encoding_impl
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .ok_or_else(|| Error::Decode {
            path: path.to_path_buf(),
            encoding: encoding.to_string(),
        })?;

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    })
}

/// Cut the text at the first blank line that follows the header rows.
///
/// The csv reader silently skips empty lines, but for designer tables an
/// empty line marks the end of the data. Lines inside quoted fields are
/// never treated as blank. A quote only opens a quoted field as the first
/// character of a field; anywhere else it is literal text.
pub fn data_region(text: &str, header_rows: usize, delimiter: char) -> &str {
    let mut offset = 0;
    let mut in_quotes = false;
    let mut seen = 0;

    for line in text.split_inclusive('\n') {
        if !in_quotes {
            if line.trim_end_matches(['\n', '\r']).is_empty() {
                if seen >= header_rows {
                    return &text[..offset];
                }
            } else {
                seen += 1;
            }
        }

        let mut field_start = !in_quotes;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    // `""` is an escaped quote inside a quoted field
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
            } else if c == delimiter {
                field_start = true;
            } else {
                if c == '"' && field_start {
                    in_quotes = true;
                }
                field_start = false;
            }
        }
        offset += line.len();
    }

    text
}

/// Split CSV text into rows of cells.
///
/// Rows may have varying lengths; callers decide what a short row means.
pub fn read_rows(content: &str, delimiter: char, source: &Path) -> Result<Vec<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Allow varying number of fields
        .delimiter(delimiter_byte(delimiter)?)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: source.to_path_buf(),
            source: e,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

/// Read a table file into rows, ending at the first blank data line
pub fn read_table_rows(
    path: &Path,
    encoding: &str,
    delimiter: char,
    header_rows: usize,
) -> Result<Vec<Vec<String>>> {
    let text = read_text(path, encoding)?;
    read_rows(data_region(&text, header_rows, delimiter), delimiter, path)
}
