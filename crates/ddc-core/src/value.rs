//! Typed cell values and the coercion rules for declared column types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A declared column type from the type row of a keyed table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    /// Anything unrecognized, including an empty type cell
    Unknown,
}

impl TypeTag {
    /// Parse a type cell, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "int" => TypeTag::Int,
            "float" => TypeTag::Float,
            "string" => TypeTag::String,
            "bool" => TypeTag::Bool,
            "array" => TypeTag::Array,
            "object" => TypeTag::Object,
            _ => TypeTag::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `bool` cells are read
///
/// `Truthy` is the legacy behavior: any non-empty cell is true, so the text
/// `false` becomes `true`. `Strict` reads the usual spellings and yields null
/// for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolPolicy {
    #[default]
    Truthy,
    Strict,
}

/// A coerced cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Failed coercion or unknown column type
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl CellValue {
    /// Stringify a value for use as a record key
    ///
    /// Null maps to the empty string, which callers treat as "no key".
    /// Bools are capitalized the way the legacy tool wrote them.
    pub fn key_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::String(s) => s.clone(),
            other => Value::from(other.clone()).to_string(),
        }
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(b),
            CellValue::Integer(i) => Value::from(i),
            // Non-finite floats have no JSON form and become null
            CellValue::Float(f) => Value::from(f),
            CellValue::String(s) => Value::String(s),
            CellValue::Array(a) => Value::Array(a),
            CellValue::Object(o) => Value::Object(o),
        }
    }
}

/// Coerce a raw cell under its declared column type.
///
/// Never fails: anything that does not fit the declared type becomes
/// `CellValue::Null` so the rest of the row still compiles.
pub fn coerce(raw: &str, tag: TypeTag, bools: BoolPolicy) -> CellValue {
    match tag {
        TypeTag::Int => raw
            .trim()
            .parse::<i64>()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Null),
        TypeTag::Float => raw
            .trim()
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Null),
        TypeTag::String => CellValue::String(raw.to_string()),
        TypeTag::Bool => match bools {
            BoolPolicy::Truthy => CellValue::Bool(!raw.is_empty()),
            BoolPolicy::Strict => parse_strict_bool(raw),
        },
        TypeTag::Array => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => CellValue::Array(items),
            _ => CellValue::Null,
        },
        TypeTag::Object => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => CellValue::Object(fields),
            _ => CellValue::Null,
        },
        TypeTag::Unknown => CellValue::Null,
    }
}

fn parse_strict_bool(raw: &str) -> CellValue {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => CellValue::Bool(true),
        "false" | "0" | "no" | "n" | "off" | "" => CellValue::Bool(false),
        _ => CellValue::Null,
    }
}

/// Read a cell as a JSON literal, falling back to the raw text
///
/// Returns the parsed value untouched, so integers up to `u64::MAX` stay
/// exact.
pub fn infer(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy(raw: &str, tag: &str) -> CellValue {
        coerce(raw, TypeTag::parse(tag), BoolPolicy::Truthy)
    }

    #[test]
    fn test_type_tag_parse() {
        assert_eq!(TypeTag::parse("INT"), TypeTag::Int);
        assert_eq!(TypeTag::parse(" Float "), TypeTag::Float);
        assert_eq!(TypeTag::parse("Object"), TypeTag::Object);
        assert_eq!(TypeTag::parse(""), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("date"), TypeTag::Unknown);
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(legacy("42", "int"), CellValue::Integer(42));
        assert_eq!(legacy(" -7 ", "int"), CellValue::Integer(-7));
        assert_eq!(legacy("abc", "int"), CellValue::Null);
        assert_eq!(legacy("1.5", "int"), CellValue::Null);
        assert_eq!(legacy("", "int"), CellValue::Null);
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(legacy("3.5", "float"), CellValue::Float(3.5));
        assert_eq!(legacy("2", "float"), CellValue::Float(2.0));
        assert_eq!(legacy("x", "float"), CellValue::Null);
    }

    #[test]
    fn test_coerce_string_is_identity() {
        assert_eq!(
            legacy(" padded ", "string"),
            CellValue::String(" padded ".to_string())
        );
        assert_eq!(legacy("", "string"), CellValue::String(String::new()));
    }

    #[test]
    fn test_coerce_bool_truthiness_quirk() {
        assert_eq!(legacy("anything-nonempty", "bool"), CellValue::Bool(true));
        assert_eq!(legacy("false", "bool"), CellValue::Bool(true));
        assert_eq!(legacy("0", "bool"), CellValue::Bool(true));
        assert_eq!(legacy("", "bool"), CellValue::Bool(false));
    }

    #[test]
    fn test_coerce_bool_strict() {
        let strict = |raw| coerce(raw, TypeTag::Bool, BoolPolicy::Strict);
        assert_eq!(strict("false"), CellValue::Bool(false));
        assert_eq!(strict("TRUE"), CellValue::Bool(true));
        assert_eq!(strict("0"), CellValue::Bool(false));
        assert_eq!(strict(""), CellValue::Bool(false));
        assert_eq!(strict("maybe"), CellValue::Null);
    }

    #[test]
    fn test_coerce_array() {
        assert_eq!(
            legacy("[1,2,3]", "array"),
            CellValue::Array(vec![json!(1), json!(2), json!(3)])
        );
        assert_eq!(legacy("{\"a\":1}", "array"), CellValue::Null);
        assert_eq!(legacy("not json", "array"), CellValue::Null);
    }

    #[test]
    fn test_coerce_object() {
        let value = legacy("{\"a\":1}", "object");
        assert_eq!(Value::from(value), json!({"a": 1}));
        assert_eq!(legacy("[1]", "object"), CellValue::Null);
    }

    #[test]
    fn test_coerce_unknown_is_null() {
        assert_eq!(legacy("42", ""), CellValue::Null);
        assert_eq!(legacy("42", "date"), CellValue::Null);
    }

    #[test]
    fn test_key_string() {
        assert_eq!(CellValue::Integer(7).key_string(), "7");
        assert_eq!(CellValue::Float(1.0).key_string(), "1.0");
        assert_eq!(CellValue::String("sword".into()).key_string(), "sword");
        assert_eq!(CellValue::Bool(true).key_string(), "True");
        assert_eq!(CellValue::Bool(false).key_string(), "False");
        assert_eq!(
            CellValue::Array(vec![json!(1), json!(2)]).key_string(),
            "[1,2]"
        );
        assert_eq!(CellValue::Null.key_string(), "");
    }

    #[test]
    fn test_infer_literals() {
        assert_eq!(infer("42"), json!(42));
        assert_eq!(infer("hello"), json!("hello"));
        assert_eq!(infer("true"), json!(true));
        assert_eq!(infer("\"quoted\""), json!("quoted"));
        assert_eq!(infer("null"), Value::Null);
        assert_eq!(infer(""), json!(""));
        assert_eq!(infer("[1, {\"a\": 2}]"), json!([1, {"a": 2}]));
    }

    #[test]
    fn test_infer_keeps_large_integers_exact() {
        assert_eq!(infer("18446744073709551615"), json!(18446744073709551615u64));
        assert_eq!(
            infer("18446744073709551615").to_string(),
            "18446744073709551615"
        );
        assert_eq!(infer("-9223372036854775808"), json!(i64::MIN));
    }

    #[test]
    fn test_non_finite_float_serializes_as_null() {
        assert_eq!(Value::from(CellValue::Float(f64::NAN)), Value::Null);
    }
}
