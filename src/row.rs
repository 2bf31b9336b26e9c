//! Result rows returned by read operations.

use rusqlite::types::ValueRef;
use serde::Serialize;

/// A value as stored in a result column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            // TEXT that is not valid UTF-8 keeps its bytes.
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Value::Text(text.to_string()),
                Err(_) => Value::Blob(bytes.to_vec()),
            },
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

/// One row of a result set: column names and values in result-column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub(crate) fn from_sqlite(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Self> {
        let mut values = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            values.push(Value::from(row.get_ref(index)?));
        }
        Ok(Self::new(columns.to_vec(), values))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at a zero-based result position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(
            vec!["pid".into(), "name".into(), "score".into()],
            vec![Value::Integer(1), Value::Text("Ada".into()), Value::Null],
        )
    }

    #[test]
    fn lookup_by_name_and_position() {
        let row = sample();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("name").and_then(Value::as_str), Some("Ada"));
        assert_eq!(row.get_index(0).and_then(Value::as_i64), Some(1));
        assert!(row.get("score").is_some_and(Value::is_null));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn invalid_utf8_text_keeps_its_bytes() {
        assert_eq!(Value::from(ValueRef::Text(b"ok")), Value::Text("ok".into()));
        assert_eq!(
            Value::from(ValueRef::Text(&[0x61, 0xff])),
            Value::Blob(vec![0x61, 0xff])
        );
    }

    #[test]
    fn serializes_as_columns_and_plain_values() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "columns": ["pid", "name", "score"],
                "values": [1, "Ada", null],
            })
        );
    }
}
