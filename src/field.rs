//! Typed value slots that make up a record schema.

/// Storage kind of a field. Fixed when the field is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Int64,
    /// Auto-assigned row identifier; written as `null`, never bound.
    PrimaryKey,
    Int32,
    Float,
}

impl FieldKind {
    /// SQLite column type used when generating `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Int64 | FieldKind::Int32 => "INTEGER",
            FieldKind::PrimaryKey => "INTEGER PRIMARY KEY AUTOINCREMENT",
            FieldKind::Float => "REAL",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Int64 => "64-bit integer",
            FieldKind::PrimaryKey => "primary key",
            FieldKind::Int32 => "32-bit integer",
            FieldKind::Float => "float",
        }
    }
}

/// Payload of a field slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Absent,
    Text(String),
    Int64(i64),
    Int32(i32),
    Float(f64),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int64(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int32(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A named column slot owned by a record schema. The kind never changes
/// after construction; only the value does.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    kind: FieldKind,
    value: FieldValue,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            value: FieldValue::Absent,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Stores `value` as-is. Whether it suits the kind is decided at bind time.
    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value = FieldValue::Absent;
    }
}
