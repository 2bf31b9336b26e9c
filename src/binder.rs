//! Positional binding of record fields to prepared statements.
//!
//! Placeholder indices are 1-based and advance once per non-primary-key
//! field, walking the same ordered field map that `build_insert` walked, so
//! index i always lands on the i-th `?` of the generated statement.

use rusqlite::types::Value as SqlValue;
use rusqlite::Statement;
use tracing::debug;

use crate::error::{Error, Result};
use crate::field::{Field, FieldKind, FieldValue};
use crate::model::Fields;

/// Bound in place of an absent or mistyped integer field.
pub const ABSENT_INTEGER: i64 = -1;

/// Bound in place of an absent or mistyped float field.
pub const ABSENT_FLOAT: f64 = -1.0;

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_FLOAT_INTEGER: u64 = 1 << 53;

/// The value to bind for one field, or `None` for the primary key, which
/// takes no placeholder.
///
/// Numeric payloads are widened when no information is lost: an `Int32`
/// into an `Int64` field, an `Int64` that fits into an `Int32` field, and
/// exactly representable integers into a `Float` field. Anything else that
/// does not match the kind binds the same value as an absent one.
pub fn field_binding(name: &str, field: &Field) -> Option<SqlValue> {
    let value = field.value();
    let bound = match field.kind() {
        FieldKind::PrimaryKey => return None,
        FieldKind::Text => value.as_text().map(|s| SqlValue::Text(s.to_string())),
        FieldKind::Int64 => integer_payload(value).map(SqlValue::Integer),
        FieldKind::Int32 => integer_payload(value)
            .filter(|v| i32::try_from(*v).is_ok())
            .map(SqlValue::Integer),
        FieldKind::Float => float_payload(value).map(SqlValue::Real),
    };
    if bound.is_none() && !value.is_absent() {
        debug!(
            field = name,
            kind = field.kind().name(),
            "field value does not match its kind, binding the absent value"
        );
    }
    Some(bound.unwrap_or_else(|| absent_value(field.kind())))
}

fn absent_value(kind: FieldKind) -> SqlValue {
    match kind {
        FieldKind::Text | FieldKind::PrimaryKey => SqlValue::Null,
        FieldKind::Int64 | FieldKind::Int32 => SqlValue::Integer(ABSENT_INTEGER),
        FieldKind::Float => SqlValue::Real(ABSENT_FLOAT),
    }
}

fn integer_payload(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int64(v) => Some(*v),
        FieldValue::Int32(v) => Some(i64::from(*v)),
        _ => None,
    }
}

fn float_payload(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Float(v) => Some(*v),
        other => integer_payload(other)
            .filter(|v| v.unsigned_abs() <= MAX_EXACT_FLOAT_INTEGER)
            .map(|v| v as f64),
    }
}

/// Placeholder index and value for every bindable field, in declaration order.
pub fn bound_values(fields: &Fields) -> Vec<(usize, SqlValue)> {
    fields
        .iter()
        .filter_map(|(name, field)| field_binding(name, field))
        .enumerate()
        .map(|(position, value)| (position + 1, value))
        .collect()
}

/// Binds every non-primary-key field of `fields` to `statement` and returns
/// the number of placeholders filled.
pub fn bind_fields(statement: &mut Statement<'_>, fields: &Fields) -> Result<usize> {
    let values = bound_values(fields);
    for (index, value) in &values {
        statement
            .raw_bind_parameter(*index, value)
            .map_err(Error::Statement)?;
    }
    Ok(values.len())
}

/// Converts a comparison value for a `WHERE` placeholder. Absent binds NULL.
pub fn sql_value(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Absent => SqlValue::Null,
        FieldValue::Text(s) => SqlValue::Text(s.clone()),
        FieldValue::Int64(v) => SqlValue::Integer(*v),
        FieldValue::Int32(v) => SqlValue::Integer(i64::from(*v)),
        FieldValue::Float(v) => SqlValue::Real(*v),
    }
}

/// Binds a single value at a 1-based placeholder index.
pub fn bind_value(statement: &mut Statement<'_>, index: usize, value: &FieldValue) -> Result<()> {
    statement
        .raw_bind_parameter(index, sql_value(value))
        .map_err(Error::Statement)
}
