//! Record schemas: an ordered set of typed fields bound to one table.
//!
//! Declaration order is the column order for every generated statement and
//! the placeholder order for binding, so the field set is kept in an
//! insertion-ordered map.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::field::{Field, FieldKind, FieldValue};
use crate::row::{Row, Value};

/// Name of the primary-key field present on every schema.
pub const PRIMARY_KEY_FIELD: &str = "pid";

/// Ordered mapping from column name to field. Always starts with the
/// primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    entries: IndexMap<String, Field>,
}

impl Fields {
    pub fn new() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(
            PRIMARY_KEY_FIELD.to_string(),
            Field::new(FieldKind::PrimaryKey),
        );
        Self { entries }
    }

    /// Appends a field. Re-declaring an existing name keeps the first
    /// declaration, so the primary key cannot be replaced or moved.
    pub fn with(mut self, name: &str, kind: FieldKind) -> Self {
        self.declare(name, kind);
        self
    }

    /// Adds a field and returns `true`, or returns `false` when `name` is
    /// already declared or `kind` is a second primary key.
    pub fn declare(&mut self, name: &str, kind: FieldKind) -> bool {
        if kind == FieldKind::PrimaryKey || self.entries.contains_key(name) {
            debug!(
                field = name,
                kind = kind.name(),
                "ignoring duplicate field declaration"
            );
            return false;
        }
        self.entries.insert(name.to_string(), Field::new(kind));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.entries.get_mut(name)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::new()
    }
}

/// A persistable record type. Implementors own their `Fields` and name the
/// table they map to; everything else is provided.
pub trait Model {
    fn table_name(&self) -> &str;

    fn fields(&self) -> &Fields;

    fn fields_mut(&mut self) -> &mut Fields;

    /// Row id assigned by the database, `None` until the record has been
    /// stored or loaded.
    fn primary_key(&self) -> Option<i64> {
        self.fields()
            .get(PRIMARY_KEY_FIELD)
            .and_then(|field| field.value().as_i64())
    }

    fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields().get(name).map(Field::value)
    }

    fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()>
    where
        Self: Sized,
    {
        match self.fields_mut().get_mut(name) {
            Some(field) => {
                field.set_value(value);
                Ok(())
            }
            None => Err(Error::UnknownField(name.to_string())),
        }
    }

    /// Copies matching columns of `row` into this record's fields, converting
    /// each stored value to the field's kind. Columns the model does not
    /// declare are ignored.
    fn populate(&mut self, row: &Row) -> Result<()> {
        for (column, stored) in row.iter() {
            if let Some(field) = self.fields_mut().get_mut(column) {
                let value = convert_stored(column, field.kind(), stored)?;
                field.set_value(value);
            }
        }
        Ok(())
    }
}

fn convert_stored(column: &str, kind: FieldKind, stored: &Value) -> Result<FieldValue> {
    let mismatch = || Error::ColumnType {
        column: column.to_string(),
        expected: kind.name(),
    };
    let value = match (kind, stored) {
        (_, Value::Null) => FieldValue::Absent,
        (FieldKind::Text, Value::Text(s)) => FieldValue::Text(s.clone()),
        (FieldKind::PrimaryKey | FieldKind::Int64, Value::Integer(v)) => FieldValue::Int64(*v),
        (FieldKind::Int32, Value::Integer(v)) => {
            FieldValue::Int32(i32::try_from(*v).map_err(|_| mismatch())?)
        }
        (FieldKind::Float, Value::Real(v)) => FieldValue::Float(*v),
        (FieldKind::Float, Value::Integer(v)) => FieldValue::Float(*v as f64),
        _ => return Err(mismatch()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        fields: Fields,
    }

    impl Person {
        fn new() -> Self {
            Self {
                fields: Fields::new()
                    .with("name", FieldKind::Text)
                    .with("age", FieldKind::Int32)
                    .with("height", FieldKind::Float),
            }
        }
    }

    impl Model for Person {
        fn table_name(&self) -> &str {
            "people"
        }

        fn fields(&self) -> &Fields {
            &self.fields
        }

        fn fields_mut(&mut self) -> &mut Fields {
            &mut self.fields
        }
    }

    #[test]
    fn primary_key_is_declared_first() {
        let person = Person::new();
        let names: Vec<_> = person.fields().names().collect();
        assert_eq!(names, ["pid", "name", "age", "height"]);
        assert_eq!(person.primary_key(), None);
    }

    #[test]
    fn primary_key_cannot_be_redeclared() {
        let fields = Fields::new()
            .with("name", FieldKind::Text)
            .with(PRIMARY_KEY_FIELD, FieldKind::Text)
            .with("pk2", FieldKind::PrimaryKey)
            .with("name", FieldKind::Int64);
        let kinds: Vec<_> = fields.iter().map(|(n, f)| (n, f.kind())).collect();
        assert_eq!(
            kinds,
            [("pid", FieldKind::PrimaryKey), ("name", FieldKind::Text)]
        );
    }

    #[test]
    fn declare_reports_ignored_fields() {
        let mut fields = Fields::new();
        assert!(fields.declare("name", FieldKind::Text));
        assert!(!fields.declare("name", FieldKind::Int64));
        assert!(!fields.declare("id", FieldKind::PrimaryKey));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("name").map(Field::kind), Some(FieldKind::Text));
    }

    #[test]
    fn set_value_rejects_unknown_field() {
        let mut person = Person::new();
        person.set_value("name", "Ada").unwrap();
        assert_eq!(person.value("name"), Some(&FieldValue::Text("Ada".into())));

        let err = person.set_value("email", "ada@example.com").unwrap_err();
        assert!(matches!(err, Error::UnknownField(name) if name == "email"));
    }

    #[test]
    fn populate_converts_stored_values() {
        let row = Row::new(
            vec![
                "pid".into(),
                "name".into(),
                "age".into(),
                "height".into(),
                "extra".into(),
            ],
            vec![
                Value::Integer(4),
                Value::Text("Grace".into()),
                Value::Integer(85),
                Value::Integer(2),
                Value::Text("ignored".into()),
            ],
        );
        let mut person = Person::new();
        person.populate(&row).unwrap();
        assert_eq!(person.primary_key(), Some(4));
        assert_eq!(person.value("age"), Some(&FieldValue::Int32(85)));
        assert_eq!(person.value("height"), Some(&FieldValue::Float(2.0)));
    }

    #[test]
    fn populate_rejects_lossy_values() {
        let row = Row::new(vec!["age".into()], vec![Value::Integer(i64::MAX)]);
        let err = Person::new().populate(&row).unwrap_err();
        assert!(matches!(err, Error::ColumnType { column, .. } if column == "age"));

        let row = Row::new(vec!["name".into()], vec![Value::Real(1.5)]);
        assert!(Person::new().populate(&row).is_err());
    }

    #[test]
    fn populate_maps_null_to_absent() {
        let mut person = Person::new();
        person.set_value("name", "Ada").unwrap();
        let row = Row::new(vec!["name".into()], vec![Value::Null]);
        person.populate(&row).unwrap();
        assert_eq!(person.value("name"), Some(&FieldValue::Absent));
    }
}
