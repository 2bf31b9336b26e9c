//! SQL text generation for single-table statements.
//!
//! Builders are pure. Values never appear in the generated text: every value
//! position is a `?` placeholder filled by [`crate::binder`], except the
//! primary key of an insert, which is the literal `null` so SQLite assigns it.
//! Identifiers cannot be parameterized. They are double-quoted so keywords
//! such as `group` or `order` work as names, and callers validate
//! caller-supplied names with [`is_valid_identifier`] first.
//!
//! Comparisons use `IS` rather than `=`: it matches like `=` for non-null
//! values and also matches NULL when the bound value is absent.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::field::FieldKind;
use crate::model::Fields;

const SEPARATOR: &str = ", ";

/// Sort direction of an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(Error::InvalidDirection(s.to_string()))
        }
    }
}

/// Column and direction for `SELECT * ... ORDER BY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Desc)
    }

    /// Builds an ordering from a column and an `"ASC"`/`"DESC"` string.
    pub fn parse(column: impl Into<String>, direction: &str) -> Result<Self, Error> {
        Ok(Self::new(column, direction.parse()?))
    }
}

/// `true` for plain SQL identifiers: an ASCII letter or underscore followed
/// by ASCII letters, digits, or underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Wraps `name` in double quotes, doubling any quote inside it.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `INSERT INTO <table> (<columns>) VALUES (<slots>)`.
///
/// Both lists walk `fields` in declaration order, so the slot at position i
/// belongs to the column at position i.
pub fn build_insert(table: &str, fields: &Fields) -> String {
    let mut sql = String::from("INSERT INTO ");
    sql.push_str(&quote_identifier(table));
    sql.push_str(" (");

    for name in fields.names() {
        sql.push_str(&quote_identifier(name));
        sql.push_str(SEPARATOR);
    }
    trim_separator(&mut sql);

    sql.push_str(") VALUES (");

    for (_, field) in fields.iter() {
        if field.kind() == FieldKind::PrimaryKey {
            sql.push_str("null");
        } else {
            sql.push('?');
        }
        sql.push_str(SEPARATOR);
    }
    trim_separator(&mut sql);

    sql.push(')');
    sql
}

/// `SELECT * FROM <table>`, with ` ORDER BY <column> <ASC|DESC>` when an
/// ordering is given.
pub fn build_select_all(table: &str, order_by: Option<&OrderBy>) -> String {
    let mut sql = format!("SELECT * FROM {}", quote_identifier(table));
    if let Some(order) = order_by {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            quote_identifier(&order.column),
            order.direction
        ));
    }
    sql
}

/// `SELECT * FROM <table> WHERE <column> IS ?`
pub fn build_select_where(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} IS ?",
        quote_identifier(table),
        quote_identifier(column)
    )
}

/// `DELETE FROM <table> WHERE <column> IS ?`
pub fn build_delete(table: &str, column: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} IS ?",
        quote_identifier(table),
        quote_identifier(column)
    )
}

/// `CREATE TABLE IF NOT EXISTS` with one column per field, in declaration order.
pub fn build_create_table(table: &str, fields: &Fields) -> String {
    let columns = fields
        .iter()
        .map(|(name, field)| format!("{} {}", quote_identifier(name), field.kind().sql_type()))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({columns})",
        quote_identifier(table)
    )
}

fn trim_separator(sql: &mut String) {
    if sql.ends_with(SEPARATOR) {
        sql.truncate(sql.len() - SEPARATOR.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_fields() -> Fields {
        Fields::new()
            .with("name", FieldKind::Text)
            .with("age", FieldKind::Int32)
            .with("born", FieldKind::Int64)
            .with("height", FieldKind::Float)
    }

    fn split_insert(sql: &str) -> (Vec<String>, Vec<String>) {
        let (head, tail) = sql.split_once(") VALUES (").unwrap();
        let columns = head.split_once(" (").unwrap().1;
        let values = tail.strip_suffix(')').unwrap();
        let split = |s: &str| s.split(", ").map(str::to_string).collect::<Vec<_>>();
        (split(columns), split(values))
    }

    #[test]
    fn insert_emits_null_for_primary_key() {
        assert_eq!(
            build_insert("people", &person_fields()),
            r#"INSERT INTO "people" ("pid", "name", "age", "born", "height") VALUES (null, ?, ?, ?, ?)"#
        );
    }

    #[test]
    fn insert_placeholders_line_up_with_columns() {
        let fields = Fields::new()
            .with("z", FieldKind::Text)
            .with("a", FieldKind::Float)
            .with("m", FieldKind::Int64)
            .with("b", FieldKind::Int32)
            .with("y", FieldKind::Text);
        let (columns, values) = split_insert(&build_insert("t", &fields));

        assert_eq!(columns.len(), fields.len());
        assert_eq!(values.len(), fields.len());
        assert_eq!(values.iter().filter(|v| *v == "?").count(), fields.len() - 1);

        for (position, (name, field)) in fields.iter().enumerate() {
            assert_eq!(columns[position], quote_identifier(name));
            let expected = if field.kind() == FieldKind::PrimaryKey {
                "null"
            } else {
                "?"
            };
            assert_eq!(values[position], expected);
        }
    }

    #[test]
    fn insert_with_only_primary_key() {
        assert_eq!(
            build_insert("ids", &Fields::new()),
            r#"INSERT INTO "ids" ("pid") VALUES (null)"#
        );
    }

    #[test]
    fn select_all_without_ordering() {
        assert_eq!(build_select_all("people", None), r#"SELECT * FROM "people""#);
    }

    #[test]
    fn select_all_with_ordering() {
        assert_eq!(
            build_select_all("people", Some(&OrderBy::desc("age"))),
            r#"SELECT * FROM "people" ORDER BY "age" DESC"#
        );
        assert_eq!(
            build_select_all("people", Some(&OrderBy::asc("name"))),
            r#"SELECT * FROM "people" ORDER BY "name" ASC"#
        );
    }

    #[test]
    fn where_and_delete_are_parameterized() {
        assert_eq!(
            build_select_where("people", "name"),
            r#"SELECT * FROM "people" WHERE "name" IS ?"#
        );
        assert_eq!(
            build_delete("people", "pid"),
            r#"DELETE FROM "people" WHERE "pid" IS ?"#
        );
    }

    #[test]
    fn create_table_follows_declaration_order() {
        assert_eq!(
            build_create_table("people", &person_fields()),
            "CREATE TABLE IF NOT EXISTS \"people\" (\"pid\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"name\" TEXT, \"age\" INTEGER, \"born\" INTEGER, \"height\" REAL)"
        );
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(Error::InvalidDirection(_))
        ));
    }

    #[test]
    fn order_by_from_strings() {
        assert_eq!(OrderBy::parse("age", "desc").unwrap(), OrderBy::desc("age"));
        assert!(OrderBy::parse("age", "up").is_err());
    }

    #[test]
    fn keywords_and_quotes_are_quoted() {
        assert_eq!(quote_identifier("group"), r#""group""#);
        assert_eq!(quote_identifier(r#"a"b"#), r#""a""b""#);
        let fields = Fields::new().with("order", FieldKind::Int32);
        assert_eq!(
            build_insert("events", &fields),
            r#"INSERT INTO "events" ("pid", "order") VALUES (null, ?)"#
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("people"));
        assert!(is_valid_identifier("_tmp2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("name; DROP TABLE people"));
        assert!(!is_valid_identifier("a.b"));
    }
}
