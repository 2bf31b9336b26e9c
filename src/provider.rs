//! Data access facade.
//!
//! Every call opens its own connection, does its work, and closes the
//! connection before returning. Nothing is shared between calls except the
//! database path. Failures come back as [`Error`] values and are logged where
//! they surface; no call panics on a backend error.

use std::io::Read;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::backend::{self, Session};
use crate::binder::{bind_fields, bind_value};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::model::Model;
use crate::resource::{load_script, read_script};
use crate::row::Row;
use crate::statement::{
    build_create_table, build_delete, build_insert, build_select_all, build_select_where,
    is_valid_identifier, OrderBy,
};

#[derive(Debug, Clone)]
pub struct SqlProvider {
    config: ProviderConfig,
}

impl SqlProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// A provider for the database at `path` with default settings.
    pub fn open_path(path: impl AsRef<Path>) -> Self {
        Self::new(ProviderConfig::new(path.as_ref()))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.db_path
    }

    fn session(&self) -> Result<Session> {
        Session::open(self.path(), self.config.busy_timeout())
    }

    fn logged<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(
                operation,
                path = %self.path().display(),
                error = %err,
                "database operation failed"
            );
        }
        result
    }

    /// Replaces any existing database file with a new, empty database.
    pub fn create_database(&self) -> Result<()> {
        let result = self.recreate();
        self.logged("create_database", result)
    }

    fn recreate(&self) -> Result<()> {
        if backend::database_exists(self.path()) {
            backend::delete_database(self.path())?;
        }
        Session::open_or_create(self.path(), self.config.busy_timeout())?;
        info!(path = %self.path().display(), "created database");
        Ok(())
    }

    pub fn database_exists(&self) -> bool {
        backend::database_exists(self.path())
    }

    /// Deletes the database file.
    pub fn destroy_data(&self) -> Result<()> {
        let result = backend::delete_database(self.path());
        if result.is_ok() {
            info!(path = %self.path().display(), "deleted database");
        }
        self.logged("destroy_data", result)
    }

    /// Creates the database if it is missing, then runs every configured
    /// schema script in order.
    pub fn bootstrap(&self) -> Result<()> {
        if !self.database_exists() {
            let created = Session::open_or_create(self.path(), self.config.busy_timeout());
            self.logged("bootstrap", created)?;
            info!(path = %self.path().display(), "created database");
        }
        for script in &self.config.schema_scripts {
            self.execute_schema_file(script)?;
        }
        Ok(())
    }

    /// Runs a schema script, which may hold several statements.
    pub fn execute_schema_script<R: Read>(&self, reader: R) -> Result<()> {
        let result = read_script(reader).and_then(|sql| self.run_script(&sql));
        self.logged("execute_schema_script", result)
    }

    pub fn execute_schema_file(&self, path: &Path) -> Result<()> {
        debug!(script = %path.display(), "running schema script");
        let result = load_script(path).and_then(|sql| self.run_script(&sql));
        self.logged("execute_schema_file", result)
    }

    fn run_script(&self, sql: &str) -> Result<()> {
        let session = self.session()?;
        session
            .connection()
            .execute_batch(sql)
            .map_err(Error::statement)
    }

    /// Executes one statement, discarding any rows it returns.
    pub fn execute_query(&self, sql: &str) -> Result<()> {
        let result = self
            .session()
            .and_then(|session| execute(session.connection(), sql));
        self.logged("execute_query", result)
    }

    /// Executes `queries` in one transaction. Either all of them take effect
    /// or none does.
    pub fn execute_queries<S: AsRef<str>>(&self, queries: &[S]) -> Result<()> {
        let result = self.session().and_then(|mut session| {
            session.transaction(|tx| {
                for sql in queries {
                    execute(tx, sql.as_ref())?;
                }
                Ok(())
            })
        });
        self.logged("execute_queries", result)
    }

    /// Creates the model's table if it does not exist yet.
    pub fn create_table<M: Model>(&self, model: &M) -> Result<()> {
        let result = check_model(model.table_name(), model).and_then(|()| {
            let sql = build_create_table(model.table_name(), model.fields());
            let session = self.session()?;
            execute(session.connection(), &sql)
        });
        self.logged("create_table", result)
    }

    /// Inserts `model` into `table` and returns the row id SQLite assigned.
    ///
    /// `table` must be the model's own table; a mismatch fails before the
    /// database is touched.
    pub fn insert<M: Model>(&self, table: &str, model: &M) -> Result<i64> {
        let result = check_model(table, model).and_then(|()| {
            let sql = build_insert(table, model.fields());
            let session = self.session()?;
            let conn = session.connection();

            let mut statement = conn.prepare(&sql).map_err(Error::Statement)?;
            let bound = bind_fields(&mut statement, model.fields())?;
            debug!(sql = %sql, bound, "executing insert");
            statement.raw_execute().map_err(Error::statement)?;

            // Same connection as the insert, so this is our row.
            Ok(conn.last_insert_rowid())
        });
        self.logged("insert", result)
    }

    /// Inserts each model in turn and returns their row ids. Stops at the
    /// first failure and reports which record failed; records before it stay
    /// written.
    pub fn insert_many<M: Model>(&self, table: &str, models: &[M]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            match self.insert(table, model) {
                Ok(id) => ids.push(id),
                Err(source) => {
                    return Err(Error::BatchInsert {
                        index,
                        source: Box::new(source),
                    })
                }
            }
        }
        Ok(ids)
    }

    /// Deletes the rows of `table` where `column` equals `value` and returns
    /// how many were removed. An absent value matches NULL.
    pub fn delete_where(
        &self,
        table: &str,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<usize> {
        let value = value.into();
        let result = check_identifiers(&[table, column]).and_then(|()| {
            let sql = build_delete(table, column);
            let session = self.session()?;
            let mut statement = session
                .connection()
                .prepare(&sql)
                .map_err(Error::Statement)?;
            bind_value(&mut statement, 1, &value)?;
            debug!(sql = %sql, "executing delete");
            statement.raw_execute().map_err(Error::statement)
        });
        self.logged("delete_where", result)
    }

    /// Every row of `table`, optionally ordered.
    pub fn select_all(&self, table: &str, order_by: Option<&OrderBy>) -> Result<Vec<Row>> {
        let mut names = vec![table];
        if let Some(order) = order_by {
            names.push(&order.column);
        }
        let result = check_identifiers(&names).and_then(|()| {
            let sql = build_select_all(table, order_by);
            let session = self.session()?;
            let rows = query_rows(session.connection(), &sql, None)?;
            Ok(rows)
        });
        self.logged("select_all", result)
    }

    /// Rows of `table` where `column` equals `value`. An absent value
    /// matches NULL.
    pub fn select_where(
        &self,
        table: &str,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Vec<Row>> {
        let value = value.into();
        let result = check_identifiers(&[table, column]).and_then(|()| {
            let sql = build_select_where(table, column);
            let session = self.session()?;
            let rows = query_rows(session.connection(), &sql, Some(&value))?;
            Ok(rows)
        });
        self.logged("select_where", result)
    }

    /// Runs caller-written `SELECT` text as-is.
    pub fn select_query(&self, sql: &str) -> Result<Vec<Row>> {
        let result = self
            .session()
            .and_then(|session| query_rows(session.connection(), sql, None));
        self.logged("select_query", result)
    }

    /// Every row of `M`'s table, loaded into fresh models.
    pub fn find_all<M: Model + Default>(&self, order_by: Option<&OrderBy>) -> Result<Vec<M>> {
        let table = M::default().table_name().to_string();
        self.select_all(&table, order_by)?
            .iter()
            .map(load_model::<M>)
            .collect()
    }

    pub fn find_where<M: Model + Default>(
        &self,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Vec<M>> {
        let table = M::default().table_name().to_string();
        self.select_where(&table, column, value)?
            .iter()
            .map(load_model::<M>)
            .collect()
    }
}

fn load_model<M: Model + Default>(row: &Row) -> Result<M> {
    let mut model = M::default();
    model.populate(row)?;
    Ok(model)
}

fn check_model<M: Model>(table: &str, model: &M) -> Result<()> {
    if table != model.table_name() {
        return Err(Error::SchemaMismatch {
            expected: model.table_name().to_string(),
            actual: table.to_string(),
        });
    }
    check_identifiers(&[table])?;
    for name in model.fields().names() {
        check_identifiers(&[name])?;
    }
    Ok(())
}

fn check_identifiers(names: &[&str]) -> Result<()> {
    match names.iter().find(|name| !is_valid_identifier(name)) {
        Some(name) => Err(Error::InvalidIdentifier(name.to_string())),
        None => Ok(()),
    }
}

/// Runs one statement of any kind. Rows it produces, such as the answer to
/// a `PRAGMA`, are stepped through and discarded.
fn execute(conn: &Connection, sql: &str) -> Result<()> {
    debug!(sql, "executing statement");
    let mut statement = conn.prepare(sql).map_err(Error::Statement)?;
    let mut rows = statement.raw_query();
    while rows.next().map_err(Error::statement)?.is_some() {}
    Ok(())
}

/// Steps through the result set until it is exhausted, collecting each row.
fn query_rows(conn: &Connection, sql: &str, param: Option<&FieldValue>) -> Result<Vec<Row>> {
    debug!(sql, "executing query");
    let mut statement = conn.prepare(sql).map_err(Error::Statement)?;
    if let Some(value) = param {
        bind_value(&mut statement, 1, value)?;
    }
    let columns: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = statement.raw_query();
    let mut results = Vec::new();
    while let Some(row) = rows.next().map_err(Error::Statement)? {
        results.push(Row::from_sqlite(row, &columns).map_err(Error::Statement)?);
    }
    Ok(results)
}
