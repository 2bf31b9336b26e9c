//! Database file lifecycle and scoped connections.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, Transaction};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Files SQLite may keep next to the database in journal or WAL mode.
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// A connection held for the duration of one facade call. The connection is
/// closed when the session is dropped, whichever way the call exits.
pub struct Session {
    conn: Option<Connection>,
    path: PathBuf,
}

impl Session {
    /// Opens an existing database; fails with `DatabaseNotFound` otherwise.
    pub fn open(path: &Path, busy_timeout: Option<Duration>) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::connect(path, OpenFlags::SQLITE_OPEN_READ_WRITE, busy_timeout)
    }

    pub fn open_or_create(path: &Path, busy_timeout: Option<Duration>) -> Result<Self> {
        Self::connect(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            busy_timeout,
        )
    }

    fn connect(path: &Path, flags: OpenFlags, busy_timeout: Option<Duration>) -> Result<Self> {
        let flags = flags | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(Error::Connection)?;
        if let Some(timeout) = busy_timeout {
            conn.busy_timeout(timeout).map_err(Error::Connection)?;
        }
        debug!(path = %path.display(), "opened database connection");
        Ok(Self {
            conn: Some(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn connection(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("session connection is only taken on drop")
    }

    /// Runs `work` inside one transaction. Commits when it returns `Ok`,
    /// otherwise rolls back and returns the original error.
    pub fn transaction<T>(&mut self, work: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .as_mut()
            .expect("session connection is only taken on drop");
        let tx = conn.transaction().map_err(Error::Transaction)?;
        match work(&tx) {
            Ok(value) => {
                tx.commit().map_err(Error::Transaction)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!(path = %self.path.display(), error = %err, "failed to close database");
            }
        }
    }
}

pub fn database_exists(path: &Path) -> bool {
    path.is_file()
}

/// Removes the database file and any journal files beside it. Missing files
/// are not an error.
pub fn delete_database(path: &Path) -> Result<()> {
    remove_if_present(path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_present(Path::new(&sidecar))?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Io(err)),
    }
}
