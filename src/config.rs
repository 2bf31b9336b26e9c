use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of a [`crate::SqlProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Scripts run in order by `SqlProvider::bootstrap`
    #[serde(default)]
    pub schema_scripts: Vec<PathBuf>,
    /// How long a connection waits on a locked database before failing
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl ProviderConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            schema_scripts: Vec::new(),
            busy_timeout_ms: None,
        }
    }

    pub fn with_schema_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_scripts.push(path.into());
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = ProviderConfig::new("/tmp/app.db")
            .with_schema_script("schema/users.sql")
            .with_busy_timeout(Duration::from_secs(2));
        assert_eq!(config.db_path, PathBuf::from("/tmp/app.db"));
        assert_eq!(config.schema_scripts, [PathBuf::from("schema/users.sql")]);
        assert_eq!(config.busy_timeout(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ProviderConfig = serde_json::from_str(r#"{"db_path": "app.db"}"#).unwrap();
        assert_eq!(config, ProviderConfig::new("app.db"));

        let config: ProviderConfig = serde_json::from_str(
            r#"{"db_path": "app.db", "schema_scripts": ["a.sql", "b.sql"], "busy_timeout_ms": 250}"#,
        )
        .unwrap();
        assert_eq!(config.schema_scripts.len(), 2);
        assert_eq!(config.busy_timeout(), Some(Duration::from_millis(250)));
    }
}
