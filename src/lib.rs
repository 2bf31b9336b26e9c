//! Typed record schemas mapped onto SQLite statements.
//!
//! # Intention
//!
//! - Declare a record's typed fields once and derive `INSERT`, `SELECT` and
//!   `DELETE` statements from that declaration.
//! - Keep column order, placeholder order, and bind order identical by
//!   walking one ordered field map everywhere.
//! - Never splice values into SQL text; every value goes through a bound
//!   placeholder.
//!
//! # Architectural Boundaries
//!
//! - Only single-table statements; no joins, migrations, or query DSL.
//! - SQLite (through `rusqlite`) is the storage backend; each facade call
//!   uses its own connection.
//!
//! ```no_run
//! use sqlite_orm::{FieldKind, Fields, Model, SqlProvider};
//!
//! struct Person {
//!     fields: Fields,
//! }
//!
//! impl Default for Person {
//!     fn default() -> Self {
//!         Self {
//!             fields: Fields::new()
//!                 .with("name", FieldKind::Text)
//!                 .with("age", FieldKind::Int32),
//!         }
//!     }
//! }
//!
//! impl Model for Person {
//!     fn table_name(&self) -> &str {
//!         "people"
//!     }
//!     fn fields(&self) -> &Fields {
//!         &self.fields
//!     }
//!     fn fields_mut(&mut self) -> &mut Fields {
//!         &mut self.fields
//!     }
//! }
//!
//! # fn main() -> sqlite_orm::Result<()> {
//! let provider = SqlProvider::open_path("app.db");
//! provider.create_database()?;
//!
//! let mut ada = Person::default();
//! ada.set_value("name", "Ada")?;
//! ada.set_value("age", 36)?;
//! provider.create_table(&ada)?;
//! let id = provider.insert("people", &ada)?;
//!
//! let people: Vec<Person> = provider.find_where("pid", id)?;
//! assert_eq!(people.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod binder;
pub mod config;
pub mod error;
pub mod field;
pub mod model;
pub mod provider;
pub mod resource;
pub mod row;
pub mod statement;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use field::{Field, FieldKind, FieldValue};
pub use model::{Fields, Model, PRIMARY_KEY_FIELD};
pub use provider::SqlProvider;
pub use row::{Row, Value};
pub use statement::{Direction, OrderBy};
