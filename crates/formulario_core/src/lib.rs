//! Formulario core: shift-log records, their validation rules and the
//! storage ports the adapters implement.
//!
//! Nothing in this crate talks to a database. `formulario_postgres` provides
//! the sqlx adapters; the `test-support` feature exposes in-memory ones.

pub mod error;
pub mod interval;
pub mod options;
pub mod patch;
pub mod ports;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use error::FormularioError;
pub use interval::{Interval, IntervalError};
pub use patch::{Change, ChangeSet, ColumnCast, Field, FieldValue, FormularioPatch};
pub use ports::{FormularioStore, ReferenceStore};
pub use service::FormularioService;
pub use types::{DateRange, Formulario, FormularioPage, ListFilter, Pagination, RefRow};
