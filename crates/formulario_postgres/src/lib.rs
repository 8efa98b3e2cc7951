//! Formulario PostgreSQL adapter.
//!
//! Implements the `formulario_core` ports with sqlx against two pools: the
//! primary database with the shift log, and the reference database with
//! work orders and machines. Statements are built at runtime because table
//! names are configurable.

pub mod config;
pub mod records;
pub mod reference;
mod rows;
mod sql;
pub mod tables;

pub use config::{ConfigError, DatabaseConfig, TableConfig, PRIMARY_ENV, REFERENCE_ENV};
pub use records::PgFormularioStore;
pub use reference::PgReferenceStore;
pub use tables::TableRef;
