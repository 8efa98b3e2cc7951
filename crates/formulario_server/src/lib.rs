//! Formulario server: configuration, the GraphQL schema and the axum router.
//!
//! The binary in `main.rs` wires the Postgres stores into a
//! `FormularioService`; tests wire the in-memory ones instead.

pub mod config;
pub mod graphql;
pub mod router;

pub use config::{ServerConfig, ServerConfigError};
pub use graphql::{build_schema, FormularioSchema};
pub use router::build_router;
