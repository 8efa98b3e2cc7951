//! Server configuration from the environment.
//!
//!   PORT        listen port (default 3000)
//!   BIND_HOST   listen address (default 0.0.0.0)
//!   STATIC_DIR  browser assets (default: this crate's `static/`)
//!
//! Database and table variables are read by `formulario_postgres::config`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use formulario_postgres::{ConfigError, DatabaseConfig, TableConfig, PRIMARY_ENV, REFERENCE_ENV};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error(transparent)]
    Database(#[from] ConfigError),
    #[error("PORT must be a port number, got '{0}'")]
    Port(String),
    #[error("BIND_HOST must be an IP address, got '{0}'")]
    BindHost(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    pub primary: DatabaseConfig,
    pub reference: DatabaseConfig,
    pub tables: TableConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ServerConfigError::Port(raw))?,
            None => 3000,
        };
        let host = match var("BIND_HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| ServerConfigError::BindHost(raw))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let static_dir = var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")));

        Ok(Self {
            bind: SocketAddr::new(host, port),
            static_dir,
            primary: DatabaseConfig::from_lookup(PRIMARY_ENV, &lookup)?,
            reference: DatabaseConfig::from_lookup(REFERENCE_ENV, &lookup)?,
            tables: TableConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, ServerConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ServerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_listen_on_3000_and_serve_crate_static() {
        let config = config(&[("DATABASE_URL", "postgres://u@localhost/db")]).unwrap();
        assert_eq!(config.bind.port(), 3000);
        assert!(config.bind.ip().is_unspecified());
        assert!(config.static_dir.ends_with("static"));
    }

    #[test]
    fn port_and_host_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://u@localhost/db"),
            ("PORT", "8080"),
            ("BIND_HOST", "127.0.0.1"),
        ])
        .unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ServerConfigError::Port(p) if p == "http"));
    }
}
