//! Connection configuration for the two databases.
//!
//! The primary database holds the shift log; the reference database holds
//! work orders and machines. Each one is configured either by a URL or by
//! discrete host/port/user/password/database variables.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::tables::{InvalidTableName, TableRef};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid connection URL: {source}")]
    Url {
        var: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("{var} must be a port number, got '{value}'")]
    Port { var: &'static str, value: String },
    #[error(transparent)]
    Table(#[from] InvalidTableName),
}

/// Names of the environment variables describing one database.
#[derive(Debug, Clone, Copy)]
pub struct DbEnv {
    pub label: &'static str,
    pub url: &'static str,
    pub host: &'static str,
    pub port: &'static str,
    pub user: &'static str,
    pub password: &'static str,
    pub database: &'static str,
}

pub const PRIMARY_ENV: DbEnv = DbEnv {
    label: "primary",
    url: "DATABASE_URL",
    host: "PGHOST",
    port: "PGPORT",
    user: "PGUSER",
    password: "PGPASSWORD",
    database: "PGDATABASE",
};

pub const REFERENCE_ENV: DbEnv = DbEnv {
    label: "reference",
    url: "REFERENCE_DATABASE_URL",
    host: "PG2HOST",
    port: "PG2PORT",
    user: "PG2USER",
    password: "PG2PASSWORD",
    database: "PG2DATABASE",
};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub label: &'static str,
    pub connect: PgConnectOptions,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl DatabaseConfig {
    pub fn from_env(names: DbEnv) -> Result<Self, ConfigError> {
        Self::from_lookup(names, |key| std::env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(
        names: DbEnv,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let connect = match var(names.url) {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|source| ConfigError::Url {
                var: names.url,
                source,
            })?,
            None => {
                let mut options = PgConnectOptions::new_without_pgpass();
                if let Some(host) = var(names.host) {
                    options = options.host(&host);
                }
                if let Some(port) = var(names.port) {
                    let port = port.parse::<u16>().map_err(|_| ConfigError::Port {
                        var: names.port,
                        value: port.clone(),
                    })?;
                    options = options.port(port);
                }
                if let Some(user) = var(names.user) {
                    options = options.username(&user);
                }
                if let Some(password) = var(names.password) {
                    options = options.password(&password);
                }
                if let Some(database) = var(names.database) {
                    options = options.database(&database);
                }
                options
            }
        };

        Ok(Self {
            label: names.label,
            connect,
            max_connections: var("DATABASE_POOL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            connection_timeout: Duration::from_secs(
                var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        })
    }

    /// `user@host:port/database`, never the password.
    pub fn describe(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.connect.get_username(),
            self.connect.get_host(),
            self.connect.get_port(),
            self.connect.get_database().unwrap_or("-"),
        )
    }

    /// Pool that connects on first use, so the server can start while a
    /// database is still unreachable.
    pub fn connect_lazy(&self) -> PgPool {
        info!(db = self.label, target = %self.describe(), "configuring connection pool");
        let mut pool_options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connection_timeout);
        if let Some(idle_timeout) = self.idle_timeout {
            pool_options = pool_options.idle_timeout(idle_timeout);
        }
        if let Some(max_lifetime) = self.max_lifetime {
            pool_options = pool_options.max_lifetime(max_lifetime);
        }
        pool_options.connect_lazy_with(self.connect.clone())
    }
}

/// Configured table names, overridable per deployment.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub formularios: TableRef,
    pub work_orders: TableRef,
    pub machines: TableRef,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            formularios: TableRef::formularios(),
            work_orders: TableRef::work_orders(),
            machines: TableRef::machines(),
        }
    }
}

impl TableConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table = |key: &str, default: TableRef| -> Result<TableRef, ConfigError> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(raw) => Ok(TableRef::parse(&raw)?),
                None => Ok(default),
            }
        };
        Ok(Self {
            formularios: table("FORMULARIO_TABLE", TableRef::formularios())?,
            work_orders: table("REFERENCE_OP_TABLE", TableRef::work_orders())?,
            machines: table("MAQUINA_TABLE", TableRef::machines())?,
        })
    }
}

/// Test database connectivity. Logs and returns false instead of failing.
pub async fn ping(label: &str, pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => {
            info!(db = label, "database reachable");
            true
        }
        Err(e) => {
            warn!(db = label, error = %e, "database unreachable at startup");
            false
        }
    }
}
