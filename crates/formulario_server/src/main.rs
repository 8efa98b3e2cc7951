//! formulario-server: GraphQL API and grid UI for the shift log.
//!
//! Configuration comes from the environment (a `.env` file is honored);
//! see `config.rs` and `formulario_postgres::config` for the variables.

use std::sync::Arc;

use formulario_core::FormularioService;
use formulario_postgres::config::ping;
use formulario_postgres::{PgFormularioStore, PgReferenceStore};
use formulario_server::{build_router, build_schema, ServerConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,formulario_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let primary = config.primary.connect_lazy();
    let reference = config.reference.connect_lazy();
    ping(config.primary.label, &primary).await;
    ping(config.reference.label, &reference).await;

    let records = PgFormularioStore::with_table(primary, config.tables.formularios.clone());
    let lookups = PgReferenceStore::with_tables(
        reference,
        config.tables.work_orders.clone(),
        config.tables.machines.clone(),
    );
    tracing::info!(
        formularios = %config.tables.formularios,
        work_orders = %config.tables.work_orders,
        machines = %config.tables.machines,
        "tables configured"
    );

    let service = Arc::new(FormularioService::new(Arc::new(records), Arc::new(lookups)));
    let app = build_router(build_schema(service), &config.static_dir);
    tracing::info!("Serving static files from: {}", config.static_dir.display());

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", config.bind, e);
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Port {} is already in use", config.bind.port());
            }
            return Err(e.into());
        }
    };
    tracing::info!("formulario-server listening on http://{}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
