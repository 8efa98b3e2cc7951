//! Router construction: the GraphQL endpoint plus the browser assets.

use std::path::Path;

use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::graphql::{graphql_handler, FormularioSchema};

/// `POST /graphql`; every other path is served from `static_dir`, falling
/// back to its `index.html`.
pub fn build_router(schema: FormularioSchema, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/graphql", post(graphql_handler))
        .fallback_service(assets)
        .with_state(schema)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
