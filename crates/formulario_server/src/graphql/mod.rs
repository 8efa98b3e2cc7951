//! GraphQL schema, resolvers and the axum handler that executes them.

mod errors;
mod mutation;
mod query;
pub mod scalars;
pub mod types;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};
use axum::extract::State;
use axum::Json;
use formulario_core::FormularioService;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type FormularioSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(service: Arc<FormularioService>) -> FormularioSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(10)
        .data(service)
        .finish()
}

/// GraphQL POST handler.
pub async fn graphql_handler(
    State(schema): State<FormularioSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}
