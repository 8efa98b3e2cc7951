//! FormularioError → GraphQL error with an `extensions.code`.

use async_graphql::ErrorExtensions;
use formulario_core::FormularioError;
use tracing::error;

pub(crate) fn to_graphql(err: FormularioError) -> async_graphql::Error {
    let code = err.code();
    let message = match &err {
        FormularioError::Internal(inner) => {
            error!(error = ?inner, "request failed");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

pub(crate) trait GraphqlResultExt<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> GraphqlResultExt<T> for Result<T, FormularioError> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(to_graphql)
    }
}
