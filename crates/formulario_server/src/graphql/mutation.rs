//! Mutation root.

use std::sync::Arc;

use async_graphql::{Context, Object, Result, ID};
use formulario_core::{FormularioPatch, FormularioService};

use super::errors::GraphqlResultExt;
use super::query::parse_id;
use super::types::{FormularioObject, FormularioPatchInput, UpdateInput};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Apply a partial update to one record and return the stored row.
    async fn update_formulario(
        &self,
        ctx: &Context<'_>,
        id: ID,
        patch: FormularioPatchInput,
    ) -> Result<FormularioObject> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        let id = parse_id(&id).gql()?;
        let row = service
            .update(id, &FormularioPatch::from(patch))
            .await
            .gql()?;
        Ok(row.into())
    }

    /// Apply several updates in one transaction. Nothing is written unless
    /// every update succeeds.
    async fn update_multiples_formularios(
        &self,
        ctx: &Context<'_>,
        updates: Vec<UpdateInput>,
    ) -> Result<bool> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        let mut batch = Vec::with_capacity(updates.len());
        for update in updates {
            batch.push((parse_id(&update.id).gql()?, FormularioPatch::from(update.patch)));
        }
        service.update_many(&batch).await.gql()?;
        Ok(true)
    }
}
