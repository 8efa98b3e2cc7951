//! Query root.

use std::sync::Arc;

use async_graphql::{Context, Object, Result, ID};
use chrono::NaiveDate;
use formulario_core::interval::parse_date;
use formulario_core::types::DEFAULT_PAGE_LIMIT;
use formulario_core::{DateRange, FormularioError, FormularioService, ListFilter, Pagination};

use super::errors::GraphqlResultExt;
use super::types::{FormularioObject, FormulariosResult, OpcionesObject, RefRowObject};

#[derive(Default)]
pub struct QueryRoot;

/// Blank means absent; anything else must parse.
fn date_arg(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, FormularioError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| FormularioError::invalid(format!("{name} '{s}' is not a YYYY-MM-DD date"))),
    }
}

pub(crate) fn parse_id(id: &ID) -> Result<i64, FormularioError> {
    id.trim()
        .parse()
        .map_err(|_| FormularioError::invalid(format!("'{}' is not a formulario id", id.as_str())))
}

#[Object]
impl QueryRoot {
    /// Paged, filtered list, newest first.
    #[allow(clippy::too_many_arguments)]
    async fn formularios(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "Some(DEFAULT_PAGE_LIMIT)")] limit: Option<i64>,
        #[graphql(default_with = "Some(0)")] offset: Option<i64>,
        q: Option<String>,
        date_from: Option<String>,
        date_to: Option<String>,
        id: Option<String>,
        #[graphql(name = "no_op")] no_op: Option<String>,
    ) -> Result<FormulariosResult> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        let from = date_arg("dateFrom", date_from.as_deref()).gql()?;
        let to = date_arg("dateTo", date_to.as_deref()).gql()?;
        let filter = ListFilter::default()
            .with_q(q.as_deref())
            .with_id(id.as_deref())
            .with_no_op(no_op.as_deref())
            .with_dates(DateRange::from_bounds(from, to));
        let page = service
            .list(&filter, Pagination::clamped(limit, offset))
            .await
            .gql()?;
        Ok(page.into())
    }

    /// One record by `id` or by `cc`; exactly one must be given.
    async fn formulario(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        cc: Option<String>,
    ) -> Result<Option<FormularioObject>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        let cc = cc.filter(|c| !c.trim().is_empty());
        let row = match (id, cc) {
            (Some(id), None) => service.get_by_id(parse_id(&id).gql()?).await,
            (None, Some(cc)) => service.get_by_cc(&cc).await,
            _ => Err(FormularioError::invalid("give exactly one of id or cc")),
        }
        .gql()?;
        Ok(row.map(FormularioObject::from))
    }

    /// Work-order codes starting with `prefix`.
    async fn buscar_ops_excel(
        &self,
        ctx: &Context<'_>,
        prefix: String,
        #[graphql(default = 10)] limit: i64,
    ) -> Result<Vec<String>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        service.search_ops(&prefix, Some(limit)).await.gql()
    }

    /// SCI codes of one work order, optionally prefix-filtered.
    async fn buscar_sci_por_op(
        &self,
        ctx: &Context<'_>,
        op: String,
        prefix: Option<String>,
        #[graphql(default = 10)] limit: i64,
    ) -> Result<Vec<String>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        service
            .search_sci(&op, prefix.as_deref(), Some(limit))
            .await
            .gql()
    }

    async fn ref_por_op_sci(
        &self,
        ctx: &Context<'_>,
        op: String,
        sci: String,
    ) -> Result<Option<RefRowObject>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        let row = service.find_reference(&op, &sci).await.gql()?;
        Ok(row.map(RefRowObject::from))
    }

    async fn ctpn_list(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        service.areas().await.gql()
    }

    /// Known spellings for the categorical columns.
    async fn opciones(&self) -> OpcionesObject {
        OpcionesObject::known()
    }

    async fn maquinas_por_ctpn(&self, ctx: &Context<'_>, ctpn: String) -> Result<Vec<String>> {
        let service = ctx.data::<Arc<FormularioService>>()?;
        service.machines(&ctpn).await.gql()
    }
}
