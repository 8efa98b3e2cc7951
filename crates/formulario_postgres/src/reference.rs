//! PgReferenceStore: work orders and machines in the reference database.
//!
//! Both tables are owned by other systems. Column names contain dots and
//! accents, so they are quoted verbatim and read back as text.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use formulario_core::ports::{ReferenceStore, Result};
use formulario_core::RefRow;

use crate::rows::PgRefRow;
use crate::sql::prefix_pattern;
use crate::tables::TableRef;

const OP_COLUMN: &str = r#""O.P.""#;
const SCI_COLUMN: &str = r#""SCI Ref.""#;
const DESCRIPCION_COLUMN: &str = r#""Descripción Referencia""#;
const AREA_COLUMN: &str = r#""ct_pn""#;
const MAQUINA_COLUMN: &str = r#""maquina""#;

pub struct PgReferenceStore {
    pool: PgPool,
    work_orders: TableRef,
    machines: TableRef,
}

impl PgReferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_tables(pool, TableRef::work_orders(), TableRef::machines())
    }

    pub fn with_tables(pool: PgPool, work_orders: TableRef, machines: TableRef) -> Self {
        Self {
            pool,
            work_orders,
            machines,
        }
    }
}

pub(crate) fn sci_statement(
    table: &TableRef,
    op: &str,
    prefix: Option<&str>,
    limit: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {SCI_COLUMN}::text FROM {table} WHERE {OP_COLUMN}::text = "
    ));
    qb.push_bind(op.to_string());
    qb.push(format!(" AND {SCI_COLUMN} IS NOT NULL"));
    if let Some(prefix) = prefix {
        qb.push(format!(" AND CAST({SCI_COLUMN} AS TEXT) ILIKE "));
        qb.push_bind(prefix_pattern(prefix));
    }
    qb.push(format!(
        " GROUP BY {SCI_COLUMN} ORDER BY {SCI_COLUMN} ASC LIMIT "
    ));
    qb.push_bind(limit);
    qb
}

#[async_trait]
impl ReferenceStore for PgReferenceStore {
    async fn search_ops(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {OP_COLUMN}::text AS op FROM {} \
             WHERE {OP_COLUMN}::text ILIKE $1 ORDER BY op ASC LIMIT $2",
            self.work_orders
        );
        let ops = sqlx::query_scalar::<_, String>(&sql)
            .bind(prefix_pattern(prefix))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("search work orders")?;
        Ok(ops)
    }

    async fn search_sci(&self, op: &str, prefix: Option<&str>, limit: i64) -> Result<Vec<String>> {
        let mut qb = sci_statement(&self.work_orders, op, prefix, limit);
        let codes: Vec<String> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("search SCI codes for {op}"))?;
        Ok(codes)
    }

    async fn find_reference(&self, op: &str, sci: &str) -> Result<Option<RefRow>> {
        let sql = format!(
            "SELECT {OP_COLUMN}::text AS op, {SCI_COLUMN}::text AS sci, \
             {DESCRIPCION_COLUMN}::text AS descripcion FROM {} \
             WHERE {OP_COLUMN}::text = $1 AND {SCI_COLUMN}::text = $2 LIMIT 1",
            self.work_orders
        );
        let row = sqlx::query_as::<_, PgRefRow>(&sql)
            .bind(op)
            .bind(sci)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("find reference {op}/{sci}"))?;
        Ok(row.map(RefRow::from))
    }

    async fn areas(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {AREA_COLUMN}::text AS area FROM {} \
             WHERE {AREA_COLUMN} IS NOT NULL ORDER BY area ASC",
            self.machines
        );
        let areas = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("list areas")?;
        Ok(areas)
    }

    async fn machines(&self, area: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {MAQUINA_COLUMN}::text AS maquina FROM {} \
             WHERE {AREA_COLUMN}::text = $1 AND {MAQUINA_COLUMN} IS NOT NULL \
             ORDER BY maquina ASC",
            self.machines
        );
        let machines = sqlx::query_scalar::<_, String>(&sql)
            .bind(area)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("list machines for {area}"))?;
        Ok(machines)
    }
}
