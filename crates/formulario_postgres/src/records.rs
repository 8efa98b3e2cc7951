//! PgFormularioStore: the shift-log table in the primary database.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use formulario_core::ports::{FormularioStore, Result};
use formulario_core::{ChangeSet, Formulario, FormularioError, FormularioPage, ListFilter, Pagination};

use crate::rows::PgFormularioRow;
use crate::sql;
use crate::tables::TableRef;

/// The error that aborted the transaction wins over a failed rollback.
fn after_rollback(
    err: FormularioError,
    rollback: std::result::Result<(), sqlx::Error>,
) -> FormularioError {
    if let Err(rollback_err) = rollback {
        warn!(error = %rollback_err, original = %err, "rollback failed");
    }
    err
}

pub struct PgFormularioStore {
    pool: PgPool,
    table: TableRef,
}

impl PgFormularioStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, TableRef::formularios())
    }

    pub fn with_table(pool: PgPool, table: TableRef) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Lock the row, validate the merged result, then write it.
    async fn apply_locked(
        &self,
        conn: &mut PgConnection,
        id: i64,
        changes: &ChangeSet,
    ) -> Result<Formulario> {
        let current: Formulario = sqlx::query_as::<_, PgFormularioRow>(&sql::lock_statement(&self.table))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .with_context(|| format!("lock formulario {id}"))?
            .ok_or_else(|| FormularioError::NotFound(format!("formulario {id}")))?
            .into();

        let Some(mut update) = sql::update_statement(&self.table, id, changes) else {
            return Ok(current);
        };
        changes.apply_checked(&current)?;

        let row = update
            .build_query_as::<PgFormularioRow>()
            .fetch_one(&mut *conn)
            .await
            .with_context(|| format!("update formulario {id}"))?;
        Ok(row.into())
    }
}

#[async_trait]
impl FormularioStore for PgFormularioStore {
    async fn list(&self, filter: &ListFilter, page: Pagination) -> Result<FormularioPage> {
        let mut count = sql::count_statement(&self.table, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("count formularios")?;

        let mut select = sql::page_statement(&self.table, filter, page);
        let rows: Vec<PgFormularioRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("list formularios")?;

        debug!(total, returned = rows.len(), "formulario page loaded");
        Ok(FormularioPage {
            items: rows.into_iter().map(Formulario::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Formulario>> {
        let row = sqlx::query_as::<_, PgFormularioRow>(&sql::select_by_id(&self.table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("load formulario {id}"))?;
        Ok(row.map(Formulario::from))
    }

    async fn find_by_cc(&self, cc: &str) -> Result<Option<Formulario>> {
        let row = sqlx::query_as::<_, PgFormularioRow>(&sql::select_by_cc(&self.table))
            .bind(cc)
            .fetch_optional(&self.pool)
            .await
            .context("load formulario by cc")?;
        Ok(row.map(Formulario::from))
    }

    async fn update(&self, id: i64, changes: &ChangeSet) -> Result<Formulario> {
        let mut tx = self.pool.begin().await.context("begin update")?;
        match self.apply_locked(&mut tx, id, changes).await {
            Ok(row) => {
                tx.commit().await.context("commit update")?;
                Ok(row)
            }
            Err(err) => Err(after_rollback(err, tx.rollback().await)),
        }
    }

    async fn update_many(&self, updates: &[(i64, ChangeSet)]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("begin batch")?;
        for (index, (id, changes)) in updates.iter().enumerate() {
            if let Err(err) = self.apply_locked(&mut tx, *id, changes).await {
                warn!(index, id, error = %err, "batch update failed, rolling back");
                return Err(after_rollback(err, tx.rollback().await));
            }
        }
        tx.commit().await.context("commit batch")?;
        Ok(())
    }
}
