//! FormularioService: the operations behind the GraphQL resolvers.
//!
//! Holds one store per database via `Arc<dyn Port>` so the same logic runs
//! against Postgres or the in-memory doubles. Cross-database checks (work
//! order / SCI pairs, area machines) happen here, before any write reaches
//! the primary store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::FormularioError;
use crate::patch::{ChangeSet, FormularioPatch};
use crate::ports::{FormularioStore, ReferenceStore, Result};
use crate::types::{lookup_limit, Formulario, FormularioPage, ListFilter, Pagination, RefRow};

pub struct FormularioService {
    records: Arc<dyn FormularioStore>,
    reference: Arc<dyn ReferenceStore>,
}

impl FormularioService {
    pub fn new(records: Arc<dyn FormularioStore>, reference: Arc<dyn ReferenceStore>) -> Self {
        Self { records, reference }
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn list(&self, filter: &ListFilter, page: Pagination) -> Result<FormularioPage> {
        debug!(?filter, ?page, "listing formularios");
        self.records.list(filter, page).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Formulario>> {
        self.records.find_by_id(id).await
    }

    pub async fn get_by_cc(&self, cc: &str) -> Result<Option<Formulario>> {
        self.records.find_by_cc(cc.trim()).await
    }

    pub async fn search_ops(&self, prefix: &str, limit: Option<i64>) -> Result<Vec<String>> {
        self.reference
            .search_ops(prefix.trim(), lookup_limit(limit))
            .await
    }

    pub async fn search_sci(
        &self,
        op: &str,
        prefix: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<String>> {
        let prefix = prefix.map(str::trim).filter(|p| !p.is_empty());
        self.reference
            .search_sci(op.trim(), prefix, lookup_limit(limit))
            .await
    }

    pub async fn find_reference(&self, op: &str, sci: &str) -> Result<Option<RefRow>> {
        self.reference.find_reference(op.trim(), sci.trim()).await
    }

    pub async fn areas(&self) -> Result<Vec<String>> {
        self.reference.areas().await
    }

    pub async fn machines(&self, area: &str) -> Result<Vec<String>> {
        self.reference.machines(area.trim()).await
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Validate a patch against the reference database and translate it.
    pub async fn prepare(&self, patch: &FormularioPatch) -> Result<ChangeSet> {
        let reference = match patch.reference_pair()? {
            Some((op, sci)) => {
                let row = self.reference.find_reference(op, sci).await?;
                if row.is_none() {
                    warn!(op, sci, "rejected unknown work order / SCI pair");
                    return Err(FormularioError::InvalidReference {
                        op: op.to_string(),
                        sci: sci.to_string(),
                    });
                }
                row
            }
            None => None,
        };

        if let Some((area, maquina)) = patch.machine_pair()? {
            let machines = self.reference.machines(area).await?;
            if !machines.iter().any(|m| m.trim() == maquina) {
                warn!(area, maquina, "rejected machine outside its area");
                return Err(FormularioError::InvalidMachine {
                    area: area.to_string(),
                    maquina: maquina.to_string(),
                });
            }
        }

        ChangeSet::build(patch, reference.as_ref())
    }

    pub async fn update(&self, id: i64, patch: &FormularioPatch) -> Result<Formulario> {
        let changes = self.prepare(patch).await?;
        if changes.is_empty() {
            debug!(id, "empty patch, returning current row");
        }
        let row = self.records.update(id, &changes).await?;
        info!(id, fields = changes.len(), "formulario updated");
        Ok(row)
    }

    /// All-or-nothing batch. Every patch is validated before the transaction opens.
    pub async fn update_many(&self, updates: &[(i64, FormularioPatch)]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut prepared = Vec::with_capacity(updates.len());
        for (id, patch) in updates {
            prepared.push((*id, self.prepare(patch).await?));
        }
        self.records.update_many(&prepared).await?;
        info!(count = prepared.len(), "formulario batch committed");
        Ok(())
    }
}
