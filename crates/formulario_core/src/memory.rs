//! In-memory port implementations (for testing).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::FormularioError;
use crate::patch::ChangeSet;
use crate::ports::{FormularioStore, ReferenceStore, Result};
use crate::types::{Formulario, FormularioPage, ListFilter, Pagination, RefRow};

/// Records keyed by id. Batches are applied to a copy and swapped in on success.
#[derive(Default)]
pub struct MemoryFormularioStore {
    rows: Arc<RwLock<BTreeMap<i64, Formulario>>>,
}

impl MemoryFormularioStore {
    pub fn with_rows(rows: impl IntoIterator<Item = Formulario>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows.into_iter().map(|r| (r.id, r)).collect())),
        }
    }

    pub async fn get(&self, id: i64) -> Option<Formulario> {
        self.rows.read().await.get(&id).cloned()
    }
}

fn apply_one(
    rows: &mut BTreeMap<i64, Formulario>,
    id: i64,
    changes: &ChangeSet,
) -> Result<Formulario> {
    let current = rows
        .get(&id)
        .ok_or_else(|| FormularioError::NotFound(format!("formulario {id}")))?;
    let merged = changes.apply_checked(current)?;
    rows.insert(id, merged.clone());
    Ok(merged)
}

#[async_trait]
impl FormularioStore for MemoryFormularioStore {
    async fn list(&self, filter: &ListFilter, page: Pagination) -> Result<FormularioPage> {
        let rows = self.rows.read().await;
        let matching: Vec<&Formulario> = rows.values().rev().filter(|r| filter.matches(r)).collect();
        let items = matching
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|r| (*r).clone())
            .collect();
        Ok(FormularioPage {
            items,
            total: matching.len() as i64,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Formulario>> {
        Ok(self.get(id).await)
    }

    async fn find_by_cc(&self, cc: &str) -> Result<Option<Formulario>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .rev()
            .find(|r| r.cc.as_deref() == Some(cc))
            .cloned())
    }

    async fn update(&self, id: i64, changes: &ChangeSet) -> Result<Formulario> {
        let mut rows = self.rows.write().await;
        apply_one(&mut rows, id, changes)
    }

    async fn update_many(&self, updates: &[(i64, ChangeSet)]) -> Result<()> {
        let mut rows = self.rows.write().await;
        let mut staged = rows.clone();
        for (id, changes) in updates {
            apply_one(&mut staged, *id, changes)?;
        }
        *rows = staged;
        Ok(())
    }
}

/// Work orders and machines held in sorted sets.
#[derive(Default)]
pub struct MemoryReferenceStore {
    references: BTreeMap<(String, String), Option<String>>,
    machines: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryReferenceStore {
    pub fn with_reference(mut self, op: &str, sci: &str, descripcion: Option<&str>) -> Self {
        self.references.insert(
            (op.to_string(), sci.to_string()),
            descripcion.map(str::to_string),
        );
        self
    }

    pub fn with_machine(mut self, area: &str, maquina: &str) -> Self {
        self.machines
            .entry(area.to_string())
            .or_default()
            .insert(maquina.to_string());
        self
    }
}

fn starts_with_ci(value: &str, prefix: &str) -> bool {
    value.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn search_ops(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        let ops: BTreeSet<&String> = self
            .references
            .keys()
            .map(|(op, _)| op)
            .filter(|op| starts_with_ci(op, prefix))
            .collect();
        Ok(ops.into_iter().take(limit as usize).cloned().collect())
    }

    async fn search_sci(
        &self,
        op: &str,
        prefix: Option<&str>,
        limit: i64,
    ) -> Result<Vec<String>> {
        let codes: BTreeSet<&String> = self
            .references
            .keys()
            .filter(|(o, sci)| o == op && prefix.map_or(true, |p| starts_with_ci(sci, p)))
            .map(|(_, sci)| sci)
            .collect();
        // The reference column is numeric, so codes sort by value.
        let mut codes: Vec<&String> = codes.into_iter().collect();
        codes.sort_by_key(|sci| {
            let value = sci.trim().parse::<Decimal>().ok();
            (value.is_none(), value, sci.to_string())
        });
        Ok(codes.into_iter().take(limit as usize).cloned().collect())
    }

    async fn find_reference(&self, op: &str, sci: &str) -> Result<Option<RefRow>> {
        Ok(self
            .references
            .get(&(op.to_string(), sci.to_string()))
            .map(|descripcion| RefRow {
                op: op.to_string(),
                sci: sci.to_string(),
                descripcion: descripcion.clone(),
            }))
    }

    async fn areas(&self) -> Result<Vec<String>> {
        Ok(self.machines.keys().cloned().collect())
    }

    async fn machines(&self, area: &str) -> Result<Vec<String>> {
        Ok(self
            .machines
            .get(area)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::FormularioPatch;

    fn rows(n: i64) -> Vec<Formulario> {
        (1..=n)
            .map(|id| Formulario {
                id,
                nombres: Some(format!("Operario {id}")),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn list_is_newest_first_and_counts_all_matches() {
        let store = MemoryFormularioStore::with_rows(rows(5));
        let page = store
            .list(&ListFilter::default(), Pagination::clamped(Some(2), Some(0)))
            .await
            .unwrap();
        assert_eq!(page.count(), 2);
        assert_eq!(page.total, 5);
        let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn batch_failure_leaves_rows_untouched() {
        let store = MemoryFormularioStore::with_rows(rows(2));
        let patch = FormularioPatch {
            nombres: Some("Cambiado".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        let err = store
            .update_many(&[(1, set.clone()), (99, set)])
            .await
            .unwrap_err();
        assert!(matches!(err, FormularioError::NotFound(_)));
        assert_eq!(store.get(1).await.unwrap().nombres.as_deref(), Some("Operario 1"));
    }

    #[tokio::test]
    async fn sci_search_is_scoped_sorted_and_deduplicated() {
        let store = MemoryReferenceStore::default()
            .with_reference("OP-100", "530", None)
            .with_reference("OP-100", "512", None)
            .with_reference("OP-100", "610", None)
            .with_reference("OP-200", "500", None);
        let codes = store.search_sci("OP-100", Some("5"), 10).await.unwrap();
        assert_eq!(codes, vec!["512", "530"]);
    }

    #[tokio::test]
    async fn sci_codes_sort_by_numeric_value() {
        let store = MemoryReferenceStore::default()
            .with_reference("OP-100", "1000", None)
            .with_reference("OP-100", "512", None)
            .with_reference("OP-100", "90", None);
        let codes = store.search_sci("OP-100", None, 10).await.unwrap();
        assert_eq!(codes, vec!["90", "512", "1000"]);
    }
}
