//! Storage port traits.
//! Implemented by formulario_postgres: core logic depends only on these traits.

use async_trait::async_trait;

use crate::error::FormularioError;
use crate::patch::ChangeSet;
use crate::types::{Formulario, FormularioPage, ListFilter, Pagination, RefRow};

pub type Result<T> = std::result::Result<T, FormularioError>;

/// The primary records table.
#[async_trait]
pub trait FormularioStore: Send + Sync {
    /// One page of matching rows, newest id first, plus the full match count.
    async fn list(&self, filter: &ListFilter, page: Pagination) -> Result<FormularioPage>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Formulario>>;

    /// Most recent row carrying this `cc`.
    async fn find_by_cc(&self, cc: &str) -> Result<Option<Formulario>>;

    /// Apply one change set and return the row as stored afterwards.
    ///
    /// An empty change set returns the current row. A missing row is
    /// `NotFound`. When the change set touches the interval, the merged row
    /// must pass interval validation or nothing is written.
    async fn update(&self, id: i64, changes: &ChangeSet) -> Result<Formulario>;

    /// Apply every update in order inside one transaction. Any failure
    /// leaves the table as it was before the call.
    async fn update_many(&self, updates: &[(i64, ChangeSet)]) -> Result<()>;
}

/// The secondary reference database: work orders and machines.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Distinct work orders starting with `prefix`, ascending.
    async fn search_ops(&self, prefix: &str, limit: i64) -> Result<Vec<String>>;

    /// Distinct SCI codes of `op`, optionally starting with `prefix`, ascending.
    async fn search_sci(&self, op: &str, prefix: Option<&str>, limit: i64)
        -> Result<Vec<String>>;

    async fn find_reference(&self, op: &str, sci: &str) -> Result<Option<RefRow>>;

    /// Distinct areas, ascending.
    async fn areas(&self) -> Result<Vec<String>>;

    /// Machines of one area, ascending.
    async fn machines(&self, area: &str) -> Result<Vec<String>>;
}
