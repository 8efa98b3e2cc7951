//! Domain types shared by the service, the adapters and the grid.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 500;
pub const DEFAULT_LOOKUP_LIMIT: i64 = 10;

/// One shift-log row of the primary table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formulario {
    pub id: i64,
    pub cc: Option<String>,
    pub nombres: Option<String>,
    pub sede: Option<String>,
    pub no_op: Option<String>,
    pub sci_ref: Option<String>,
    pub descripcion_referencia: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub hora_inicio: Option<NaiveTime>,
    pub fecha_final: Option<NaiveDate>,
    pub hora_final: Option<NaiveTime>,
    pub actividad: Option<String>,
    pub cantidad: Option<Decimal>,
    pub estado_sci: Option<String>,
    pub area: Option<String>,
    pub maquina: Option<String>,
    pub horario: Option<String>,
    pub observaciones: Option<String>,
}

impl Formulario {
    pub fn interval(&self) -> Option<Interval> {
        Interval::from_parts(
            self.fecha_inicio,
            self.hora_inicio,
            self.fecha_final,
            self.hora_final,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormularioPage {
    pub items: Vec<Formulario>,
    /// Rows matching the filter, independent of the page window.
    pub total: i64,
}

impl FormularioPage {
    pub fn count(&self) -> i64 {
        self.items.len() as i64
    }
}

/// Work order / SCI / description triple from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefRow {
    pub op: String,
    pub sci: String,
    pub descripcion: Option<String>,
}

// ── Paging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Clamp caller input: limit into `[1, 500]` (default 50), offset `>= 0`.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

/// A lookup `limit` of at least 1 (default 10). Larger values are honored.
pub fn lookup_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LOOKUP_LIMIT).max(1)
}

// ── Filtering ─────────────────────────────────────────────────

/// Date containment filter. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    /// `fecha_inicio >= from AND fecha_final <= to`
    Between { from: NaiveDate, to: NaiveDate },
    /// `fecha_inicio >= from`
    From(NaiveDate),
    /// `fecha_final <= to`
    Until(NaiveDate),
}

impl DateRange {
    /// Combine optional bounds; a reversed pair is swapped.
    pub fn from_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        match (from, to) {
            (Some(a), Some(b)) => Some(Self::Between {
                from: a.min(b),
                to: a.max(b),
            }),
            (Some(a), None) => Some(Self::From(a)),
            (None, Some(b)) => Some(Self::Until(b)),
            (None, None) => None,
        }
    }

    pub fn lower(&self) -> Option<NaiveDate> {
        match self {
            Self::Between { from, .. } | Self::From(from) => Some(*from),
            Self::Until(_) => None,
        }
    }

    pub fn upper(&self) -> Option<NaiveDate> {
        match self {
            Self::Between { to, .. } | Self::Until(to) => Some(*to),
            Self::From(_) => None,
        }
    }

    pub fn contains(&self, fecha_inicio: Option<NaiveDate>, fecha_final: Option<NaiveDate>) -> bool {
        let lower_ok = self
            .lower()
            .map_or(true, |from| fecha_inicio.is_some_and(|d| d >= from));
        let upper_ok = self
            .upper()
            .map_or(true, |to| fecha_final.is_some_and(|d| d <= to));
        lower_ok && upper_ok
    }
}

/// Conjunctive list filter. Blank text is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Words AND-ed against `nombres`, or a substring of `cc`.
    pub q: Option<String>,
    pub dates: Option<DateRange>,
    /// Substring of the textual id.
    pub id: Option<String>,
    /// Substring of `no_op`.
    pub no_op: Option<String>,
}

impl ListFilter {
    pub fn with_q(mut self, q: Option<&str>) -> Self {
        self.q = non_blank(q);
        self
    }

    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.id = non_blank(id);
        self
    }

    pub fn with_no_op(mut self, no_op: Option<&str>) -> Self {
        self.no_op = non_blank(no_op);
        self
    }

    pub fn with_dates(mut self, dates: Option<DateRange>) -> Self {
        self.dates = dates;
        self
    }

    /// Words of `q` that must each appear in `nombres`.
    pub fn name_words(&self) -> Vec<&str> {
        self.q
            .as_deref()
            .map(|q| q.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Evaluate the filter in memory. Mirrors the SQL built by the postgres adapter.
    pub fn matches(&self, row: &Formulario) -> bool {
        if let Some(id) = &self.id {
            if !contains_ci(&row.id.to_string(), id) {
                return false;
            }
        }
        if let Some(no_op) = &self.no_op {
            if !row.no_op.as_deref().is_some_and(|v| contains_ci(v, no_op)) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            let by_name = row.nombres.as_deref().is_some_and(|n| {
                self.name_words().iter().all(|w| contains_ci(n, w))
            });
            let by_cc = row.cc.as_deref().is_some_and(|cc| contains_ci(cc, q));
            if !(by_name || by_cc) {
                return false;
            }
        }
        if let Some(dates) = &self.dates {
            if !dates.contains(row.fecha_inicio, row.fecha_final) {
                return false;
            }
        }
        true
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape `%`, `_` and `\` so user text matches literally inside a LIKE pattern.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
