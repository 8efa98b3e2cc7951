//! Grid paging and filter state.
//!
//! Every list request gets a ticket; only the response carrying the most
//! recent ticket is applied, so a slow response to an old filter can never
//! overwrite a newer page.

use std::fmt;

use chrono::NaiveDate;
use formulario_core::types::DEFAULT_PAGE_LIMIT;
use formulario_core::{Formulario, FormularioPage, Pagination};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub q: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// A list query ready to send: its ticket and GraphQL variables.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub ticket: RequestTicket,
    pub variables: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub from: i64,
    pub to: i64,
    pub total: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{} de {}", self.from, self.to, self.total)
    }
}

#[derive(Debug)]
pub struct GridState {
    page: Pagination,
    total: i64,
    filters: Filters,
    rows: Vec<Formulario>,
    issued: u64,
    latest: Option<RequestTicket>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

impl GridState {
    pub fn new(page_size: i64) -> Self {
        Self {
            page: Pagination::clamped(Some(page_size), Some(0)),
            total: 0,
            filters: Filters::default(),
            rows: Vec::new(),
            issued: 0,
            latest: None,
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page.limit
    }

    pub fn offset(&self) -> i64 {
        self.page.offset
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn rows(&self) -> &[Formulario] {
        &self.rows
    }

    pub fn row(&self, id: i64) -> Option<&Formulario> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.page.offset = 0;
    }

    pub fn set_page_size(&mut self, size: i64) {
        self.page = Pagination::clamped(Some(size), Some(0));
    }

    pub fn next_page(&mut self) -> bool {
        if !self.page_info().has_next {
            return false;
        }
        self.page.offset += self.page.limit;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page.offset == 0 {
            return false;
        }
        self.page.offset = (self.page.offset - self.page.limit).max(0);
        true
    }

    /// Issue a new ticket. Any response to an earlier ticket is now stale.
    pub fn begin_request(&mut self) -> ListRequest {
        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        self.latest = Some(ticket);
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string());
        ListRequest {
            ticket,
            variables: json!({
                "limit": self.page.limit,
                "offset": self.page.offset,
                "q": self.filters.q,
                "dateFrom": date(self.filters.date_from),
                "dateTo": date(self.filters.date_to),
            }),
        }
    }

    /// Apply a list response. Returns false and changes nothing when the
    /// ticket is not the latest one issued.
    pub fn apply_response(&mut self, ticket: RequestTicket, page: FormularioPage) -> bool {
        if self.latest != Some(ticket) {
            return false;
        }
        self.total = page.total;
        self.rows = page.items;
        true
    }

    /// Replace a row in place after a successful save.
    pub fn patch_row(&mut self, updated: Formulario) -> bool {
        match self.rows.iter_mut().find(|r| r.id == updated.id) {
            Some(row) => {
                *row = updated;
                true
            }
            None => false,
        }
    }

    pub fn page_info(&self) -> PageInfo {
        let shown = self.rows.len() as i64;
        PageInfo {
            from: if self.total == 0 || shown == 0 { 0 } else { self.page.offset + 1 },
            to: self.page.offset + shown,
            total: self.total,
            has_prev: self.page.offset > 0,
            has_next: self.page.offset + shown < self.total,
        }
    }
}
