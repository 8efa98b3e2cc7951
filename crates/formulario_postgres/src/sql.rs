//! Statement builders.
//!
//! Kept free of any connection so the generated SQL can be asserted in unit
//! tests. Every user value goes through `push_bind`.

use formulario_core::types::escape_like;
use formulario_core::{ChangeSet, FieldValue, ListFilter, Pagination};
use sqlx::{Postgres, QueryBuilder};

use crate::rows::FORMULARIO_COLUMNS;
use crate::tables::TableRef;

fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

pub(crate) fn prefix_pattern(raw: &str) -> String {
    format!("{}%", escape_like(raw))
}

/// Append the `WHERE` clause shared by the page and count statements.
pub(crate) fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListFilter) {
    qb.push(" WHERE 1=1");

    if let Some(q) = &filter.q {
        qb.push(" AND ((");
        for (i, word) in filter.name_words().into_iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            qb.push(r#""nombres" ILIKE "#);
            qb.push_bind(contains_pattern(word));
        }
        qb.push(r#") OR "cc"::text ILIKE "#);
        qb.push_bind(contains_pattern(q));
        qb.push(")");
    }

    if let Some(id) = &filter.id {
        qb.push(r#" AND "id"::text ILIKE "#);
        qb.push_bind(contains_pattern(id));
    }

    if let Some(no_op) = &filter.no_op {
        qb.push(r#" AND "no_op"::text ILIKE "#);
        qb.push_bind(contains_pattern(no_op));
    }

    if let Some(dates) = &filter.dates {
        if let Some(lower) = dates.lower() {
            qb.push(r#" AND "fecha_inicio"::date >= "#);
            qb.push_bind(lower);
        }
        if let Some(upper) = dates.upper() {
            qb.push(r#" AND "fecha_final"::date <= "#);
            qb.push_bind(upper);
        }
    }
}

pub(crate) fn count_statement(table: &TableRef, filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*)::bigint FROM {table}"));
    push_filters(&mut qb, filter);
    qb
}

pub(crate) fn page_statement(
    table: &TableRef,
    filter: &ListFilter,
    page: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {FORMULARIO_COLUMNS} FROM {table}"));
    push_filters(&mut qb, filter);
    qb.push(r#" ORDER BY "id" DESC LIMIT "#);
    qb.push_bind(page.limit);
    qb.push(" OFFSET ");
    qb.push_bind(page.offset);
    qb
}

pub(crate) fn lock_statement(table: &TableRef) -> String {
    format!(r#"SELECT {FORMULARIO_COLUMNS} FROM {table} WHERE "id" = $1 FOR UPDATE"#)
}

pub(crate) fn select_by_id(table: &TableRef) -> String {
    format!(r#"SELECT {FORMULARIO_COLUMNS} FROM {table} WHERE "id" = $1"#)
}

pub(crate) fn select_by_cc(table: &TableRef) -> String {
    format!(
        r#"SELECT {FORMULARIO_COLUMNS} FROM {table} WHERE "cc"::text = $1 ORDER BY "id" DESC LIMIT 1"#
    )
}

/// `UPDATE ... SET "col" = $n[::cast], ... WHERE "id" = $m RETURNING ...`.
///
/// Returns `None` for an empty change set; callers return the current row.
pub(crate) fn update_statement(
    table: &TableRef,
    id: i64,
    changes: &ChangeSet,
) -> Option<QueryBuilder<'static, Postgres>> {
    if changes.is_empty() {
        return None;
    }
    let mut qb = QueryBuilder::new(format!("UPDATE {table} SET "));
    let mut set = qb.separated(", ");
    for change in changes.iter() {
        set.push(format!(r#""{}" = "#, change.field.column()));
        match &change.value {
            FieldValue::Null => set.push_bind_unseparated(None::<String>),
            FieldValue::Text(text) => set.push_bind_unseparated(text.clone()),
            FieldValue::Date(date) => set.push_bind_unseparated(*date),
            FieldValue::Time(time) => set.push_bind_unseparated(*time),
            FieldValue::Numeric(value) => set.push_bind_unseparated(*value),
        };
        set.push_unseparated(change.field.cast().suffix());
    }
    qb.push(r#" WHERE "id" = "#);
    qb.push_bind(id);
    qb.push(format!(" RETURNING {FORMULARIO_COLUMNS}"));
    Some(qb)
}
