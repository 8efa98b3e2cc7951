//! Qualified table names.
//!
//! Table names come from configuration, so they are validated and always
//! rendered double-quoted. Everything else in a statement is bound.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_FORMULARIO_TABLE: &str = "public.T_Dim_Formulario2";
pub const DEFAULT_OP_TABLE: &str = "tablas_servicios.T_Ctrol_OP";
pub const DEFAULT_MAQUINA_TABLE: &str = "public.T_Dim_Maquinas";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid table name '{0}': expected schema.table without quotes or control characters")]
pub struct InvalidTableName(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    schema: String,
    name: String,
}

impl TableRef {
    /// Parse `schema.table` or a bare `table` (schema `public`). Surrounding
    /// double quotes on either part are accepted and stripped.
    pub fn parse(raw: &str) -> Result<Self, InvalidTableName> {
        let invalid = || InvalidTableName(raw.to_string());
        let (schema, name) = match raw.trim().split_once('.') {
            Some((schema, name)) => (strip_quotes(schema), strip_quotes(name)),
            None => ("public", strip_quotes(raw.trim())),
        };
        for part in [schema, name] {
            if part.is_empty() || part.chars().any(|c| c == '"' || c.is_control()) {
                return Err(invalid());
            }
        }
        Ok(Self {
            schema: schema.to_string(),
            name: name.to_string(),
        })
    }

    pub fn formularios() -> Self {
        Self::from_default(DEFAULT_FORMULARIO_TABLE)
    }

    pub fn work_orders() -> Self {
        Self::from_default(DEFAULT_OP_TABLE)
    }

    pub fn machines() -> Self {
        Self::from_default(DEFAULT_MAQUINA_TABLE)
    }

    fn from_default(raw: &str) -> Self {
        let (schema, name) = raw.split_once('.').unwrap_or(("public", raw));
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn strip_quotes(part: &str) -> &str {
    let part = part.trim();
    part.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(part)
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\".\"{}\"", self.schema, self.name)
    }
}
