use thiserror::Error;

use crate::interval::IntervalError;

#[derive(Debug, Error)]
pub enum FormularioError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("work order '{op}' / SCI '{sci}' is not in the reference table")]
    InvalidReference { op: String, sci: String },

    #[error("machine '{maquina}' does not belong to area '{area}'")]
    InvalidMachine { area: String, maquina: String },

    #[error("invalid interval: {0}")]
    Interval(#[from] IntervalError),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FormularioError {
    /// Stable machine-readable code, surfaced as the GraphQL `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "BAD_USER_INPUT",
            Self::InvalidReference { .. } | Self::InvalidMachine { .. } => "INVALID_REFERENCE",
            Self::Interval(_) => "INVALID_INTERVAL",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// True for failures caused by the caller's input rather than the backend.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
