//! Linked-field editors.
//!
//! Work order and SCI code are edited together, as are area and machine.
//! The editors hold modal state only; the caller runs the lookups they ask
//! for and feeds the answers back. Time is passed in so the debounce can be
//! driven from tests.

use std::time::{Duration, Instant};

use formulario_core::{Formulario, FormularioPatch, RefRow};

use crate::editors::CommitError;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits the last input once it has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let settled = matches!(&self.pending, Some((_, at)) if now.duration_since(*at) >= self.delay);
        if !settled {
            return None;
        }
        self.pending.take().map(|(text, _)| text)
    }
}

// ── Work order / SCI ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpSciEditor {
    op_text: String,
    op: Option<String>,
    sci: Option<String>,
    descripcion: Option<String>,
    op_suggestions: Vec<String>,
    sci_choices: Vec<String>,
    searching: Option<String>,
    search: Debouncer,
}

impl OpSciEditor {
    pub fn open(row: &Formulario) -> Self {
        Self {
            op_text: row.no_op.clone().unwrap_or_default(),
            op: row.no_op.clone(),
            sci: row.sci_ref.clone(),
            descripcion: row.descripcion_referencia.clone(),
            op_suggestions: Vec::new(),
            sci_choices: Vec::new(),
            searching: None,
            search: Debouncer::new(SEARCH_DEBOUNCE),
        }
    }

    /// Typing invalidates the chosen work order and everything hanging off it.
    pub fn type_op(&mut self, text: &str, now: Instant) {
        self.op_text = text.to_string();
        self.op = None;
        self.sci = None;
        self.descripcion = None;
        self.sci_choices.clear();
        self.search.input(text.trim(), now);
    }

    /// Prefix to send to `buscarOpsExcel`, once the input has settled.
    pub fn poll_search(&mut self, now: Instant) -> Option<String> {
        let prefix = self.search.poll(now)?;
        self.searching = Some(prefix.clone());
        Some(prefix)
    }

    /// Apply suggestions for `prefix`; answers to superseded prefixes are dropped.
    pub fn set_op_suggestions(&mut self, prefix: &str, ops: Vec<String>) -> bool {
        if self.searching.as_deref() != Some(prefix) {
            return false;
        }
        self.op_suggestions = ops;
        true
    }

    pub fn op_suggestions(&self) -> &[String] {
        &self.op_suggestions
    }

    /// Pick a work order. Returns it so the caller can load its SCI codes.
    pub fn choose_op(&mut self, op: &str) -> String {
        self.op_text = op.to_string();
        self.op = Some(op.to_string());
        self.sci = None;
        self.descripcion = None;
        self.sci_choices.clear();
        op.to_string()
    }

    pub fn set_sci_choices(&mut self, op: &str, codes: Vec<String>) -> bool {
        if self.op.as_deref() != Some(op) {
            return false;
        }
        self.sci_choices = codes;
        true
    }

    pub fn sci_choices(&self) -> &[String] {
        &self.sci_choices
    }

    /// Pick an SCI code scoped to the chosen work order. Returns the pair to
    /// look up the description for.
    pub fn choose_sci(&mut self, sci: &str) -> Result<(String, String), CommitError> {
        let op = self
            .op
            .clone()
            .ok_or_else(|| CommitError::Invalid("choose a work order first".into()))?;
        if !self.sci_choices.iter().any(|c| c == sci) {
            return Err(CommitError::Invalid(format!("SCI {sci} is not listed for {op}")));
        }
        self.sci = Some(sci.to_string());
        self.descripcion = None;
        Ok((op, sci.to_string()))
    }

    pub fn set_reference(&mut self, reference: Option<RefRow>) {
        if let Some(row) = reference {
            if self.op.as_deref() == Some(row.op.as_str()) && self.sci.as_deref() == Some(row.sci.as_str()) {
                self.descripcion = row.descripcion;
            }
        }
    }

    pub fn descripcion(&self) -> Option<&str> {
        self.descripcion.as_deref()
    }

    pub fn save(&self) -> Result<FormularioPatch, CommitError> {
        match (&self.op, &self.sci) {
            (Some(op), Some(sci)) => Ok(FormularioPatch {
                no_op: Some(op.clone()),
                sci_ref: Some(sci.clone()),
                descripcion_referencia: self.descripcion.clone(),
                ..Default::default()
            }),
            _ => Err(CommitError::Invalid(
                "work order and SCI code are both required".into(),
            )),
        }
    }
}

// ── Area / machine ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AreaMaquinaEditor {
    area: Option<String>,
    maquina: Option<String>,
    machines: Vec<String>,
}

impl AreaMaquinaEditor {
    pub fn open(row: &Formulario) -> Self {
        Self {
            area: row.area.clone(),
            maquina: row.maquina.clone(),
            machines: Vec::new(),
        }
    }

    /// Returns the area whose machines should be loaded.
    pub fn choose_area(&mut self, area: &str) -> String {
        self.area = Some(area.to_string());
        area.to_string()
    }

    /// Replace the machine choices. A selected machine missing from the new
    /// list is cleared.
    pub fn set_machines(&mut self, area: &str, machines: Vec<String>) -> bool {
        if self.area.as_deref() != Some(area) {
            return false;
        }
        if let Some(current) = &self.maquina {
            if !machines.contains(current) {
                self.maquina = None;
            }
        }
        self.machines = machines;
        true
    }

    pub fn machines(&self) -> &[String] {
        &self.machines
    }

    pub fn maquina(&self) -> Option<&str> {
        self.maquina.as_deref()
    }

    pub fn choose_maquina(&mut self, maquina: &str) -> Result<(), CommitError> {
        if !self.machines.iter().any(|m| m == maquina) {
            return Err(CommitError::Invalid(format!("{maquina} is not in this area")));
        }
        self.maquina = Some(maquina.to_string());
        Ok(())
    }

    pub fn save(&self) -> Result<FormularioPatch, CommitError> {
        match (&self.area, &self.maquina) {
            (Some(area), Some(maquina)) => Ok(FormularioPatch {
                area: Some(area.clone()),
                maquina: Some(maquina.clone()),
                ..Default::default()
            }),
            _ => Err(CommitError::Invalid("area and machine are both required".into())),
        }
    }
}
