//! Per-cell edit lifecycle.
//!
//! ```text
//! Display ──dblclick/F2──▶ Editing ──commit──▶ Saving ──ok──▶ Display(Saved)
//!                            │                   └──err──▶ Display(Error), value reverted
//!                            └──Escape──▶ Display
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    F2,
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellStatus {
    Idle,
    Saved,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Display(CellStatus),
    Editing { draft: String },
    Saving { pending: String },
}

#[derive(Debug, Clone)]
pub struct Cell {
    value: String,
    state: CellState,
    editable: bool,
    flag: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<String>, editable: bool) -> Self {
        Self {
            value: value.into(),
            state: CellState::Display(CellStatus::Idle),
            editable,
            flag: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    /// Validation message raised by a sibling cell's commit, if any.
    pub fn flag(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    pub fn set_flag(&mut self, message: Option<String>) {
        self.flag = message;
    }

    /// Double-click entry point.
    pub fn double_click(&mut self) -> bool {
        self.begin_edit()
    }

    /// Keyboard entry point. Enter returns the draft to commit.
    pub fn key(&mut self, key: Key) -> Option<String> {
        match key {
            Key::F2 => {
                self.begin_edit();
                None
            }
            Key::Escape => {
                self.cancel();
                None
            }
            Key::Enter => self.draft().map(str::to_string),
            Key::Other => None,
        }
    }

    fn begin_edit(&mut self) -> bool {
        if !self.editable || !matches!(self.state, CellState::Display(_)) {
            return false;
        }
        self.state = CellState::Editing {
            draft: self.value.clone(),
        };
        true
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            CellState::Editing { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn input(&mut self, text: impl Into<String>) {
        if let CellState::Editing { draft } = &mut self.state {
            *draft = text.into();
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, CellState::Editing { .. }) {
            self.state = CellState::Display(CellStatus::Idle);
            self.flag = None;
        }
    }

    /// Move to `Saving`. Returns the value to send, or `None` when nothing
    /// changed (the cell just closes).
    pub fn commit(&mut self) -> Option<String> {
        let CellState::Editing { draft } = &self.state else {
            return None;
        };
        if draft.trim() == self.value.trim() {
            self.state = CellState::Display(CellStatus::Idle);
            return None;
        }
        let pending = draft.clone();
        self.state = CellState::Saving {
            pending: pending.clone(),
        };
        self.flag = None;
        Some(pending)
    }

    /// The server accepted the write; show what it stored.
    pub fn save_succeeded(&mut self, stored: impl Into<String>) {
        if matches!(self.state, CellState::Saving { .. }) {
            self.value = stored.into();
            self.state = CellState::Display(CellStatus::Saved);
        }
    }

    /// The server rejected the write; the previous value stays.
    pub fn save_failed(&mut self, message: impl Into<String>) {
        if matches!(self.state, CellState::Saving { .. }) {
            self.state = CellState::Display(CellStatus::Error(message.into()));
        }
    }
}
