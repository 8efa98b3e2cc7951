//! Formulario grid model.
//!
//! Everything the browser grid decides on its own: which page is showing,
//! which list response is current, how a cell moves through editing and
//! saving, what a field editor accepts, and which patch a commit produces.
//! No rendering and no network; callers feed responses back in.

pub mod cell;
pub mod columns;
pub mod editors;
pub mod linked;
pub mod state;

pub use cell::{Cell, CellState, CellStatus, Key};
pub use columns::{ColumnKind, GridColumn, COLUMNS};
pub use editors::{commit_cell, picker_bounds, sanitize_numeric, CommitError, PickerBounds};
pub use linked::{AreaMaquinaEditor, Debouncer, OpSciEditor, SEARCH_DEBOUNCE};
pub use state::{Filters, GridState, ListRequest, PageInfo, RequestTicket};
