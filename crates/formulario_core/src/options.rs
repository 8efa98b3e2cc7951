//! Canonical option sets for the categorical columns.
//!
//! Stored values come from years of hand entry, so matching is done on a
//! normalized form: accents folded, case ignored, `_`/`-` read as spaces,
//! whitespace collapsed. Values that match nothing are shown as "no
//! selection" by the grid and written as sent by the server.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub const ACTIVIDADES: &[&str] = &[
    "Producción",
    "Alistamiento",
    "Cambio de referencia",
    "Mantenimiento",
    "Limpieza",
    "Parada",
    "Capacitación",
];

pub const HORARIOS: &[&str] = &["Turno 1", "Turno 2", "Turno 3", "Administrativo"];

pub const SEDES: &[&str] = &["Sede Principal", "Sede Norte", "Sede Sur"];

pub const ESTADOS_SCI: &[&str] = &["Pendiente", "En proceso", "Terminado", "Cancelado"];

/// Reasons offered by the grid for `observaciones`. The column itself is free text.
pub const MOTIVOS_OBSERVACION: &[&str] = &[
    "Sin novedad",
    "Falta de material",
    "Daño de máquina",
    "Falta de personal",
    "Problema de calidad",
    "Otro",
];

/// Fold a raw value into its comparison form.
pub fn normalize_option_text(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '_' | '-' => ' ',
            c => c,
        })
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `raw` to its canonical spelling in `options`, if any.
pub fn normalize_choice(raw: &str, options: &[&'static str]) -> Option<&'static str> {
    let wanted = normalize_option_text(raw);
    if wanted.is_empty() {
        return None;
    }
    options
        .iter()
        .copied()
        .find(|candidate| normalize_option_text(candidate) == wanted)
}
