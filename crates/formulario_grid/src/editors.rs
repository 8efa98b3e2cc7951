//! Field editors: input filtering, picker bounds and the patch a committed
//! cell produces.

use chrono::{NaiveDate, NaiveTime};
use formulario_core::interval::{parse_date, parse_time};
use formulario_core::options::normalize_choice;
use formulario_core::{ColumnCast, Field, Formulario, FormularioPatch, Interval, IntervalError};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CommitError {
    /// The edited interval is invalid. `flagged` lists the cells to mark.
    #[error("{error}")]
    Interval {
        error: IntervalError,
        flagged: [Field; 2],
    },
    #[error("{0}")]
    Invalid(String),
}

/// Keep digits and the first decimal separator. A comma is read as a point.
/// Signs are dropped, so the result is never negative.
pub fn sanitize_numeric(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_separator = false;
    for c in raw.chars() {
        match c {
            '0'..='9' => out.push(c),
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                out.push('.');
            }
            _ => {}
        }
    }
    out
}

/// Limits for a date or time picker given the row's other interval values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickerBounds {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub min_time: Option<NaiveTime>,
    pub max_time: Option<NaiveTime>,
}

/// Start pickers are capped by the end, end pickers floored by the start.
/// Time bounds only apply when both dates are the same day.
pub fn picker_bounds(row: &Formulario, field: Field) -> PickerBounds {
    let same_day = row.fecha_inicio.is_some() && row.fecha_inicio == row.fecha_final;
    match field {
        Field::FechaInicio => PickerBounds {
            max_date: row.fecha_final,
            ..Default::default()
        },
        Field::FechaFinal => PickerBounds {
            min_date: row.fecha_inicio,
            ..Default::default()
        },
        Field::HoraInicio if same_day => PickerBounds {
            max_time: row.hora_final,
            ..Default::default()
        },
        Field::HoraFinal if same_day => PickerBounds {
            min_time: row.hora_inicio,
            ..Default::default()
        },
        _ => PickerBounds::default(),
    }
}

/// Re-check the full interval with one pending value swapped in.
fn check_interval(row: &Formulario, field: Field, raw: &str) -> Result<(), CommitError> {
    let mut draft = row.clone();
    match field {
        Field::FechaInicio => draft.fecha_inicio = parse_date(raw),
        Field::FechaFinal => draft.fecha_final = parse_date(raw),
        Field::HoraInicio => draft.hora_inicio = parse_time(raw),
        Field::HoraFinal => draft.hora_final = parse_time(raw),
        _ => return Ok(()),
    }
    let Some(interval) = Interval::from_parts(
        draft.fecha_inicio,
        draft.hora_inicio,
        draft.fecha_final,
        draft.hora_final,
    ) else {
        return Ok(());
    };
    interval.validate().map_err(|error| CommitError::Interval {
        error,
        flagged: [Field::FechaFinal, Field::HoraFinal],
    })
}

/// Turn a committed cell value into a one-field patch, validating it the way
/// the server will. Interval cells are checked against the rest of the row.
pub fn commit_cell(row: &Formulario, field: Field, raw: &str) -> Result<FormularioPatch, CommitError> {
    let value = raw.trim();
    let mut patch = FormularioPatch::default();

    // Typed columns have no blank value a patch can express.
    if value.is_empty() && field.cast() != ColumnCast::Text {
        return Err(CommitError::Invalid(format!("{} cannot be blank", field.column())));
    }

    if field.is_interval() {
        check_interval(row, field, value)?;
    }

    match field {
        Field::FechaInicio | Field::FechaFinal => {
            let date = parse_date(value)
                .ok_or_else(|| CommitError::Invalid(format!("'{value}' is not a date")))?;
            if field == Field::FechaInicio {
                patch.fecha_inicio = Some(date);
            } else {
                patch.fecha_final = Some(date);
            }
        }
        Field::HoraInicio | Field::HoraFinal => {
            if parse_time(value).is_none() {
                return Err(CommitError::Invalid(format!("'{value}' is not a time")));
            }
            if field == Field::HoraInicio {
                patch.hora_inicio = Some(value.to_string());
            } else {
                patch.hora_final = Some(value.to_string());
            }
        }
        Field::Cantidad => {
            let cleaned = sanitize_numeric(value);
            let quantity: Decimal = cleaned
                .parse()
                .map_err(|_| CommitError::Invalid(format!("'{value}' is not a quantity")))?;
            patch.cantidad = Some(quantity);
        }
        Field::Sede | Field::Actividad | Field::EstadoSci | Field::Horario => {
            let options = field.options().unwrap_or_default();
            let choice = normalize_choice(value, options)
                .map_or_else(|| value.to_string(), str::to_string);
            match field {
                Field::Sede => patch.sede = Some(choice),
                Field::Actividad => patch.actividad = Some(choice),
                Field::EstadoSci => patch.estado_sci = Some(choice),
                _ => patch.horario = Some(choice),
            }
        }
        Field::Nombres => patch.nombres = Some(value.to_string()),
        Field::Observaciones => patch.observaciones = Some(value.to_string()),
        Field::NoOp
        | Field::SciRef
        | Field::DescripcionReferencia
        | Field::Area
        | Field::Maquina => {
            return Err(CommitError::Invalid(format!(
                "{} is edited through its linked editor",
                field.column()
            )))
        }
    }
    Ok(patch)
}
