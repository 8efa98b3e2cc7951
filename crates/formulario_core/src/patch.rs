//! Partial updates.
//!
//! A [`FormularioPatch`] is what callers send: any subset of the editable
//! columns, `None` meaning "leave unchanged". [`ChangeSet::build`] validates
//! it and turns it into an ordered list of typed column assignments that the
//! storage adapters render as `SET "col" = $n[::cast]`.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FormularioError;
use crate::interval::parse_time;
use crate::options::{normalize_choice, ACTIVIDADES, ESTADOS_SCI, HORARIOS, SEDES};
use crate::types::{Formulario, RefRow};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormularioPatch {
    pub nombres: Option<String>,
    pub sede: Option<String>,
    pub no_op: Option<String>,
    pub sci_ref: Option<String>,
    pub descripcion_referencia: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub hora_inicio: Option<String>,
    pub fecha_final: Option<NaiveDate>,
    pub hora_final: Option<String>,
    pub actividad: Option<String>,
    pub cantidad: Option<Decimal>,
    pub estado_sci: Option<String>,
    pub area: Option<String>,
    pub maquina: Option<String>,
    pub horario: Option<String>,
    pub observaciones: Option<String>,
}

impl FormularioPatch {
    pub fn touches_reference(&self) -> bool {
        self.no_op.is_some() || self.sci_ref.is_some()
    }

    pub fn touches_machine(&self) -> bool {
        self.area.is_some() || self.maquina.is_some()
    }

    /// The `(no_op, sci_ref)` pair, trimmed, when both are present.
    pub fn reference_pair(&self) -> Result<Option<(&str, &str)>, FormularioError> {
        match (self.no_op.as_deref(), self.sci_ref.as_deref()) {
            (Some(op), Some(sci)) => Ok(Some((op.trim(), sci.trim()))),
            (None, None) => Ok(None),
            _ => Err(FormularioError::invalid(
                "no_op and sci_ref must be sent together",
            )),
        }
    }

    /// The `(area, maquina)` pair, trimmed, when both are present.
    pub fn machine_pair(&self) -> Result<Option<(&str, &str)>, FormularioError> {
        match (self.area.as_deref(), self.maquina.as_deref()) {
            (Some(area), Some(maquina)) => Ok(Some((area.trim(), maquina.trim()))),
            (None, None) => Ok(None),
            _ => Err(FormularioError::invalid(
                "area and maquina must be sent together",
            )),
        }
    }
}

// ── Columns ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Nombres,
    Sede,
    NoOp,
    SciRef,
    DescripcionReferencia,
    FechaInicio,
    HoraInicio,
    FechaFinal,
    HoraFinal,
    Actividad,
    Cantidad,
    EstadoSci,
    Area,
    Maquina,
    Horario,
    Observaciones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCast {
    Text,
    Date,
    Time,
    Numeric,
}

impl ColumnCast {
    /// Placeholder suffix, e.g. `$3::date`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Text => "",
            Self::Date => "::date",
            Self::Time => "::time",
            Self::Numeric => "::numeric",
        }
    }
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Nombres,
        Field::Sede,
        Field::NoOp,
        Field::SciRef,
        Field::DescripcionReferencia,
        Field::FechaInicio,
        Field::HoraInicio,
        Field::FechaFinal,
        Field::HoraFinal,
        Field::Actividad,
        Field::Cantidad,
        Field::EstadoSci,
        Field::Area,
        Field::Maquina,
        Field::Horario,
        Field::Observaciones,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::Nombres => "nombres",
            Self::Sede => "sede",
            Self::NoOp => "no_op",
            Self::SciRef => "sci_ref",
            Self::DescripcionReferencia => "descripcion_referencia",
            Self::FechaInicio => "fecha_inicio",
            Self::HoraInicio => "hora_inicio",
            Self::FechaFinal => "fecha_final",
            Self::HoraFinal => "hora_final",
            Self::Actividad => "actividad",
            Self::Cantidad => "cantidad",
            Self::EstadoSci => "estado_sci",
            Self::Area => "area",
            Self::Maquina => "maquina",
            Self::Horario => "horario",
            Self::Observaciones => "observaciones",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }

    pub fn cast(self) -> ColumnCast {
        match self {
            Self::FechaInicio | Self::FechaFinal => ColumnCast::Date,
            Self::HoraInicio | Self::HoraFinal => ColumnCast::Time,
            Self::Cantidad => ColumnCast::Numeric,
            _ => ColumnCast::Text,
        }
    }

    pub fn is_interval(self) -> bool {
        matches!(
            self,
            Self::FechaInicio | Self::HoraInicio | Self::FechaFinal | Self::HoraFinal
        )
    }

    /// Known option set for categorical columns, used to canonicalize spelling.
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Sede => Some(SEDES),
            Self::Actividad => Some(ACTIVIDADES),
            Self::EstadoSci => Some(ESTADOS_SCI),
            Self::Horario => Some(HORARIOS),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Numeric(Decimal),
}

impl FieldValue {
    fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Null
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub field: Field,
    pub value: FieldValue,
}

// ── ChangeSet ─────────────────────────────────────────────────

/// Validated, ordered column assignments for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Validate `patch` and translate it into column assignments.
    ///
    /// `reference` is the row found for the patch's `(no_op, sci_ref)` pair; it
    /// must be supplied whenever the patch touches either column, and its
    /// description replaces whatever the caller sent.
    pub fn build(
        patch: &FormularioPatch,
        reference: Option<&RefRow>,
    ) -> Result<Self, FormularioError> {
        let pair = patch.reference_pair()?;
        patch.machine_pair()?;

        let reference = match (pair, reference) {
            (Some((op, sci)), Some(row)) if row.op.trim() == op && row.sci.trim() == sci => {
                Some(row)
            }
            (Some((op, sci)), _) => {
                return Err(FormularioError::InvalidReference {
                    op: op.to_string(),
                    sci: sci.to_string(),
                })
            }
            (None, _) if patch.descripcion_referencia.is_some() => {
                return Err(FormularioError::invalid(
                    "descripcion_referencia is derived from no_op and sci_ref",
                ))
            }
            (None, _) => None,
        };

        let mut changes = Vec::new();
        for field in Field::ALL {
            let value = match field {
                Field::NoOp => reference.map(|r| FieldValue::text(&r.op)),
                Field::SciRef => reference.map(|r| FieldValue::text(&r.sci)),
                Field::DescripcionReferencia => reference.map(|r| {
                    r.descripcion
                        .as_deref()
                        .map_or(FieldValue::Null, FieldValue::text)
                }),
                Field::FechaInicio => patch.fecha_inicio.map(FieldValue::Date),
                Field::FechaFinal => patch.fecha_final.map(FieldValue::Date),
                Field::HoraInicio => time_value(field, patch.hora_inicio.as_deref())?,
                Field::HoraFinal => time_value(field, patch.hora_final.as_deref())?,
                Field::Cantidad => match patch.cantidad {
                    Some(q) if q < Decimal::ZERO => {
                        return Err(FormularioError::invalid(format!(
                            "cantidad must be zero or positive, got {q}"
                        )))
                    }
                    Some(q) => Some(FieldValue::Numeric(q)),
                    None => None,
                },
                _ => text_value(field, patch),
            };
            if let Some(value) = value {
                changes.push(Change { field, value });
            }
        }
        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.changes
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.value)
    }

    pub fn touches_interval(&self) -> bool {
        self.changes.iter().any(|c| c.field.is_interval())
    }

    /// [`apply_to`](Self::apply_to), rejecting a merged row whose interval is
    /// broken. Rows with an incomplete interval are not checked.
    pub fn apply_checked(&self, row: &Formulario) -> Result<Formulario, FormularioError> {
        let merged = self.apply_to(row);
        if self.touches_interval() {
            if let Some(interval) = merged.interval() {
                interval.validate()?;
            }
        }
        Ok(merged)
    }

    /// The row as it would read after this change set is written.
    pub fn apply_to(&self, row: &Formulario) -> Formulario {
        let mut out = row.clone();
        for Change { field, value } in &self.changes {
            let value = value.clone();
            match field {
                Field::FechaInicio => out.fecha_inicio = as_date(value),
                Field::FechaFinal => out.fecha_final = as_date(value),
                Field::HoraInicio => out.hora_inicio = as_time(value),
                Field::HoraFinal => out.hora_final = as_time(value),
                Field::Cantidad => {
                    out.cantidad = match value {
                        FieldValue::Numeric(q) => Some(q),
                        _ => None,
                    }
                }
                Field::Nombres => out.nombres = value.into_text(),
                Field::Sede => out.sede = value.into_text(),
                Field::NoOp => out.no_op = value.into_text(),
                Field::SciRef => out.sci_ref = value.into_text(),
                Field::DescripcionReferencia => out.descripcion_referencia = value.into_text(),
                Field::Actividad => out.actividad = value.into_text(),
                Field::EstadoSci => out.estado_sci = value.into_text(),
                Field::Area => out.area = value.into_text(),
                Field::Maquina => out.maquina = value.into_text(),
                Field::Horario => out.horario = value.into_text(),
                Field::Observaciones => out.observaciones = value.into_text(),
            }
        }
        out
    }
}

fn as_date(value: FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(d),
        _ => None,
    }
}

fn as_time(value: FieldValue) -> Option<NaiveTime> {
    match value {
        FieldValue::Time(t) => Some(t),
        _ => None,
    }
}

fn time_value(field: Field, raw: Option<&str>) -> Result<Option<FieldValue>, FormularioError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    parse_time(raw).map(|t| Some(FieldValue::Time(t))).ok_or_else(|| {
        FormularioError::invalid(format!(
            "{}: '{raw}' is not a valid time (HH:MM)",
            field.column()
        ))
    })
}

fn text_value(field: Field, patch: &FormularioPatch) -> Option<FieldValue> {
    let raw = match field {
        Field::Nombres => &patch.nombres,
        Field::Sede => &patch.sede,
        Field::Actividad => &patch.actividad,
        Field::EstadoSci => &patch.estado_sci,
        Field::Area => &patch.area,
        Field::Maquina => &patch.maquina,
        Field::Horario => &patch.horario,
        Field::Observaciones => &patch.observaciones,
        _ => return None,
    };
    let raw = raw.as_deref()?;
    // Known spellings are canonicalized; anything else is stored as sent.
    let value = match (field.options(), FieldValue::text(raw)) {
        (Some(options), FieldValue::Text(text)) => match normalize_choice(&text, options) {
            Some(canonical) => FieldValue::Text(canonical.to_string()),
            None => FieldValue::Text(text),
        },
        (_, value) => value,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ref_row(op: &str, sci: &str, descripcion: Option<&str>) -> RefRow {
        RefRow {
            op: op.into(),
            sci: sci.into(),
            descripcion: descripcion.map(str::to_string),
        }
    }

    #[test]
    fn empty_patch_builds_empty_change_set() {
        let set = ChangeSet::build(&FormularioPatch::default(), None).unwrap();
        assert!(set.is_empty());
        assert!(!set.touches_interval());
    }

    #[test]
    fn fields_are_emitted_in_column_order() {
        let patch = FormularioPatch {
            observaciones: Some("Sin novedad".into()),
            nombres: Some("Ana".into()),
            fecha_final: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        let cols: Vec<_> = set.iter().map(|c| c.field.column()).collect();
        assert_eq!(cols, vec!["nombres", "fecha_final", "observaciones"]);
        assert!(set.touches_interval());
    }

    #[test]
    fn casts_follow_column_types() {
        assert_eq!(Field::FechaInicio.cast().suffix(), "::date");
        assert_eq!(Field::HoraFinal.cast().suffix(), "::time");
        assert_eq!(Field::Cantidad.cast().suffix(), "::numeric");
        assert_eq!(Field::Nombres.cast().suffix(), "");
        assert_eq!(Field::from_column("sci_ref"), Some(Field::SciRef));
        assert_eq!(Field::from_column("id"), None);
    }

    #[test]
    fn only_no_op_is_rejected() {
        let patch = FormularioPatch {
            no_op: Some("OP-100".into()),
            ..Default::default()
        };
        let err = ChangeSet::build(&patch, None).unwrap_err();
        assert!(matches!(err, FormularioError::InvalidInput(_)));
    }

    #[test]
    fn pair_without_reference_row_is_rejected() {
        let patch = FormularioPatch {
            no_op: Some("OP-100".into()),
            sci_ref: Some("999".into()),
            ..Default::default()
        };
        let err = ChangeSet::build(&patch, None).unwrap_err();
        assert!(matches!(err, FormularioError::InvalidReference { .. }));
    }

    #[test]
    fn mismatched_reference_row_is_rejected() {
        let patch = FormularioPatch {
            no_op: Some("OP-100".into()),
            sci_ref: Some("512".into()),
            ..Default::default()
        };
        let other = ref_row("OP-200", "512", Some("Tapa"));
        assert!(ChangeSet::build(&patch, Some(&other)).is_err());
    }

    #[test]
    fn reference_description_overrides_caller_value() {
        let patch = FormularioPatch {
            no_op: Some(" OP-100 ".into()),
            sci_ref: Some("512".into()),
            descripcion_referencia: Some("lo que el usuario escribió".into()),
            ..Default::default()
        };
        let reference = ref_row("OP-100", "512", Some("Tapa rosca 38mm"));
        let set = ChangeSet::build(&patch, Some(&reference)).unwrap();
        assert_eq!(
            set.get(Field::DescripcionReferencia),
            Some(&FieldValue::Text("Tapa rosca 38mm".into()))
        );
        assert_eq!(set.get(Field::NoOp), Some(&FieldValue::Text("OP-100".into())));
    }

    #[test]
    fn missing_reference_description_clears_the_column() {
        let patch = FormularioPatch {
            no_op: Some("OP-100".into()),
            sci_ref: Some("512".into()),
            ..Default::default()
        };
        let reference = ref_row("OP-100", "512", None);
        let set = ChangeSet::build(&patch, Some(&reference)).unwrap();
        assert_eq!(set.get(Field::DescripcionReferencia), Some(&FieldValue::Null));
    }

    #[test]
    fn description_alone_is_rejected() {
        let patch = FormularioPatch {
            descripcion_referencia: Some("manual".into()),
            ..Default::default()
        };
        assert!(ChangeSet::build(&patch, None).is_err());
    }

    #[test]
    fn area_without_machine_is_rejected() {
        let patch = FormularioPatch {
            area: Some("Inyección".into()),
            ..Default::default()
        };
        assert!(ChangeSet::build(&patch, None).is_err());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let patch = FormularioPatch {
            cantidad: Some(Decimal::from_str("-1.5").unwrap()),
            ..Default::default()
        };
        assert!(ChangeSet::build(&patch, None).is_err());

        let zero = FormularioPatch {
            cantidad: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(ChangeSet::build(&zero, None).is_ok());
    }

    #[test]
    fn bad_time_is_rejected() {
        let patch = FormularioPatch {
            hora_inicio: Some("7 am".into()),
            ..Default::default()
        };
        let err = ChangeSet::build(&patch, None).unwrap_err();
        assert!(err.to_string().contains("hora_inicio"));
    }

    #[test]
    fn categorical_values_are_canonicalized() {
        let patch = FormularioPatch {
            actividad: Some("produccion".into()),
            horario: Some("TURNO_1".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        assert_eq!(set.get(Field::Actividad), Some(&FieldValue::Text("Producción".into())));
        assert_eq!(set.get(Field::Horario), Some(&FieldValue::Text("Turno 1".into())));
    }

    #[test]
    fn unknown_categorical_value_is_stored_as_sent() {
        let patch = FormularioPatch {
            sede: Some(" Planta Girardota ".into()),
            horario: Some("Nocturno".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        assert_eq!(set.get(Field::Sede), Some(&FieldValue::Text("Planta Girardota".into())));
        assert_eq!(set.get(Field::Horario), Some(&FieldValue::Text("Nocturno".into())));
    }

    #[test]
    fn blank_text_clears_the_column() {
        let patch = FormularioPatch {
            observaciones: Some("   ".into()),
            sede: Some("".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        assert_eq!(set.get(Field::Observaciones), Some(&FieldValue::Null));
        assert_eq!(set.get(Field::Sede), Some(&FieldValue::Null));
    }

    #[test]
    fn apply_to_merges_over_current_row() {
        let row = Formulario {
            id: 3,
            nombres: Some("Ana".into()),
            hora_inicio: NaiveTime::from_hms_opt(6, 0, 0),
            observaciones: Some("Otro".into()),
            ..Default::default()
        };
        let patch = FormularioPatch {
            hora_inicio: Some("07:30".into()),
            observaciones: Some("".into()),
            ..Default::default()
        };
        let merged = ChangeSet::build(&patch, None).unwrap().apply_to(&row);
        assert_eq!(merged.nombres.as_deref(), Some("Ana"));
        assert_eq!(merged.hora_inicio, NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(merged.observaciones, None);
        assert_eq!(merged.id, 3);
    }

    #[test]
    fn apply_checked_rejects_end_before_start() {
        let row = Formulario {
            id: 1,
            fecha_inicio: NaiveDate::from_ymd_opt(2024, 5, 1),
            hora_inicio: NaiveTime::from_hms_opt(8, 0, 0),
            fecha_final: NaiveDate::from_ymd_opt(2024, 5, 1),
            hora_final: NaiveTime::from_hms_opt(16, 0, 0),
            ..Default::default()
        };
        let patch = FormularioPatch {
            hora_final: Some("07:00".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        assert!(matches!(
            set.apply_checked(&row),
            Err(FormularioError::Interval(_))
        ));
    }

    #[test]
    fn apply_checked_skips_incomplete_intervals() {
        let row = Formulario {
            id: 1,
            ..Default::default()
        };
        let patch = FormularioPatch {
            hora_final: Some("07:00".into()),
            ..Default::default()
        };
        let set = ChangeSet::build(&patch, None).unwrap();
        assert!(set.apply_checked(&row).is_ok());
    }
}
