//! Column catalogue for the grid.

use formulario_core::options::{
    normalize_choice, ACTIVIDADES, ESTADOS_SCI, HORARIOS, MOTIVOS_OBSERVACION, SEDES,
};
use formulario_core::{Field, Formulario};

/// Which editor a column opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    ReadOnly,
    Text,
    Choice(&'static [&'static str]),
    Numeric,
    Date,
    Time,
    /// Work order / SCI modal.
    LinkedReference,
    /// Area / machine modal.
    LinkedMachine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridColumn {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: ColumnKind,
}

pub const COLUMNS: &[GridColumn] = &[
    GridColumn { key: "id", title: "ID", kind: ColumnKind::ReadOnly },
    GridColumn { key: "cc", title: "C.C.", kind: ColumnKind::ReadOnly },
    GridColumn { key: "nombres", title: "Nombres", kind: ColumnKind::Text },
    GridColumn { key: "sede", title: "Sede", kind: ColumnKind::Choice(SEDES) },
    GridColumn { key: "no_op", title: "O.P.", kind: ColumnKind::LinkedReference },
    GridColumn { key: "sci_ref", title: "SCI Ref.", kind: ColumnKind::LinkedReference },
    GridColumn {
        key: "descripcion_referencia",
        title: "Descripción referencia",
        kind: ColumnKind::ReadOnly,
    },
    GridColumn { key: "fecha_inicio", title: "Fecha inicio", kind: ColumnKind::Date },
    GridColumn { key: "hora_inicio", title: "Hora inicio", kind: ColumnKind::Time },
    GridColumn { key: "fecha_final", title: "Fecha final", kind: ColumnKind::Date },
    GridColumn { key: "hora_final", title: "Hora final", kind: ColumnKind::Time },
    GridColumn { key: "actividad", title: "Actividad", kind: ColumnKind::Choice(ACTIVIDADES) },
    GridColumn { key: "cantidad", title: "Cantidad", kind: ColumnKind::Numeric },
    GridColumn { key: "estado_sci", title: "Estado SCI", kind: ColumnKind::Choice(ESTADOS_SCI) },
    GridColumn { key: "area", title: "Área", kind: ColumnKind::LinkedMachine },
    GridColumn { key: "maquina", title: "Máquina", kind: ColumnKind::LinkedMachine },
    GridColumn { key: "horario", title: "Horario", kind: ColumnKind::Choice(HORARIOS) },
    GridColumn {
        key: "observaciones",
        title: "Observaciones",
        kind: ColumnKind::Choice(MOTIVOS_OBSERVACION),
    },
];

impl GridColumn {
    pub fn by_key(key: &str) -> Option<&'static GridColumn> {
        COLUMNS.iter().find(|c| c.key == key)
    }

    pub fn field(&self) -> Option<Field> {
        Field::from_column(self.key)
    }

    pub fn is_editable(&self) -> bool {
        self.kind != ColumnKind::ReadOnly
    }

    /// Cell text as rendered. Times are cut to `HH:MM`.
    pub fn display(&self, row: &Formulario) -> String {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        match self.key {
            "id" => row.id.to_string(),
            "cc" => text(&row.cc),
            "nombres" => text(&row.nombres),
            "sede" => text(&row.sede),
            "no_op" => text(&row.no_op),
            "sci_ref" => text(&row.sci_ref),
            "descripcion_referencia" => text(&row.descripcion_referencia),
            "fecha_inicio" => row.fecha_inicio.map(|d| d.to_string()).unwrap_or_default(),
            "hora_inicio" => row.hora_inicio.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            "fecha_final" => row.fecha_final.map(|d| d.to_string()).unwrap_or_default(),
            "hora_final" => row.hora_final.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            "actividad" => text(&row.actividad),
            "cantidad" => row.cantidad.map(|c| c.normalize().to_string()).unwrap_or_default(),
            "estado_sci" => text(&row.estado_sci),
            "area" => text(&row.area),
            "maquina" => text(&row.maquina),
            "horario" => text(&row.horario),
            "observaciones" => text(&row.observaciones),
            _ => String::new(),
        }
    }

    /// Preselected option for a choice editor. Unrecognized stored values
    /// select nothing.
    pub fn selected_choice(&self, row: &Formulario) -> Option<&'static str> {
        match self.kind {
            ColumnKind::Choice(options) => normalize_choice(&self.display(row), options),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn every_editable_column_maps_to_a_patch_field() {
        for column in COLUMNS.iter().filter(|c| c.is_editable()) {
            assert!(column.field().is_some(), "{} has no field", column.key);
        }
    }

    #[test]
    fn identity_and_description_are_read_only() {
        for key in ["id", "cc", "descripcion_referencia"] {
            assert!(!GridColumn::by_key(key).unwrap().is_editable());
        }
    }

    #[test]
    fn legacy_spelling_preselects_canonical_option() {
        let row = Formulario {
            actividad: Some("PRODUCCION".into()),
            horario: Some("turno_9".into()),
            ..Default::default()
        };
        let actividad = GridColumn::by_key("actividad").unwrap();
        assert_eq!(actividad.selected_choice(&row), Some("Producción"));
        let horario = GridColumn::by_key("horario").unwrap();
        assert_eq!(horario.selected_choice(&row), None);
    }

    #[test]
    fn times_display_without_seconds() {
        let row = Formulario {
            hora_inicio: NaiveTime::from_hms_opt(6, 5, 30),
            ..Default::default()
        };
        assert_eq!(GridColumn::by_key("hora_inicio").unwrap().display(&row), "06:05");
    }
}
