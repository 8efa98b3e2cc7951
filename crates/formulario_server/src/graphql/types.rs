//! GraphQL object and input types, and their mapping to core types.
//!
//! Field names stay snake_case to match the table columns the grid binds to.

use async_graphql::{InputObject, SimpleObject, ID};
use formulario_core::options::{ACTIVIDADES, ESTADOS_SCI, HORARIOS, MOTIVOS_OBSERVACION, SEDES};
use formulario_core::{Formulario, FormularioPage, FormularioPatch, RefRow};
use rust_decimal::Decimal;

use super::scalars::Date;

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Formulario", rename_fields = "snake_case")]
pub struct FormularioObject {
    pub id: i64,
    pub cc: Option<String>,
    pub nombres: Option<String>,
    pub sede: Option<String>,
    pub no_op: Option<String>,
    pub sci_ref: Option<String>,
    pub descripcion_referencia: Option<String>,
    pub fecha_inicio: Option<Date>,
    /// `HH:MM:SS`
    pub hora_inicio: Option<String>,
    pub fecha_final: Option<Date>,
    pub hora_final: Option<String>,
    pub actividad: Option<String>,
    pub cantidad: Option<Decimal>,
    pub estado_sci: Option<String>,
    pub area: Option<String>,
    pub maquina: Option<String>,
    pub horario: Option<String>,
    pub observaciones: Option<String>,
}

impl From<Formulario> for FormularioObject {
    fn from(row: Formulario) -> Self {
        let time = |t: Option<chrono::NaiveTime>| t.map(|t| t.format("%H:%M:%S").to_string());
        Self {
            id: row.id,
            cc: row.cc,
            nombres: row.nombres,
            sede: row.sede,
            no_op: row.no_op,
            sci_ref: row.sci_ref,
            descripcion_referencia: row.descripcion_referencia,
            fecha_inicio: row.fecha_inicio.map(Date),
            hora_inicio: time(row.hora_inicio),
            fecha_final: row.fecha_final.map(Date),
            hora_final: time(row.hora_final),
            actividad: row.actividad,
            cantidad: row.cantidad,
            estado_sci: row.estado_sci,
            area: row.area,
            maquina: row.maquina,
            horario: row.horario,
            observaciones: row.observaciones,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct FormulariosResult {
    pub items: Vec<FormularioObject>,
    /// Rows in this page.
    pub count: i64,
    /// Rows matching the filters, ignoring paging.
    pub total: i64,
}

impl From<FormularioPage> for FormulariosResult {
    fn from(page: FormularioPage) -> Self {
        Self {
            count: page.count(),
            total: page.total,
            items: page.items.into_iter().map(FormularioObject::from).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "RefRow")]
pub struct RefRowObject {
    pub op: String,
    pub sci: String,
    pub descripcion: Option<String>,
}

impl From<RefRow> for RefRowObject {
    fn from(row: RefRow) -> Self {
        Self {
            op: row.op,
            sci: row.sci,
            descripcion: row.descripcion,
        }
    }
}

/// Option lists for the grid's categorical editors.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Opciones", rename_fields = "snake_case")]
pub struct OpcionesObject {
    pub sede: Vec<String>,
    pub actividad: Vec<String>,
    pub estado_sci: Vec<String>,
    pub horario: Vec<String>,
    pub observaciones: Vec<String>,
}

impl OpcionesObject {
    pub fn known() -> Self {
        let list = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        Self {
            sede: list(SEDES),
            actividad: list(ACTIVIDADES),
            estado_sci: list(ESTADOS_SCI),
            horario: list(HORARIOS),
            observaciones: list(MOTIVOS_OBSERVACION),
        }
    }
}

/// Partial update. Absent or null keys leave the column untouched.
#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "FormularioPatch", rename_fields = "snake_case")]
pub struct FormularioPatchInput {
    pub nombres: Option<String>,
    pub sede: Option<String>,
    pub no_op: Option<String>,
    pub sci_ref: Option<String>,
    pub descripcion_referencia: Option<String>,
    pub fecha_inicio: Option<Date>,
    pub hora_inicio: Option<String>,
    pub fecha_final: Option<Date>,
    pub hora_final: Option<String>,
    pub actividad: Option<String>,
    pub cantidad: Option<Decimal>,
    pub estado_sci: Option<String>,
    pub area: Option<String>,
    pub maquina: Option<String>,
    pub horario: Option<String>,
    pub observaciones: Option<String>,
}

impl From<FormularioPatchInput> for FormularioPatch {
    fn from(input: FormularioPatchInput) -> Self {
        Self {
            nombres: input.nombres,
            sede: input.sede,
            no_op: input.no_op,
            sci_ref: input.sci_ref,
            descripcion_referencia: input.descripcion_referencia,
            fecha_inicio: input.fecha_inicio.map(|d| d.0),
            hora_inicio: input.hora_inicio,
            fecha_final: input.fecha_final.map(|d| d.0),
            hora_final: input.hora_final,
            actividad: input.actividad,
            cantidad: input.cantidad,
            estado_sci: input.estado_sci,
            area: input.area,
            maquina: input.maquina,
            horario: input.horario,
            observaciones: input.observaciones,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateInput {
    pub id: ID,
    pub patch: FormularioPatchInput,
}
