//! Row shapes returned by sqlx and their mapping onto core types.

use chrono::{NaiveDate, NaiveTime};
use formulario_core::Formulario;
use rust_decimal::Decimal;

/// Projection used by every statement that returns records. Columns are cast
/// so legacy numeric/varchar drift in the table does not break decoding.
pub(crate) const FORMULARIO_COLUMNS: &str = r#""id"::bigint AS id,
    "cc"::text AS cc,
    "nombres"::text AS nombres,
    "sede"::text AS sede,
    "no_op"::text AS no_op,
    "sci_ref"::text AS sci_ref,
    "descripcion_referencia"::text AS descripcion_referencia,
    "fecha_inicio"::date AS fecha_inicio,
    "hora_inicio"::time AS hora_inicio,
    "fecha_final"::date AS fecha_final,
    "hora_final"::time AS hora_final,
    "actividad"::text AS actividad,
    "cantidad"::numeric AS cantidad,
    "estado_sci"::text AS estado_sci,
    "area"::text AS area,
    "maquina"::text AS maquina,
    "horario"::text AS horario,
    "observaciones"::text AS observaciones"#;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgFormularioRow {
    pub id: i64,
    pub cc: Option<String>,
    pub nombres: Option<String>,
    pub sede: Option<String>,
    pub no_op: Option<String>,
    pub sci_ref: Option<String>,
    pub descripcion_referencia: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub hora_inicio: Option<NaiveTime>,
    pub fecha_final: Option<NaiveDate>,
    pub hora_final: Option<NaiveTime>,
    pub actividad: Option<String>,
    pub cantidad: Option<Decimal>,
    pub estado_sci: Option<String>,
    pub area: Option<String>,
    pub maquina: Option<String>,
    pub horario: Option<String>,
    pub observaciones: Option<String>,
}

impl From<PgFormularioRow> for Formulario {
    fn from(row: PgFormularioRow) -> Self {
        Formulario {
            id: row.id,
            cc: row.cc,
            nombres: row.nombres,
            sede: row.sede,
            no_op: row.no_op,
            sci_ref: row.sci_ref,
            descripcion_referencia: row.descripcion_referencia,
            fecha_inicio: row.fecha_inicio,
            hora_inicio: row.hora_inicio,
            fecha_final: row.fecha_final,
            hora_final: row.hora_final,
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

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgRefRow {
    pub op: String,
    pub sci: String,
    pub descripcion: Option<String>,
}

impl From<PgRefRow> for formulario_core::RefRow {
    fn from(row: PgRefRow) -> Self {
        Self {
            op: row.op,
            sci: row.sci,
            descripcion: row.descripcion,
        }
    }
}
