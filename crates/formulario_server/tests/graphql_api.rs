//! Schema-level tests over the in-memory stores.

use std::sync::Arc;

use async_graphql::{Request, Variables};
use chrono::{NaiveDate, NaiveTime};
use formulario_core::memory::{MemoryFormularioStore, MemoryReferenceStore};
use formulario_core::options;
use formulario_core::{Formulario, FormularioService};
use formulario_server::{build_schema, FormularioSchema};
use serde_json::{json, Value};

// ── Fixture ────────────────────────────────────────────────────

fn row(id: i64, day: u32, nombres: &str) -> Formulario {
    Formulario {
        id,
        cc: Some(format!("10{id}")),
        nombres: Some(nombres.to_string()),
        fecha_inicio: NaiveDate::from_ymd_opt(2024, 5, day),
        hora_inicio: NaiveTime::from_hms_opt(6, 0, 0),
        fecha_final: NaiveDate::from_ymd_opt(2024, 5, day),
        hora_final: NaiveTime::from_hms_opt(14, 0, 0),
        descripcion_referencia: Some("Texto escrito a mano".into()),
        ..Default::default()
    }
}

fn setup() -> (FormularioSchema, Arc<MemoryFormularioStore>) {
    let records = Arc::new(MemoryFormularioStore::with_rows(vec![
        row(1, 1, "Ana Pérez"),
        row(2, 2, "Luis Gómez"),
        row(3, 3, "Ana María Ruiz"),
        row(4, 4, "Carlos Pérez"),
        row(5, 5, "Sofía Díaz"),
    ]));
    let reference = Arc::new(
        MemoryReferenceStore::default()
            .with_reference("OP-100", "512", Some("Tapa rosca 38mm"))
            .with_reference("OP-100", "530", None)
            .with_reference("OP-100", "610", Some("Envase 1L"))
            .with_reference("OP-200", "500", Some("Preforma"))
            .with_machine("Inyección", "INY-01")
            .with_machine("Inyección", "INY-02")
            .with_machine("Soplado", "SOP-07"),
    );
    let service = Arc::new(FormularioService::new(records.clone(), reference));
    (build_schema(service), records)
}

async fn run(schema: &FormularioSchema, query: &str, variables: Value) -> Value {
    let request = Request::new(query).variables(Variables::from_json(variables));
    let response = schema.execute(request).await;
    serde_json::to_value(&response).unwrap()
}

fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("no error code in {response}"))
}

const LIST: &str = r#"
    query ($limit: Int, $offset: Int, $q: String, $dateFrom: String, $dateTo: String, $noOp: String) {
        formularios(limit: $limit, offset: $offset, q: $q, dateFrom: $dateFrom, dateTo: $dateTo, no_op: $noOp) {
            count total items { id nombres }
        }
    }"#;

const UPDATE: &str = r#"
    mutation ($id: ID!, $patch: FormularioPatch!) {
        updateFormulario(id: $id, patch: $patch) {
            id no_op sci_ref descripcion_referencia hora_final actividad cantidad area maquina
        }
    }"#;

const BATCH: &str = r#"
    mutation ($updates: [UpdateInput!]!) { updateMultiplesFormularios(updates: $updates) }"#;

fn ids(response: &Value) -> Vec<i64> {
    response["data"]["formularios"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

// ── formularios ────────────────────────────────────────────────

#[tokio::test]
async fn first_page_counts_and_orders_newest_first() {
    let (schema, _) = setup();
    let response = run(&schema, LIST, json!({ "limit": 2, "offset": 0 })).await;
    assert_eq!(response["data"]["formularios"]["count"], 2);
    assert_eq!(response["data"]["formularios"]["total"], 5);
    assert_eq!(ids(&response), vec![5, 4]);
}

#[tokio::test]
async fn last_page_is_short_but_total_is_stable() {
    let (schema, _) = setup();
    let response = run(&schema, LIST, json!({ "limit": 2, "offset": 4 })).await;
    assert_eq!(response["data"]["formularios"]["count"], 1);
    assert_eq!(response["data"]["formularios"]["total"], 5);
}

#[tokio::test]
async fn q_matches_all_name_words() {
    let (schema, _) = setup();
    let response = run(&schema, LIST, json!({ "q": "ana perez" })).await;
    // accents are not folded by the filter: "Pérez" does not contain "perez"
    assert_eq!(response["data"]["formularios"]["total"], 0);

    let response = run(&schema, LIST, json!({ "q": "ana pérez" })).await;
    assert_eq!(ids(&response), vec![1]);

    let response = run(&schema, LIST, json!({ "q": "103" })).await;
    assert_eq!(ids(&response), vec![3]);
}

#[tokio::test]
async fn reversed_date_bounds_give_the_same_rows() {
    let (schema, _) = setup();
    let forward = run(&schema, LIST, json!({ "dateFrom": "2024-05-02", "dateTo": "2024-05-04" })).await;
    let reversed = run(&schema, LIST, json!({ "dateFrom": "2024-05-04", "dateTo": "2024-05-02" })).await;
    assert_eq!(ids(&forward), vec![4, 3, 2]);
    assert_eq!(ids(&forward), ids(&reversed));
}

#[tokio::test]
async fn blank_dates_are_ignored_and_bad_dates_rejected() {
    let (schema, _) = setup();
    let response = run(&schema, LIST, json!({ "dateFrom": "", "dateTo": " " })).await;
    assert_eq!(response["data"]["formularios"]["total"], 5);

    let response = run(&schema, LIST, json!({ "dateFrom": "ayer" })).await;
    assert_eq!(error_code(&response), "BAD_USER_INPUT");
}

// ── formulario / lookups ───────────────────────────────────────

#[tokio::test]
async fn single_lookup_by_id_or_cc() {
    let (schema, _) = setup();
    let response = run(&schema, r#"{ formulario(id: "3") { nombres } }"#, json!({})).await;
    assert_eq!(response["data"]["formulario"]["nombres"], "Ana María Ruiz");

    let response = run(&schema, r#"{ formulario(cc: "104") { id } }"#, json!({})).await;
    assert_eq!(response["data"]["formulario"]["id"], 4);

    let response = run(&schema, r#"{ formulario(id: "99") { id } }"#, json!({})).await;
    assert!(response["data"]["formulario"].is_null());

    let response = run(&schema, r#"{ formulario { id } }"#, json!({})).await;
    assert_eq!(error_code(&response), "BAD_USER_INPUT");
}

#[tokio::test]
async fn sci_lookup_is_scoped_to_work_order() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        r#"{ buscarSciPorOp(op: "OP-100", prefix: "5") }"#,
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["buscarSciPorOp"], json!(["512", "530"]));
}

#[tokio::test]
async fn reference_and_machine_lookups() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        r#"{
            buscarOpsExcel(prefix: "op")
            refPorOpSci(op: "OP-200", sci: "500") { op sci descripcion }
            missing: refPorOpSci(op: "OP-200", sci: "999") { op }
            ctpnList
            maquinasPorCtpn(ctpn: "Inyección")
        }"#,
        json!({}),
    )
    .await;
    let data = &response["data"];
    assert_eq!(data["buscarOpsExcel"], json!(["OP-100", "OP-200"]));
    assert_eq!(data["refPorOpSci"]["descripcion"], "Preforma");
    assert!(data["missing"].is_null());
    assert_eq!(data["ctpnList"], json!(["Inyección", "Soplado"]));
    assert_eq!(data["maquinasPorCtpn"], json!(["INY-01", "INY-02"]));
}

#[tokio::test]
async fn option_lists_come_from_the_core_definitions() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        "{ opciones { sede actividad estado_sci horario observaciones } }",
        json!({}),
    )
    .await;
    let lists = &response["data"]["opciones"];
    assert_eq!(lists["sede"], json!(options::SEDES));
    assert_eq!(lists["actividad"], json!(options::ACTIVIDADES));
    assert_eq!(lists["estado_sci"], json!(options::ESTADOS_SCI));
    assert_eq!(lists["horario"], json!(options::HORARIOS));
    assert_eq!(lists["observaciones"], json!(options::MOTIVOS_OBSERVACION));
}

// ── updateFormulario ───────────────────────────────────────────

#[tokio::test]
async fn work_order_alone_is_rejected() {
    let (schema, records) = setup();
    let response = run(&schema, UPDATE, json!({ "id": "1", "patch": { "no_op": "OP-100" } })).await;
    assert_eq!(error_code(&response), "BAD_USER_INPUT");
    assert_eq!(records.get(1).await.unwrap().no_op, None);
}

#[tokio::test]
async fn unknown_pair_is_rejected_without_writing() {
    let (schema, records) = setup();
    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "1", "patch": { "no_op": "OP-200", "sci_ref": "512" } }),
    )
    .await;
    assert_eq!(error_code(&response), "INVALID_REFERENCE");
    assert_eq!(records.get(1).await.unwrap().sci_ref, None);
}

#[tokio::test]
async fn valid_pair_overwrites_description() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "2", "patch": {
            "no_op": "OP-100", "sci_ref": "512", "descripcion_referencia": "lo que sea"
        } }),
    )
    .await;
    let row = &response["data"]["updateFormulario"];
    assert_eq!(row["descripcion_referencia"], "Tapa rosca 38mm");

    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "2", "patch": { "no_op": "OP-100", "sci_ref": "530" } }),
    )
    .await;
    assert!(response["data"]["updateFormulario"]["descripcion_referencia"].is_null());
}

#[tokio::test]
async fn interval_violations_are_rejected() {
    let (schema, records) = setup();
    let response = run(&schema, UPDATE, json!({ "id": "3", "patch": { "hora_final": "05:00" } })).await;
    assert_eq!(error_code(&response), "INVALID_INTERVAL");

    let response = run(&schema, UPDATE, json!({ "id": "3", "patch": { "fecha_final": "2024-05-04" } })).await;
    assert_eq!(error_code(&response), "INVALID_INTERVAL");
    assert_eq!(records.get(3).await.unwrap().fecha_final, NaiveDate::from_ymd_opt(2024, 5, 3));
}

#[tokio::test]
async fn typed_fields_are_translated() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "4", "patch": {
            "hora_final": "15:30", "actividad": "PRODUCCION", "cantidad": "12.5",
            "area": "Soplado", "maquina": "SOP-07"
        } }),
    )
    .await;
    let row = &response["data"]["updateFormulario"];
    assert_eq!(row["hora_final"], "15:30:00");
    assert_eq!(row["actividad"], "Producción");
    assert_eq!(row["cantidad"], "12.5");
    assert_eq!(row["maquina"], "SOP-07");
}

#[tokio::test]
async fn categorical_values_outside_the_known_lists_are_kept() {
    let (schema, records) = setup();
    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "1", "patch": { "sede": "Planta Girardota", "horario": "Nocturno" } }),
    )
    .await;
    assert!(response["errors"].is_null(), "{response}");
    let row = records.get(1).await.unwrap();
    assert_eq!(row.sede.as_deref(), Some("Planta Girardota"));
    assert_eq!(row.horario.as_deref(), Some("Nocturno"));
}

#[tokio::test]
async fn machine_from_another_area_is_rejected() {
    let (schema, _) = setup();
    let response = run(
        &schema,
        UPDATE,
        json!({ "id": "4", "patch": { "area": "Soplado", "maquina": "INY-01" } }),
    )
    .await;
    assert_eq!(error_code(&response), "INVALID_REFERENCE");
}

#[tokio::test]
async fn missing_row_is_not_found() {
    let (schema, _) = setup();
    let response = run(&schema, UPDATE, json!({ "id": "77", "patch": { "nombres": "X" } })).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

// ── updateMultiplesFormularios ─────────────────────────────────

#[tokio::test]
async fn batch_commits_all_updates() {
    let (schema, records) = setup();
    let response = run(
        &schema,
        BATCH,
        json!({ "updates": [
            { "id": "1", "patch": { "nombres": "Uno" } },
            { "id": "2", "patch": { "horario": "turno 2" } }
        ] }),
    )
    .await;
    assert_eq!(response["data"]["updateMultiplesFormularios"], true);
    assert_eq!(records.get(1).await.unwrap().nombres.as_deref(), Some("Uno"));
    assert_eq!(records.get(2).await.unwrap().horario.as_deref(), Some("Turno 2"));
}

#[tokio::test]
async fn batch_with_legacy_category_value_commits() {
    let (schema, records) = setup();
    let response = run(
        &schema,
        BATCH,
        json!({ "updates": [
            { "id": "1", "patch": { "nombres": "Ana" } },
            { "id": "2", "patch": { "sede": "Planta Girardota" } }
        ] }),
    )
    .await;
    assert_eq!(response["data"]["updateMultiplesFormularios"], true);
    assert_eq!(records.get(1).await.unwrap().nombres.as_deref(), Some("Ana"));
    assert_eq!(records.get(2).await.unwrap().sede.as_deref(), Some("Planta Girardota"));
}

#[tokio::test]
async fn batch_failure_rolls_back_everything() {
    let (schema, records) = setup();
    let response = run(
        &schema,
        BATCH,
        json!({ "updates": [
            { "id": "1", "patch": { "nombres": "Uno" } },
            { "id": "2", "patch": { "hora_final": "23:30" } }
        ] }),
    )
    .await;
    assert_eq!(error_code(&response), "INVALID_INTERVAL");
    assert_eq!(records.get(1).await.unwrap().nombres.as_deref(), Some("Ana Pérez"));
}

#[tokio::test]
async fn empty_batch_is_true() {
    let (schema, _) = setup();
    let response = run(&schema, BATCH, json!({ "updates": [] })).await;
    assert_eq!(response["data"]["updateMultiplesFormularios"], true);
}
