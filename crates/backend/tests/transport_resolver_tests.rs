//! Цепочка транспортов против локального HTTP-сервера

mod common;

use axum::{http::StatusCode, routing::get, Json, Router};
use backend::usecases::u101_load_warranty_data::{
    CsvExportTransport, RowTransport, ScriptTransport, TransportResolver,
};
use serde_json::json;
use std::time::Duration;

const ACTIVE_CSV: &str = "\u{feff}FECHA,NOMBRE DEL EQUIPO,MARCA DEL EQUIPO,IMEI MALO,TIENDA,EQUIPO PROCESADO,PRECIO\n\
05/01/2024,iPhone 13,Apple,3548,K24 Norte,SI,$750\n\
,,,,,,\n\
2024-01-06,Galaxy A54,Samsung,3549,K24 Sur,NO,\"$1,250.00\"\n";

const HISTORY_CSV: &str = "Fecha,Nombre del equipo,IMEI malo,Imei entregado al cliente\n\
2023-12-01,Moto G,1111,2222\n";

fn sheet_server() -> Router {
    Router::new()
        .route(
            "/script/error",
            get(|| async { Json(json!([{ "error": "Sheet BD not found" }])) }),
        )
        .route(
            "/script/ok",
            get(|| async {
                Json(json!({ "data": [
                    { "fecha": "2024-02-01", "nombreEquipo": "Pixel 7", "precio": 400, "equipoProcesado": true }
                ]}))
            }),
        )
        .route(
            "/relay/html",
            get(|| async { "<!DOCTYPE html><html><body>Too many requests</body></html>" }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                ACTIVE_CSV
            }),
        )
        .route("/csv/bd", get(|| async { ACTIVE_CSV }))
        .route("/csv/historico", get(|| async { HISTORY_CSV }))
        .route("/csv/headers-only", get(|| async { "FECHA,NOMBRE DEL EQUIPO\n" }))
        .route(
            "/csv/historico-slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                HISTORY_CSV
            }),
        )
        .route(
            "/csv/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        )
}

fn csv(name: &str, base: &str, active: &str, history: Option<&str>, timeout: Duration) -> Box<dyn RowTransport> {
    Box::new(CsvExportTransport::new(
        name,
        reqwest::Client::new(),
        format!("{}{}", base, active),
        history.map(|path| format!("{}{}", base, path)),
        timeout,
    ))
}

#[tokio::test]
async fn test_chain_degrades_until_csv_answers() {
    let base = common::spawn_server(sheet_server()).await;
    let timeout = Duration::from_secs(2);

    let resolver = TransportResolver::with_transports(vec![
        Box::new(ScriptTransport::new(
            reqwest::Client::new(),
            &format!("{}/script/error", base),
            timeout,
        )),
        csv("csv-relay-1", &base, "/relay/html", None, timeout),
        csv("csv-slow", &base, "/slow", None, Duration::from_millis(200)),
        csv("csv-empty", &base, "/csv/headers-only", None, timeout),
        csv("csv-direct", &base, "/csv/bd", Some("/csv/historico"), timeout),
    ]);

    let (records, load) = resolver.resolve().await;

    assert_eq!(load.source, "csv-direct");
    assert!(!load.is_fallback);
    let outcomes: Vec<_> = load.attempts.iter().map(|a| (a.transport.as_str(), a.ok)).collect();
    assert_eq!(
        outcomes,
        [
            ("script", false),
            ("csv-relay-1", false),
            ("csv-slow", false),
            ("csv-empty", false),
            ("csv-direct", true),
        ]
    );
    assert!(load.attempts[0].detail.contains("Sheet BD not found"));
    assert!(load.attempts[1].detail.contains("HTML"));

    // Сначала рабочий лист от новых строк к старым, затем архив
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].device_name, "Galaxy A54");
    assert_eq!(records[0].price, 1250.0);
    assert!(!records[0].processed);
    assert!(!records[0].archived);

    assert_eq!(records[1].device_name, "iPhone 13");
    assert_eq!(records[1].intake_date, "2024-01-05");
    assert!(records[1].processed);
    assert!(!records[1].archived);

    assert_eq!(records[2].device_name, "Moto G");
    assert!(records[2].archived);
    assert_eq!(records[2].delivered_imei, "2222");
}

#[tokio::test]
async fn test_script_payload_is_used_when_valid() {
    let base = common::spawn_server(sheet_server()).await;
    let resolver = TransportResolver::with_transports(vec![Box::new(ScriptTransport::new(
        reqwest::Client::new(),
        &format!("{}/script/ok", base),
        Duration::from_secs(2),
    ))]);

    let (records, load) = resolver.resolve().await;
    assert_eq!(load.source, "script");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].device_name, "Pixel 7");
    assert_eq!(records[0].price, 400.0);
    assert!(records[0].processed);
}

#[tokio::test]
async fn test_missing_history_sheet_keeps_active_rows() {
    let base = common::spawn_server(sheet_server()).await;
    let resolver = TransportResolver::with_transports(vec![csv(
        "csv-direct",
        &base,
        "/csv/bd",
        Some("/csv/missing"),
        Duration::from_secs(2),
    )]);

    let (records, load) = resolver.resolve().await;
    assert!(!load.is_fallback);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.archived));
}

#[tokio::test]
async fn test_slow_history_sheet_keeps_active_rows() {
    let base = common::spawn_server(sheet_server()).await;
    let resolver = TransportResolver::with_transports(vec![csv(
        "csv-direct",
        &base,
        "/csv/bd",
        Some("/csv/historico-slow"),
        Duration::from_millis(500),
    )]);

    let (records, load) = resolver.resolve().await;
    assert!(!load.is_fallback);
    assert_eq!(load.source, "csv-direct");
    assert_eq!(load.attempts.len(), 1);
    assert!(load.attempts[0].ok);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.archived));
    assert_eq!(records[0].device_name, "Galaxy A54");
}

#[tokio::test]
async fn test_unreachable_network_yields_fallback() {
    let base = common::closed_url().await;
    let timeout = Duration::from_secs(2);
    let resolver = TransportResolver::with_transports(vec![
        Box::new(ScriptTransport::new(
            reqwest::Client::new(),
            &format!("{}/exec", base),
            timeout,
        )),
        csv("csv-direct", &base, "/csv/bd", None, timeout),
    ]);

    let (records, load) = resolver.resolve().await;
    assert!(load.is_fallback);
    assert_eq!(load.source, "fallback");
    assert_eq!(load.attempts.len(), 2);
    assert!(load.attempts.iter().all(|a| !a.ok));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].device_name, "Sin conexión a la hoja de cálculo");
}
