use chrono::Utc;
use contracts::domain::a001_warranty_record::WarrantyRecord;
use contracts::usecases::u101_load_warranty_data::response::{AttemptReport, LoadResponse};
use std::time::{Duration, Instant};

use super::fallback::{fallback_records, FALLBACK_SOURCE};
use super::transports::{CsvExportTransport, RowTransport, ScriptTransport, TransportError};
use crate::domain::a001_warranty_record::normalizer::normalize_rows;
use crate::shared::config::SheetsConfig;
use crate::shared::sheets::RawRow;
use crate::shared::sheets::urls::{export_csv_url, gviz_csv_url, via_relay};

/// Цепочка транспортов чтения.
///
/// Попытки идут строго по очереди; первая, давшая хотя бы одну запись, побеждает.
/// Если не ответил никто, возвращается заглушка, поэтому `resolve` не падает.
pub struct TransportResolver {
    transports: Vec<Box<dyn RowTransport>>,
}

impl TransportResolver {
    pub fn with_transports(transports: Vec<Box<dyn RowTransport>>) -> Self {
        Self { transports }
    }

    /// Порядок: script, csv-direct, csv-relay-N, csv-export-relay
    pub fn from_config(config: &SheetsConfig) -> Self {
        let client = reqwest::Client::new();
        let mut transports: Vec<Box<dyn RowTransport>> = Vec::new();

        if config.writes_enabled() {
            transports.push(Box::new(ScriptTransport::new(
                client.clone(),
                config.script_url.trim(),
                Duration::from_secs(config.script_timeout_secs),
            )));
        }

        let csv_timeout = Duration::from_secs(config.csv_timeout_secs);
        let history_sheet = Some(config.history_sheet.trim()).filter(|s| !s.is_empty());

        let active_url = gviz_csv_url(&config.sheet_id, &config.active_sheet);
        let history_url = history_sheet.map(|name| gviz_csv_url(&config.sheet_id, name));

        transports.push(Box::new(CsvExportTransport::new(
            "csv-direct",
            client.clone(),
            active_url.clone(),
            history_url.clone(),
            csv_timeout,
        )));

        for (i, relay) in config.relays.iter().enumerate() {
            transports.push(Box::new(CsvExportTransport::new(
                format!("csv-relay-{}", i + 1),
                client.clone(),
                via_relay(relay, &active_url),
                history_url.as_ref().map(|url| via_relay(relay, url)),
                csv_timeout,
            )));
        }

        if let Some(relay) = config.relays.first() {
            let export_active = export_csv_url(&config.sheet_id, &config.active_sheet);
            let export_history = history_sheet.map(|name| export_csv_url(&config.sheet_id, name));
            transports.push(Box::new(CsvExportTransport::new(
                "csv-export-relay",
                client,
                via_relay(relay, &export_active),
                export_history.map(|url| via_relay(relay, &url)),
                csv_timeout,
            )));
        }

        Self { transports }
    }

    /// Имена транспортов в порядке попыток
    pub fn transport_names(&self) -> Vec<String> {
        self.transports.iter().map(|t| t.name().to_string()).collect()
    }

    /// Лист истории транспорта со своим таймаутом. Любой сбой означает "без архива".
    async fn history_rows(&self, transport: &dyn RowTransport) -> Vec<RawRow> {
        match tokio::time::timeout(transport.timeout(), transport.fetch_history()).await {
            Ok(Ok(rows)) => {
                if !rows.is_empty() {
                    tracing::info!(
                        "{}: {} rows from history sheet",
                        transport.name(),
                        rows.len()
                    );
                }
                rows
            }
            Ok(Err(e)) => {
                tracing::warn!("{}: history sheet unavailable: {}", transport.name(), e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    "{}: history sheet timed out after {:?}",
                    transport.name(),
                    transport.timeout()
                );
                Vec::new()
            }
        }
    }

    pub async fn resolve(&self) -> (Vec<WarrantyRecord>, LoadResponse) {
        let mut attempts = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let started = Instant::now();
            let result = match tokio::time::timeout(transport.timeout(), transport.fetch_rows())
                .await
            {
                Ok(Ok(active_rows)) => {
                    // Архив идёт перед рабочим листом: после разворота
                    // сверху окажутся свежие строки рабочего листа
                    let mut rows = self.history_rows(transport.as_ref()).await;
                    rows.extend(active_rows);
                    let records = normalize_rows(&rows);
                    if records.is_empty() {
                        Err(TransportError::NoRows)
                    } else {
                        Ok(records)
                    }
                }
                Ok(Err(e)) => Err(e),
                Err(_) => Err(TransportError::Timeout(transport.timeout())),
            };

            match result {
                Ok(records) => {
                    tracing::info!(
                        "Transport {} returned {} records in {} ms",
                        transport.name(),
                        records.len(),
                        started.elapsed().as_millis()
                    );
                    attempts.push(AttemptReport {
                        transport: transport.name().to_string(),
                        ok: true,
                        detail: format!("{} records", records.len()),
                    });
                    let load = LoadResponse {
                        source: transport.name().to_string(),
                        is_fallback: false,
                        record_count: records.len(),
                        attempts,
                        loaded_at: Utc::now(),
                    };
                    return (records, load);
                }
                Err(e) => {
                    tracing::warn!(
                        "Transport {} failed after {} ms: {}",
                        transport.name(),
                        started.elapsed().as_millis(),
                        e
                    );
                    attempts.push(AttemptReport {
                        transport: transport.name().to_string(),
                        ok: false,
                        detail: e.to_string(),
                    });
                }
            }
        }

        tracing::error!(
            "All {} transports failed, showing fallback record",
            attempts.len()
        );
        let records = fallback_records();
        let load = LoadResponse {
            source: FALLBACK_SOURCE.to_string(),
            is_fallback: true,
            record_count: records.len(),
            attempts,
            loaded_at: Utc::now(),
        };
        (records, load)
    }
}
