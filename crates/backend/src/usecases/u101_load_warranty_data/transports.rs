use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::shared::sheets::{RawRow, HISTORY_MARKER};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Received an HTML page instead of data")]
    HtmlPayload,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("No usable rows")]
    NoRows,
}

/// Один способ получить сырые строки таблицы
#[async_trait]
pub trait RowTransport: Send + Sync {
    /// Имя для логов и отчёта о загрузке
    fn name(&self) -> &str;

    /// Сколько ждать эту попытку целиком
    fn timeout(&self) -> Duration;

    /// Основные строки. Ошибка здесь проваливает попытку.
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, TransportError>;

    /// Необязательные архивные строки, запрашиваются после удачного `fetch_rows`
    /// под собственным таймаутом. Ошибка здесь только убирает архив из результата.
    async fn fetch_history(&self) -> Result<Vec<RawRow>, TransportError> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Script (JSON)
// ============================================================================

/// GET к веб-приложению Apps Script, ответ: JSON-массив объектов-строк
pub struct ScriptTransport {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ScriptTransport {
    pub fn new(client: reqwest::Client, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl RowTransport for ScriptTransport {
    fn name(&self) -> &str {
        "script"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, TransportError> {
        let body = fetch_text(&self.client, &self.url).await?;
        parse_script_payload(&body)
    }
}

/// Разобрать ответ скрипта.
///
/// Принимается массив или объект с массивом `data`. Поле `error` на верхнем
/// уровне или в любом элементе означает ошибку скрипта.
pub fn parse_script_payload(body: &str) -> Result<Vec<RawRow>, TransportError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| TransportError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            if let Some(error) = object.get("error") {
                return Err(TransportError::Remote(error_text(error)));
            }
            match object.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(TransportError::Parse(
                        "expected a JSON array of rows".to_string(),
                    ))
                }
            }
        }
        _ => {
            return Err(TransportError::Parse(
                "expected a JSON array of rows".to_string(),
            ))
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in &items {
        let Value::Object(object) = item else {
            tracing::debug!("Skipping non-object element in script payload");
            continue;
        };
        if let Some(error) = object.get("error") {
            return Err(TransportError::Remote(error_text(error)));
        }
        rows.push(RawRow::from_json_object(object));
    }
    Ok(rows)
}

fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// CSV export
// ============================================================================

/// Один лист для CSV-выгрузки
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub url: String,
    /// Метка происхождения, которой помечаются строки листа
    pub provenance: Option<String>,
}

/// CSV-выгрузка рабочего листа; лист истории, если задан, отдаётся через `fetch_history`.
/// Один и тот же тип обслуживает прямой доступ и доступ через прокси.
pub struct CsvExportTransport {
    name: String,
    client: reqwest::Client,
    active: SheetSource,
    history: Option<SheetSource>,
    timeout: Duration,
}

impl CsvExportTransport {
    pub fn new(
        name: impl Into<String>,
        client: reqwest::Client,
        active_url: String,
        history_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            active: SheetSource {
                url: active_url,
                provenance: None,
            },
            history: history_url.map(|url| SheetSource {
                url,
                provenance: Some(HISTORY_MARKER.to_string()),
            }),
            timeout,
        }
    }

    async fn fetch_sheet(&self, sheet: &SheetSource) -> Result<Vec<RawRow>, TransportError> {
        let body = fetch_text(&self.client, &sheet.url).await?;
        let rows = parse_csv(&body)?;
        Ok(match &sheet.provenance {
            Some(marker) => rows
                .into_iter()
                .map(|row| row.with_provenance(marker))
                .collect(),
            None => rows,
        })
    }
}

#[async_trait]
impl RowTransport for CsvExportTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, TransportError> {
        self.fetch_sheet(&self.active).await
    }

    async fn fetch_history(&self) -> Result<Vec<RawRow>, TransportError> {
        match &self.history {
            Some(history) => self.fetch_sheet(history).await,
            None => Ok(Vec::new()),
        }
    }}

/// Разобрать CSV с заголовком. Пустые строки пропускаются.
pub fn parse_csv(body: &str) -> Result<Vec<RawRow>, TransportError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TransportError::Parse(format!("Failed to read CSV headers: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed CSV record: {}", e);
                continue;
            }
        };

        let row: RawRow = headers.iter().zip(record.iter()).collect();
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// GET с проверкой статуса и того, что прокси не вернул HTML-страницу
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, TransportError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status));
    }

    let body = response.text().await?;
    if is_html_payload(&body) {
        return Err(TransportError::HtmlPayload);
    }
    Ok(body)
}

pub fn is_html_payload(body: &str) -> bool {
    let head: String = body
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(15)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
