use contracts::domain::a001_warranty_record::WarrantyRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Значение поля `result`, которым скрипт подтверждает запись
const SUCCESS_TOKEN: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(&self) -> &str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScriptResponse {
    result: Option<String>,
    error: Option<Value>,
}

/// Клиент записи в таблицу через веб-приложение Apps Script.
///
/// Один POST на операцию, без повторов и без таймаута. Ошибки не пробрасываются:
/// результатом всегда служит bool.
pub struct SheetsScriptClient {
    client: reqwest::Client,
    script_url: String,
}

impl SheetsScriptClient {
    pub fn new(script_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            script_url: script_url.trim().to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.script_url.is_empty()
    }

    pub async fn create(&self, record: &WarrantyRecord) -> bool {
        match record_payload(MutationAction::Create, record, None) {
            Some(body) => self.send(MutationAction::Create, &body).await,
            None => false,
        }
    }

    /// `original_imei`: IMEI до редактирования, по нему скрипт находит строку
    pub async fn update(&self, record: &WarrantyRecord, original_imei: &str) -> bool {
        match record_payload(MutationAction::Update, record, Some(original_imei)) {
            Some(body) => self.send(MutationAction::Update, &body).await,
            None => false,
        }
    }

    /// Удаление только по IMEI: локальный id таблице неизвестен
    pub async fn delete(&self, record: &WarrantyRecord) -> bool {
        let body = json!({
            "action": MutationAction::Delete.as_str(),
            "imeiMalo": record.defective_imei,
        });
        self.send(MutationAction::Delete, &body).await
    }

    async fn send(&self, action: MutationAction, body: &Value) -> bool {
        if !self.is_enabled() {
            tracing::warn!(
                "Script URL is not configured, {} stays local",
                action.as_str()
            );
            return false;
        }

        // text/plain: Apps Script принимает только "простые" запросы
        let response = match self
            .client
            .post(&self.script_url)
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(body.to_string())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Script {} request failed: {}", action.as_str(), e);
                return false;
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("Failed to read script response: {}", e);
                return false;
            }
        };

        match serde_json::from_str::<ScriptResponse>(&text) {
            Ok(parsed) if parsed.result.as_deref() == Some(SUCCESS_TOKEN) => {
                tracing::info!("Script confirmed {}", action.as_str());
                true
            }
            Ok(parsed) => {
                tracing::error!(
                    "Script rejected {} (status {}): result={:?}, error={:?}",
                    action.as_str(),
                    status,
                    parsed.result,
                    parsed.error
                );
                false
            }
            Err(e) => {
                let preview: String = text.chars().take(200).collect();
                tracing::error!(
                    "Malformed script response for {} (status {}): {} | {}",
                    action.as_str(),
                    status,
                    e,
                    preview
                );
                false
            }
        }
    }
}

/// Тело create/update: запись в проводном формате без локального id
fn record_payload(
    action: MutationAction,
    record: &WarrantyRecord,
    original_imei: Option<&str>,
) -> Option<Value> {
    let mut body = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return None,
        Err(e) => {
            tracing::error!("Failed to serialize record {}: {}", record.id, e);
            return None;
        }
    };
    body.remove("id");
    body.insert("action".to_string(), json!(action.as_str()));
    if let Some(original) = original_imei {
        body.insert("originalImeiMalo".to_string(), json!(original));
    }
    Some(Value::Object(body))
}
