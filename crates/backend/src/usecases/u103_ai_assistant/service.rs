use contracts::domain::a001_warranty_record::WarrantyRecord;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::shared::config::LlmConfig;
use crate::shared::llm::{ChatMessage, LlmError, LlmProvider, LlmResponse, OpenAiProvider};

pub const SUMMARY_UNAVAILABLE: &str =
    "El servicio de IA no está disponible en este momento. Verifique su API Key.";
pub const SUMMARY_EMPTY: &str = "No se pudo generar el análisis.";
pub const ANSWER_FAILED: &str = "Error al consultar la IA.";
pub const ANSWER_EMPTY: &str = "No encontré una respuesta clara.";
pub const QUESTION_MISSING: &str = "Escriba una pregunta.";

/// Сколько ждать модель, если не задано иначе
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ANALYST_ROLE: &str = "Actúa como un analista de datos experto para una tienda de celulares llamada K24. Responde siempre en español, con texto plano y sin markdown.";

/// Строка выборки для резюме
#[derive(Serialize)]
struct SummarySample<'a> {
    equipo: &'a str,
    falla: &'a str,
    tienda: &'a str,
    precio: f64,
}

/// Аналитик по гарантийным данным поверх LLM.
///
/// Ошибки провайдера наружу не выходят: вместо них возвращаются фиксированные
/// тексты. В модель уходит только первые N записей выборки.
/// Каждый вызов ограничен `timeout`: зависшая модель не держит запрос.
#[derive(Clone)]
pub struct WarrantyAnalyst {
    provider: Option<Arc<dyn LlmProvider>>,
    summary_sample: usize,
    question_sample: usize,
    timeout: Duration,
}

impl WarrantyAnalyst {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        summary_sample: usize,
        question_sample: usize,
    ) -> Self {
        Self {
            provider,
            summary_sample,
            question_sample,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = OpenAiProvider::from_config(config)
            .map(|p| Arc::new(p) as Arc<dyn LlmProvider>);
        Self::new(provider, config.summary_sample, config.question_sample)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    async fn complete(
        &self,
        provider: &dyn LlmProvider,
        messages: Vec<ChatMessage>,
    ) -> Result<LlmResponse, LlmError> {
        tokio::time::timeout(self.timeout, provider.chat_completion(messages))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Краткое резюме для отчёта. None, если ассистент не настроен.
    pub async fn summarize(&self, records: &[WarrantyRecord], context: &str) -> Option<String> {
        let provider = self.provider.as_ref()?;

        let sample: Vec<SummarySample> = records
            .iter()
            .take(self.summary_sample)
            .map(|r| SummarySample {
                equipo: &r.device_name,
                falla: &r.fault,
                tienda: &r.store,
                precio: r.price,
            })
            .collect();
        let data = match serde_json::to_string(&sample) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize AI sample: {}", e);
                return Some(SUMMARY_UNAVAILABLE.to_string());
            }
        };

        let prompt = format!(
            "Analiza los siguientes datos de garantías (muestra de hasta {} registros):\n{}\n\n\
             Contexto del reporte: {}\n\n\
             Genera un resumen ejecutivo breve (máximo 2 párrafos) en español, destacando:\n\
             1. Fallas más comunes.\n\
             2. Tiendas con más incidencias.\n\
             3. Recomendaciones breves para reducir garantías.\n\n\
             Usa un tono profesional. Texto plano, sin markdown.",
            self.summary_sample, data, context
        );

        let messages = vec![ChatMessage::system(ANALYST_ROLE), ChatMessage::user(prompt)];
        match self.complete(provider.as_ref(), messages).await {
            Ok(response) => {
                tracing::info!(
                    "AI summary generated by {} ({:?} tokens)",
                    response.model,
                    response.tokens_used
                );
                let text = response.content.trim();
                Some(if text.is_empty() {
                    SUMMARY_EMPTY.to_string()
                } else {
                    text.to_string()
                })
            }
            Err(e) => {
                tracing::error!("{} summary failed: {}", provider.provider_name(), e);
                Some(SUMMARY_UNAVAILABLE.to_string())
            }
        }
    }

    /// Ответ на вопрос пользователя только по переданным записям
    pub async fn answer(&self, records: &[WarrantyRecord], question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return QUESTION_MISSING.to_string();
        }
        let Some(provider) = self.provider.as_ref() else {
            return SUMMARY_UNAVAILABLE.to_string();
        };

        let lines: Vec<String> = records
            .iter()
            .take(self.question_sample)
            .map(|r| {
                format!(
                    "{} ({}): {} en {}",
                    r.device_name, r.device_brand, r.fault, r.store
                )
            })
            .collect();

        let prompt = format!(
            "Tienes acceso a una lista de garantías de celulares:\n{}\n\n\
             Responde la siguiente pregunta del usuario basándote SOLAMENTE en estos datos:\n\
             \"{}\"\n\n\
             Sé conciso y directo.",
            lines.join("\n"),
            question
        );

        let messages = vec![ChatMessage::system(ANALYST_ROLE), ChatMessage::user(prompt)];
        match self.complete(provider.as_ref(), messages).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    ANSWER_EMPTY.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                tracing::error!("{} answer failed: {}", provider.provider_name(), e);
                ANSWER_FAILED.to_string()
            }
        }
    }
}
