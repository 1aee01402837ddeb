use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Итог одной попытки транспорта
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Имя транспорта ("script", "csv-direct", "csv-relay-1", ...)
    pub transport: String,
    pub ok: bool,
    /// Количество записей или текст ошибки
    pub detail: String,
}

/// Ответ на загрузку данных из таблицы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Транспорт, давший данные, или "fallback"
    pub source: String,
    /// Показана заглушка вместо реальных данных
    pub is_fallback: bool,
    pub record_count: usize,
    /// Все попытки по порядку
    pub attempts: Vec<AttemptReport>,
    pub loaded_at: DateTime<Utc>,
}
