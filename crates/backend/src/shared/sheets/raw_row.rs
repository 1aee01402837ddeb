use serde_json::{Map, Value};
use std::collections::HashMap;

/// Служебная колонка, которой транспорт помечает происхождение строки
pub const PROVENANCE_COLUMN: &str = "__ORIGEN";

/// Значение PROVENANCE_COLUMN для строк с листа истории
pub const HISTORY_MARKER: &str = "HISTORICO";

/// Сырая строка таблицы: заголовок -> значение
///
/// Ключи нормализуются при вставке (trim, верхний регистр, одиночные пробелы),
/// поэтому поиск не зависит от того, как оператор набрал заголовок.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_key(key: &str) -> String {
        key.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

    /// Добавить ячейку. При повторе заголовка побеждает первое непустое значение.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = Self::normalize_key(key);
        if key.is_empty() {
            return;
        }
        let value = value.into();
        match self.cells.get(&key) {
            Some(existing) if !existing.trim().is_empty() => {}
            _ => {
                self.cells.insert(key, value);
            }
        }
    }

    /// Значение по заголовку (без учёта регистра и пробелов)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(&Self::normalize_key(key)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Все ячейки пустые
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }

    /// Пометить строку как пришедшую с листа истории
    pub fn with_provenance(mut self, marker: &str) -> Self {
        self.cells
            .insert(PROVENANCE_COLUMN.to_string(), marker.to_string());
        self
    }

    /// Строка из JSON-объекта скрипта. Нестроковые значения приводятся к тексту.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut row = Self::new();
        for (key, value) in object {
            row.insert(key, json_to_text(value));
        }
        row
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key.as_ref(), value);
        }
        row
    }
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
