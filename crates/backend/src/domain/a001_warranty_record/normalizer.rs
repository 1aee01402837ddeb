use chrono::NaiveDate;
use contracts::domain::a001_warranty_record::WarrantyRecord;
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::column_map::{resolve, resolve_or_empty, Field};
use crate::shared::sheets::{RawRow, HISTORY_MARKER};

/// Значения колонки "EQUIPO PROCESADO", которые считаются "да"
pub const PROCESSED_TOKENS: &[&str] = &["SI", "TRUE", "YES", "S", "1"];

/// Метки происхождения, означающие лист истории
pub const HISTORY_MARKERS: &[&str] = &[HISTORY_MARKER, "HISTORIAL", "HISTORY", "ARCHIVO"];

/// Дата или название короче этого считаются мусором
const MIN_IDENTIFYING_LEN: usize = 2;

/// Нормализовать набор строк.
///
/// Таблица дописывается снизу, поэтому результат разворачивается:
/// новые записи идут первыми.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<WarrantyRecord> {
    let mut records: Vec<WarrantyRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| normalize_row(row, index))
        .collect();
    records.reverse();
    records
}

/// Превратить одну сырую строку в запись или отбросить её.
///
/// Строка отбрасывается, если в ней нет ни даты, ни названия аппарата, ни IMEI.
pub fn normalize_row(row: &RawRow, index: usize) -> Option<WarrantyRecord> {
    let intake_date = resolve_or_empty(row, Field::IntakeDate);
    let device_name = resolve_or_empty(row, Field::DeviceName);
    let defective_imei = resolve_or_empty(row, Field::DefectiveImei);

    if !is_identifying(&intake_date) && !is_identifying(&device_name) && defective_imei.is_empty()
    {
        tracing::debug!("Skipping row {}: no date, device name or IMEI", index);
        return None;
    }

    Some(WarrantyRecord {
        id: local_id(index),
        intake_date: normalize_date(&intake_date),
        device_name,
        device_brand: resolve_or_empty(row, Field::DeviceBrand),
        defective_imei,
        store: resolve_or_empty(row, Field::Store),
        replacement_date: normalize_date(&resolve_or_empty(row, Field::ReplacementDate)),
        supplier: resolve_or_empty(row, Field::Supplier),
        delivered_imei: resolve_or_empty(row, Field::DeliveredImei),
        fault: resolve_or_empty(row, Field::Fault),
        quantity: parse_quantity(resolve(row, Field::Quantity)),
        price: parse_price(resolve(row, Field::Price)),
        resolution_date: normalize_date(&resolve_or_empty(row, Field::ResolutionDate)),
        processed: parse_flag(resolve(row, Field::Processed)),
        notes: resolve_or_empty(row, Field::Notes),
        archived: is_history(resolve(row, Field::Provenance)),
    })
}

fn is_identifying(value: &str) -> bool {
    value.chars().count() >= MIN_IDENTIFYING_LEN
}

/// "SI" / "TRUE" / "YES" / "S" / "1" в любом регистре -> true, всё остальное -> false
pub fn parse_flag(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let upper = value.trim().to_uppercase();
    PROCESSED_TOKENS.contains(&upper.as_str())
}

/// Цена: выбрасываем всё, кроме цифр, точки и минуса. Нечисловое -> 0.
pub fn parse_price(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => price,
        _ => 0.0,
    }
}

/// Количество: целое не меньше 1, по умолчанию 1
pub fn parse_quantity(value: Option<&str>) -> u32 {
    let Some(value) = value.map(str::trim) else {
        return 1;
    };
    if let Ok(quantity) = value.parse::<u32>() {
        return quantity.max(1);
    }
    match value.replace(',', ".").parse::<f64>() {
        Ok(q) if q.is_finite() && q >= 1.0 && q <= u32::MAX as f64 => q.trunc() as u32,
        _ => 1,
    }
}

/// Привести дату к ISO "YYYY-MM-DD".
///
/// Числовые даты читаются как день-месяц-год. Время после даты отбрасывается.
/// Нераспознанный формат возвращается как есть.
pub fn normalize_date(value: &str) -> String {
    let value = value.trim();
    let Some(date_part) = value.split_whitespace().next() else {
        return String::new();
    };

    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    // Метка времени скрипта: "2024-01-05T05:00:00.000Z" -> дата
    if let Some(prefix) = date_part.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    for format in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            use chrono::Datelike;
            if date.year() >= 1900 {
                return date.format("%Y-%m-%d").to_string();
            }
        }
    }

    value.to_string()
}

fn is_history(marker: Option<&str>) -> bool {
    marker
        .map(|m| m.trim().to_uppercase())
        .map(|m| HISTORY_MARKERS.contains(&m.as_str()))
        .unwrap_or(false)
}

/// Локальный идентификатор: позиция строки + случайный суффикс.
/// В таблицу не отправляется.
fn local_id(index: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("row-{}-{}", index, suffix)
}
