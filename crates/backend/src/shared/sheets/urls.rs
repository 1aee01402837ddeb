/// CSV через gviz: позволяет выбрать лист по имени, а не по gid
pub fn gviz_csv_url(sheet_id: &str, sheet_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
        sheet_id,
        urlencoding::encode(sheet_name)
    )
}

/// Альтернативная выгрузка через /export
pub fn export_csv_url(sheet_id: &str, sheet_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&sheet={}",
        sheet_id,
        urlencoding::encode(sheet_name)
    )
}

/// Обернуть URL в CORS-прокси: целевой адрес дописывается в конец префикса
pub fn via_relay(relay_prefix: &str, target: &str) -> String {
    format!("{}{}", relay_prefix, urlencoding::encode(target))
}
