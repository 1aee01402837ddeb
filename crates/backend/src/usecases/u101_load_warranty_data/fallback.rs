use contracts::domain::a001_warranty_record::WarrantyRecord;

/// Имя источника в LoadResponse, когда ни один транспорт не ответил
pub const FALLBACK_SOURCE: &str = "fallback";

/// Запись-заглушка вместо пустого экрана.
/// Текст в поле неисправности объясняет оператору, что проверить.
pub fn fallback_records() -> Vec<WarrantyRecord> {
    vec![WarrantyRecord {
        id: "fallback-0".to_string(),
        intake_date: String::new(),
        device_name: "Sin conexión a la hoja de cálculo".to_string(),
        device_brand: String::new(),
        defective_imei: String::new(),
        store: String::new(),
        replacement_date: String::new(),
        supplier: String::new(),
        delivered_imei: String::new(),
        fault: "Ninguna fuente de datos respondió. Verifique la URL del script y que la hoja esté publicada en la web.".to_string(),
        quantity: 1,
        price: 0.0,
        resolution_date: String::new(),
        processed: false,
        notes: String::new(),
        archived: false,
    }]
}
