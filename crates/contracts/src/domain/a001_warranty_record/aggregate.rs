use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================

/// Статус гарантийного случая
///
/// Выводится из полей записи, в таблице не хранится:
/// - `Entregado`: выдан IMEI замены (терминальный статус, флаг обработки не важен)
/// - `Procesado`: аппарат вернулся от поставщика в магазин, но клиенту ещё не выдан
/// - `Pendiente`: всё остальное
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyStatus {
    Pendiente,
    Procesado,
    Entregado,
}

impl WarrantyStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(WarrantyStatus::Pendiente),
            "procesado" => Ok(WarrantyStatus::Procesado),
            "entregado" => Ok(WarrantyStatus::Entregado),
            other => Err(format!("Unknown warranty status: {}", other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WarrantyStatus::Pendiente => "pendiente",
            WarrantyStatus::Procesado => "procesado",
            WarrantyStatus::Entregado => "entregado",
        }
    }

    /// Подпись для таблиц и отчётов
    pub fn label(&self) -> &str {
        match self {
            WarrantyStatus::Pendiente => "Pendiente",
            WarrantyStatus::Procesado => "Procesado",
            WarrantyStatus::Entregado => "Entregado",
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Гарантийный случай: приём неисправного аппарата и его возврат клиенту
///
/// Имена полей на проводе совпадают с ключами, которые ожидает скрипт таблицы.
/// `id` локальный и не стабилен между загрузками: удалённая сторона
/// сопоставляет записи по `imei_malo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyRecord {
    pub id: String,

    #[serde(rename = "fecha")]
    pub intake_date: String,

    #[serde(rename = "nombreEquipo")]
    pub device_name: String,

    #[serde(rename = "marcaEquipo")]
    pub device_brand: String,

    #[serde(rename = "imeiMalo")]
    pub defective_imei: String,

    #[serde(rename = "tienda")]
    pub store: String,

    #[serde(rename = "fechaCambio")]
    pub replacement_date: String,

    #[serde(rename = "proveedor")]
    pub supplier: String,

    #[serde(rename = "imeiEntregado")]
    pub delivered_imei: String,

    #[serde(rename = "falla")]
    pub fault: String,

    #[serde(rename = "cantidad")]
    pub quantity: u32,

    #[serde(rename = "precio")]
    pub price: f64,

    #[serde(rename = "fechaRealizaCambio")]
    pub resolution_date: String,

    /// Аппарат вернулся от поставщика в магазин
    #[serde(rename = "equipoProcesado")]
    pub processed: bool,

    #[serde(rename = "observaciones")]
    pub notes: String,

    /// Запись пришла с листа истории, а не с рабочего листа
    #[serde(rename = "archivado", default)]
    pub archived: bool,
}

impl WarrantyRecord {
    /// Создать запись из DTO (локальная вставка)
    pub fn from_dto(id: String, dto: &WarrantyRecordDto) -> Self {
        let mut record = Self {
            id,
            intake_date: String::new(),
            device_name: String::new(),
            device_brand: String::new(),
            defective_imei: String::new(),
            store: String::new(),
            replacement_date: String::new(),
            supplier: String::new(),
            delivered_imei: String::new(),
            fault: String::new(),
            quantity: 1,
            price: 0.0,
            resolution_date: String::new(),
            processed: false,
            notes: String::new(),
            archived: false,
        };
        record.update(dto);
        record
    }

    /// Полная замена изменяемых полей. `id` и `archived` не трогаются.
    pub fn update(&mut self, dto: &WarrantyRecordDto) {
        self.intake_date = dto.intake_date.trim().to_string();
        self.device_name = dto.device_name.trim().to_string();
        self.device_brand = dto.device_brand.trim().to_string();
        self.defective_imei = dto.defective_imei.trim().to_string();
        self.store = dto.store.trim().to_string();
        self.replacement_date = dto.replacement_date.trim().to_string();
        self.supplier = dto.supplier.trim().to_string();
        self.delivered_imei = dto.delivered_imei.trim().to_string();
        self.fault = dto.fault.trim().to_string();
        self.quantity = dto.quantity.max(1);
        self.price = dto.price;
        self.resolution_date = dto.resolution_date.trim().to_string();
        self.processed = dto.processed;
        self.notes = dto.notes.clone();
    }

    pub fn status(&self) -> WarrantyStatus {
        if !self.delivered_imei.trim().is_empty() {
            WarrantyStatus::Entregado
        } else if self.processed {
            WarrantyStatus::Procesado
        } else {
            WarrantyStatus::Pendiente
        }
    }

    pub fn to_dto(&self) -> WarrantyRecordDto {
        WarrantyRecordDto {
            intake_date: self.intake_date.clone(),
            device_name: self.device_name.clone(),
            device_brand: self.device_brand.clone(),
            defective_imei: self.defective_imei.clone(),
            store: self.store.clone(),
            replacement_date: self.replacement_date.clone(),
            supplier: self.supplier.clone(),
            delivered_imei: self.delivered_imei.clone(),
            fault: self.fault.clone(),
            quantity: self.quantity,
            price: self.price,
            resolution_date: self.resolution_date.clone(),
            processed: self.processed,
            notes: self.notes.clone(),
        }
    }
}

// ============================================================================
// DTO
// ============================================================================

/// Изменяемые поля записи (форма приёма и форма обработки)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyRecordDto {
    #[serde(rename = "fecha")]
    pub intake_date: String,
    #[serde(rename = "nombreEquipo")]
    pub device_name: String,
    #[serde(rename = "marcaEquipo")]
    pub device_brand: String,
    #[serde(rename = "imeiMalo")]
    pub defective_imei: String,
    #[serde(rename = "tienda")]
    pub store: String,
    #[serde(rename = "fechaCambio", default)]
    pub replacement_date: String,
    #[serde(rename = "proveedor", default)]
    pub supplier: String,
    #[serde(rename = "imeiEntregado", default)]
    pub delivered_imei: String,
    #[serde(rename = "falla")]
    pub fault: String,
    #[serde(rename = "cantidad", default = "default_quantity")]
    pub quantity: u32,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "fechaRealizaCambio", default)]
    pub resolution_date: String,
    #[serde(rename = "equipoProcesado", default)]
    pub processed: bool,
    #[serde(rename = "observaciones", default)]
    pub notes: String,
}

fn default_quantity() -> u32 {
    1
}

impl WarrantyRecordDto {
    /// Валидация обязательных полей формы
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            (&self.intake_date, "La fecha es obligatoria"),
            (&self.store, "La tienda es obligatoria"),
            (&self.device_name, "El nombre del equipo es obligatorio"),
            (&self.device_brand, "La marca del equipo es obligatoria"),
            (&self.defective_imei, "El IMEI malo es obligatorio"),
            (&self.fault, "La falla es obligatoria"),
        ];
        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(message.to_string());
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("El precio debe ser un número mayor o igual a 0".into());
        }
        if self.quantity < 1 {
            return Err("La cantidad debe ser al menos 1".into());
        }
        Ok(())
    }
}

// ============================================================================
// Mutation outcome
// ============================================================================

/// Результат синхронизации изменения с таблицей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteSyncStatus {
    /// Скрипт подтвердил изменение
    Synced,
    /// Изменение есть только локально: скрипт недоступен или ответил ошибкой
    LocalOnly,
    /// URL скрипта не настроен, запись отключена
    Disabled,
}

/// Ответ на create / update / delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Запись после изменения (для delete это удалённая запись)
    pub record: WarrantyRecord,
    pub remote: RemoteSyncStatus,
    /// Сообщение для пользователя
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> WarrantyRecordDto {
        WarrantyRecordDto {
            intake_date: "2024-01-05".into(),
            device_name: "iPhone 13".into(),
            device_brand: "Apple".into(),
            defective_imei: "354829102938475".into(),
            store: "K24 Norte".into(),
            replacement_date: String::new(),
            supplier: "Ingram".into(),
            delivered_imei: String::new(),
            fault: "Pantalla".into(),
            quantity: 1,
            price: 750.0,
            resolution_date: String::new(),
            processed: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_status_partition() {
        let mut record = WarrantyRecord::from_dto("r1".into(), &dto());
        assert_eq!(record.status(), WarrantyStatus::Pendiente);

        record.processed = true;
        assert_eq!(record.status(), WarrantyStatus::Procesado);

        record.delivered_imei = "123".into();
        assert_eq!(record.status(), WarrantyStatus::Entregado);

        record.processed = false;
        assert_eq!(record.status(), WarrantyStatus::Entregado);
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut record = WarrantyRecord::from_dto("row-7-abc".into(), &dto());
        record.archived = true;

        let mut changed = dto();
        changed.notes = "Cliente avisado".into();
        changed.quantity = 0;
        record.update(&changed);

        assert_eq!(record.id, "row-7-abc");
        assert!(record.archived);
        assert_eq!(record.notes, "Cliente avisado");
        assert_eq!(record.quantity, 1);
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(dto().validate().is_ok());

        let mut missing = dto();
        missing.defective_imei = "  ".into();
        assert!(missing.validate().is_err());

        let mut negative = dto();
        negative.price = -1.0;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_wire_names() {
        let record = WarrantyRecord::from_dto("r1".into(), &dto());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fecha"], "2024-01-05");
        assert_eq!(json["nombreEquipo"], "iPhone 13");
        assert_eq!(json["equipoProcesado"], false);
        assert_eq!(json["precio"], 750.0);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            WarrantyStatus::from_str(" Entregado ").unwrap(),
            WarrantyStatus::Entregado
        );
        assert!(WarrantyStatus::from_str("otro").is_err());
    }
}
