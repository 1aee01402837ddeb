use contracts::domain::a001_warranty_record::{WarrantyRecord, WarrantyRecordDto};
use contracts::usecases::u101_load_warranty_data::response::LoadResponse;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Хранилище записей, общее для всех обработчиков
pub type SharedWarrantyStore = Arc<RwLock<WarrantyStore>>;

/// Текущий набор записей в памяти.
///
/// Источник истины это таблица; здесь только последняя загрузка плюс
/// локальные (оптимистичные) изменения поверх неё. Истории изменений нет.
#[derive(Debug, Default)]
pub struct WarrantyStore {
    records: Vec<WarrantyRecord>,
    last_load: Option<LoadResponse>,
}

impl WarrantyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedWarrantyStore {
        Arc::new(RwLock::new(self))
    }

    /// Все записи в порядке отображения (новые сверху)
    pub fn list_all(&self) -> &[WarrantyRecord] {
        &self.records
    }

    pub fn get_by_id(&self, id: &str) -> Option<&WarrantyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn last_load(&self) -> Option<&LoadResponse> {
        self.last_load.as_ref()
    }

    /// Заменить набор целиком (после загрузки из таблицы)
    pub fn replace_all(&mut self, records: Vec<WarrantyRecord>, load: LoadResponse) {
        self.records = records;
        self.last_load = Some(load);
    }

    /// Новая запись появляется первой
    pub fn insert_front(&mut self, record: WarrantyRecord) {
        self.records.insert(0, record);
    }

    /// Заменить изменяемые поля. Возвращает (до, после).
    pub fn update(
        &mut self,
        id: &str,
        dto: &WarrantyRecordDto,
    ) -> Option<(WarrantyRecord, WarrantyRecord)> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        let before = record.clone();
        record.update(dto);
        Some((before, record.clone()))
    }

    pub fn remove(&mut self, id: &str) -> Option<WarrantyRecord> {
        let position = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(device: &str, imei: &str) -> WarrantyRecordDto {
        WarrantyRecordDto {
            intake_date: "2024-03-01".into(),
            device_name: device.into(),
            device_brand: "Samsung".into(),
            defective_imei: imei.into(),
            store: "K24 Sur".into(),
            replacement_date: String::new(),
            supplier: String::new(),
            delivered_imei: String::new(),
            fault: "No carga".into(),
            quantity: 1,
            price: 200.0,
            resolution_date: String::new(),
            processed: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_insert_front_update_remove() {
        let mut store = WarrantyStore::new();
        store.insert_front(WarrantyRecord::from_dto("a".into(), &dto("A10", "111")));
        store.insert_front(WarrantyRecord::from_dto("b".into(), &dto("A20", "222")));
        assert_eq!(store.list_all()[0].id, "b");

        let mut edited = dto("A20", "333");
        edited.processed = true;
        let (before, after) = store.update("b", &edited).unwrap();
        assert_eq!(before.defective_imei, "222");
        assert_eq!(after.defective_imei, "333");
        assert!(store.get_by_id("b").unwrap().processed);

        assert!(store.update("zzz", &edited).is_none());

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.device_name, "A10");
        assert_eq!(store.list_all().len(), 1);
        assert!(store.remove("a").is_none());
    }
}
