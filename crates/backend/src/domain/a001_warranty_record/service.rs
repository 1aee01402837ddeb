use contracts::domain::a001_warranty_record::{
    MutationOutcome, RemoteSyncStatus, WarrantyRecord, WarrantyRecordDto,
};
use contracts::usecases::u101_load_warranty_data::response::LoadResponse;
use thiserror::Error;
use uuid::Uuid;

use super::repository::SharedWarrantyStore;
use crate::usecases::u101_load_warranty_data::TransportResolver;
use crate::usecases::u102_sync_to_sheets::{MutationAction, SheetsScriptClient};

#[derive(Debug, Error)]
pub enum WarrantyError {
    #[error("{0}")]
    Validation(String),
    #[error("Warranty record not found: {0}")]
    NotFound(String),
}

/// Список записей в текущем порядке
pub async fn list_all(store: &SharedWarrantyStore) -> Vec<WarrantyRecord> {
    store.read().await.list_all().to_vec()
}

pub async fn get_by_id(store: &SharedWarrantyStore, id: &str) -> Option<WarrantyRecord> {
    store.read().await.get_by_id(id).cloned()
}

pub async fn last_load(store: &SharedWarrantyStore) -> Option<LoadResponse> {
    store.read().await.last_load().cloned()
}

/// Перезагрузить набор из таблицы. Никогда не падает: в худшем случае заглушка.
pub async fn reload(store: &SharedWarrantyStore, resolver: &TransportResolver) -> LoadResponse {
    let (records, load) = resolver.resolve().await;
    tracing::info!(
        "Loaded {} warranty records from {}{}",
        load.record_count,
        load.source,
        if load.is_fallback { " (fallback)" } else { "" }
    );
    store.write().await.replace_all(records, load.clone());
    load
}

/// Новая запись: сначала локально (первой в списке), потом в таблицу
pub async fn create(
    store: &SharedWarrantyStore,
    client: &SheetsScriptClient,
    dto: WarrantyRecordDto,
) -> Result<MutationOutcome, WarrantyError> {
    dto.validate().map_err(WarrantyError::Validation)?;

    let record = WarrantyRecord::from_dto(format!("new-{}", Uuid::new_v4()), &dto);
    store.write().await.insert_front(record.clone());
    tracing::info!("Created warranty record {} locally", record.id);

    let remote_ok = client.create(&record).await;
    Ok(finish_mutation(
        MutationAction::Create,
        record,
        client.is_enabled(),
        remote_ok,
    ))
}

/// Полная замена изменяемых полей по локальному id.
/// В таблицу уходит IMEI до изменения, чтобы скрипт нашёл строку.
pub async fn update(
    store: &SharedWarrantyStore,
    client: &SheetsScriptClient,
    id: &str,
    dto: WarrantyRecordDto,
) -> Result<MutationOutcome, WarrantyError> {
    dto.validate().map_err(WarrantyError::Validation)?;

    let (before, after) = store
        .write()
        .await
        .update(id, &dto)
        .ok_or_else(|| WarrantyError::NotFound(id.to_string()))?;
    tracing::info!("Updated warranty record {} locally", id);

    let remote_ok = client.update(&after, &before.defective_imei).await;
    Ok(finish_mutation(
        MutationAction::Update,
        after,
        client.is_enabled(),
        remote_ok,
    ))
}

pub async fn delete(
    store: &SharedWarrantyStore,
    client: &SheetsScriptClient,
    id: &str,
) -> Result<MutationOutcome, WarrantyError> {
    let removed = store
        .write()
        .await
        .remove(id)
        .ok_or_else(|| WarrantyError::NotFound(id.to_string()))?;
    tracing::info!("Deleted warranty record {} locally", id);

    let remote_ok = client.delete(&removed).await;
    Ok(finish_mutation(
        MutationAction::Delete,
        removed,
        client.is_enabled(),
        remote_ok,
    ))
}

/// Политика согласования после оптимистичного изменения.
///
/// Локальное состояние не откатывается ни при каком ответе таблицы:
/// результат влияет только на статус и текст уведомления.
pub fn finish_mutation(
    action: MutationAction,
    record: WarrantyRecord,
    writes_enabled: bool,
    remote_ok: bool,
) -> MutationOutcome {
    let (remote, message) = if !writes_enabled {
        (
            RemoteSyncStatus::Disabled,
            "URL del script no configurado: el cambio solo se aplicó localmente.".to_string(),
        )
    } else if remote_ok {
        let text = match action {
            MutationAction::Create => "Registro guardado en la hoja de cálculo.",
            MutationAction::Update => "Registro actualizado en la hoja de cálculo.",
            MutationAction::Delete => "Registro eliminado de la hoja de cálculo.",
        };
        (RemoteSyncStatus::Synced, text.to_string())
    } else {
        tracing::warn!(
            "Remote {} failed for {}, keeping local change",
            action.as_str(),
            record.id
        );
        (
            RemoteSyncStatus::LocalOnly,
            "Se guardó localmente, pero hubo un error al sincronizar con la hoja de cálculo."
                .to_string(),
        )
    };

    MutationOutcome {
        record,
        remote,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_warranty_record::repository::WarrantyStore;

    fn dto(imei: &str) -> WarrantyRecordDto {
        WarrantyRecordDto {
            intake_date: "2024-04-10".into(),
            device_name: "Redmi Note 12".into(),
            device_brand: "Xiaomi".into(),
            defective_imei: imei.into(),
            store: "K24 Este".into(),
            replacement_date: String::new(),
            supplier: String::new(),
            delivered_imei: String::new(),
            fault: "No enciende".into(),
            quantity: 1,
            price: 180.0,
            resolution_date: String::new(),
            processed: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_finish_mutation_statuses() {
        let record = WarrantyRecord::from_dto("x".into(), &dto("1"));

        let disabled = finish_mutation(MutationAction::Create, record.clone(), false, false);
        assert_eq!(disabled.remote, RemoteSyncStatus::Disabled);

        let synced = finish_mutation(MutationAction::Update, record.clone(), true, true);
        assert_eq!(synced.remote, RemoteSyncStatus::Synced);

        let local = finish_mutation(MutationAction::Delete, record, true, false);
        assert_eq!(local.remote, RemoteSyncStatus::LocalOnly);
        assert!(local.message.starts_with("Se guardó localmente"));
    }

    #[tokio::test]
    async fn test_create_without_script_is_kept_locally() {
        let store = WarrantyStore::new().shared();
        let client = SheetsScriptClient::new("");

        let outcome = create(&store, &client, dto("111")).await.unwrap();
        assert_eq!(outcome.remote, RemoteSyncStatus::Disabled);
        assert!(outcome.record.id.starts_with("new-"));

        let records = list_all(&store).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].defective_imei, "111");
    }

    #[tokio::test]
    async fn test_invalid_dto_changes_nothing() {
        let store = WarrantyStore::new().shared();
        let client = SheetsScriptClient::new("");

        let mut bad = dto("111");
        bad.store = " ".into();
        let err = create(&store, &client, bad).await.unwrap_err();
        assert!(matches!(err, WarrantyError::Validation(_)));
        assert!(list_all(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = WarrantyStore::new().shared();
        let client = SheetsScriptClient::new("");

        let err = update(&store, &client, "nope", dto("1")).await.unwrap_err();
        assert!(matches!(err, WarrantyError::NotFound(_)));
        let err = delete(&store, &client, "nope").await.unwrap_err();
        assert!(matches!(err, WarrantyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let store = WarrantyStore::new().shared();
        let client = SheetsScriptClient::new("");
        let created = create(&store, &client, dto("111")).await.unwrap().record;

        let mut edited = dto("222");
        edited.processed = true;
        let outcome = update(&store, &client, &created.id, edited).await.unwrap();
        assert_eq!(outcome.record.id, created.id);
        assert!(get_by_id(&store, &created.id).await.unwrap().processed);

        let outcome = delete(&store, &client, &created.id).await.unwrap();
        assert_eq!(outcome.record.defective_imei, "222");
        assert!(list_all(&store).await.is_empty());
    }
}
