use std::sync::Arc;

use super::config::Config;
use crate::domain::a001_warranty_record::repository::{SharedWarrantyStore, WarrantyStore};
use crate::usecases::u101_load_warranty_data::TransportResolver;
use crate::usecases::u102_sync_to_sheets::SheetsScriptClient;
use crate::usecases::u103_ai_assistant::WarrantyAnalyst;

/// Состояние приложения, которое получают все обработчики
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: SharedWarrantyStore,
    pub resolver: Arc<TransportResolver>,
    pub mutation_client: Arc<SheetsScriptClient>,
    pub analyst: WarrantyAnalyst,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: TransportResolver,
        mutation_client: SheetsScriptClient,
        analyst: WarrantyAnalyst,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: WarrantyStore::new().shared(),
            resolver: Arc::new(resolver),
            mutation_client: Arc::new(mutation_client),
            analyst,
        }
    }

    /// Все зависимости из конфигурации
    pub fn from_config(config: Config) -> Self {
        let resolver = TransportResolver::from_config(&config.sheets);
        let mutation_client = SheetsScriptClient::new(&config.sheets.script_url);
        let analyst = WarrantyAnalyst::from_config(&config.llm);
        Self::new(config, resolver, mutation_client, analyst)
    }
}
