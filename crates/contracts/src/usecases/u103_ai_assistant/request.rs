use serde::{Deserialize, Serialize};

use crate::dashboards::d100_warranty_dashboard::FilterState;

/// Вопрос к ассистенту по отфильтрованным данным
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub filters: FilterState,
}
