use serde::{Deserialize, Serialize};

use crate::dashboards::d100_warranty_dashboard::FilterState;

/// Запрос на выгрузку PDF-отчёта по текущему фильтру
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub filters: FilterState,
    /// Добавить в отчёт текстовое резюме от ИИ
    #[serde(default = "default_include_summary")]
    pub include_summary: bool,
}

fn default_include_summary() -> bool {
    true
}
