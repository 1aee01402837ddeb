use chrono::{DateTime, Utc};
use contracts::dashboards::d100_warranty_dashboard::FilterState;
use contracts::dashboards::d101_warranty_report::ReportRequest;
use contracts::domain::a001_warranty_record::WarrantyRecord;

use super::logo::fetch_logo;
use super::pdf_renderer::render_pdf;
use crate::dashboards::d100_warranty_dashboard::service::filter_records;
use crate::shared::config::ReportConfig;
use crate::shared::format::format_amount;
use crate::usecases::u103_ai_assistant::WarrantyAnalyst;

pub const TITLE_GENERAL: &str = "Reporte General de Garantías - Tiendas K24";
pub const TITLE_FILTERED: &str = "Reporte de Garantías (Filtrado)";
pub const NARRATIVE_HEADING: &str = "Resumen Inteligente (AI):";

pub const TABLE_COLUMNS: [&str; 8] = [
    "Fecha",
    "Equipo",
    "Tienda",
    "IMEI Malo",
    "Estado",
    "Procesado",
    "Obs",
    "Precio",
];

/// Содержимое отчёта до рендеринга
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    /// Строки под заголовком: дата выпуска и применённые фильтры
    pub metadata: Vec<String>,
    pub narrative: Option<String>,
    pub rows: Vec<[String; 8]>,
    pub total_records: usize,
    pub total_value: f64,
    pub is_filtered: bool,
    pub file_name: String,
}

impl ReportDocument {
    /// Итоговые строки под таблицей
    pub fn totals(&self) -> [String; 2] {
        [
            format!("Registros en este reporte: {}", self.total_records),
            format!(
                "Valor Inventario (Filtrado): {}",
                format_amount(self.total_value)
            ),
        ]
    }
}

/// Готовый PDF
#[derive(Debug)]
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Собрать отчёт по всем загруженным записям и фильтру
pub fn build_report(
    all: &[WarrantyRecord],
    filters: &FilterState,
    narrative: Option<String>,
    issued_at: DateTime<Utc>,
) -> ReportDocument {
    let filtered = filter_records(all, filters);
    let is_filtered = filters.is_active() || filtered.len() != all.len();

    let mut metadata = vec![format!("Fecha de emisión: {}", issue_date(issued_at))];
    if !filters.store.trim().is_empty() {
        metadata.push(format!("Filtro Tienda: {}", filters.store.trim()));
    }
    if !filters.status.trim().is_empty() {
        metadata.push(format!(
            "Filtro Estado: {}",
            filters.status.trim().to_uppercase()
        ));
    }
    let start = filters.start_date.trim();
    let end = filters.end_date.trim();
    if !start.is_empty() || !end.is_empty() {
        metadata.push(format!(
            "Período: {} a {}",
            if start.is_empty() { "Inicio" } else { start },
            if end.is_empty() { "Presente" } else { end }
        ));
    }

    let rows = filtered
        .iter()
        .map(|r| {
            [
                r.intake_date.clone(),
                r.device_name.clone(),
                r.store.clone(),
                r.defective_imei.clone(),
                r.status().label().to_string(),
                if r.processed { "SI" } else { "NO" }.to_string(),
                r.notes.clone(),
                format_amount(r.price),
            ]
        })
        .collect();

    let file_name = format!(
        "reporte_garantias_{}_{}.pdf",
        if is_filtered { "filtrado" } else { "general" },
        issued_at.timestamp_millis()
    );

    ReportDocument {
        title: if is_filtered {
            TITLE_FILTERED
        } else {
            TITLE_GENERAL
        }
        .to_string(),
        metadata,
        narrative,
        rows,
        total_records: filtered.len(),
        total_value: filtered.iter().map(|r| r.price).sum(),
        is_filtered,
        file_name,
    }
}

/// Контекст для ИИ-резюме
pub fn summary_context(filters: &FilterState, issued_at: DateTime<Utc>) -> String {
    let store = filters.store.trim();
    let status = filters.status.trim();
    format!(
        "Reporte filtrado para tienda: {}. Estado: {}. Fecha: {}",
        if store.is_empty() { "Todas" } else { store },
        if status.is_empty() { "Todos" } else { status },
        issue_date(issued_at)
    )
}

fn issue_date(issued_at: DateTime<Utc>) -> String {
    issued_at.format("%d/%m/%Y").to_string()
}

/// Полный цикл выгрузки: фильтр, резюме ИИ, логотип, PDF.
/// Сбой ИИ или логотипа отчёт не ломает.
pub async fn export_pdf(
    all: &[WarrantyRecord],
    request: &ReportRequest,
    analyst: &WarrantyAnalyst,
    config: &ReportConfig,
) -> anyhow::Result<RenderedReport> {
    let issued_at = Utc::now();

    let narrative = if request.include_summary {
        let filtered = filter_records(all, &request.filters);
        analyst
            .summarize(&filtered, &summary_context(&request.filters, issued_at))
            .await
    } else {
        None
    };

    let logo = fetch_logo(&config.logo_url, config.logo_timeout_secs).await;

    let document = build_report(all, &request.filters, narrative, issued_at);
    let bytes = render_pdf(&document, logo.as_ref())?;

    tracing::info!(
        "Report {} rendered: {} rows, {} bytes",
        document.file_name,
        document.rows.len(),
        bytes.len()
    );

    Ok(RenderedReport {
        file_name: document.file_name,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::llm::{ChatMessage, LlmError, LlmProvider, LlmResponse};
    use chrono::TimeZone;
    use contracts::domain::a001_warranty_record::WarrantyRecordDto;
    use std::sync::Arc;

    fn record(id: &str, store: &str, price: f64) -> WarrantyRecord {
        WarrantyRecord::from_dto(
            id.into(),
            &WarrantyRecordDto {
                intake_date: "2024-05-02".into(),
                device_name: "Galaxy A54".into(),
                device_brand: "Samsung".into(),
                defective_imei: format!("35{}", id),
                store: store.into(),
                replacement_date: String::new(),
                supplier: String::new(),
                delivered_imei: String::new(),
                fault: "Batería".into(),
                quantity: 1,
                price,
                resolution_date: String::new(),
                processed: true,
                notes: "Cambio de batería".into(),
            },
        )
    }

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_general_report() {
        let all = vec![record("1", "K24 Norte", 100.0), record("2", "K24 Sur", 50.5)];
        let doc = build_report(&all, &FilterState::default(), None, issued());

        assert_eq!(doc.title, TITLE_GENERAL);
        assert!(!doc.is_filtered);
        assert_eq!(doc.metadata, ["Fecha de emisión: 01/06/2024"]);
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.rows[0][4], "Procesado");
        assert_eq!(doc.rows[0][5], "SI");
        assert_eq!(doc.rows[0][7], "$100");
        assert_eq!(
            doc.totals(),
            [
                "Registros en este reporte: 2".to_string(),
                "Valor Inventario (Filtrado): $150,50".to_string()
            ]
        );
        assert!(doc
            .file_name
            .starts_with("reporte_garantias_general_1717243200000"));
    }

    #[test]
    fn test_filtered_report_metadata() {
        let all = vec![record("1", "K24 Norte", 100.0), record("2", "K24 Sur", 50.0)];
        let filters = FilterState {
            store: "K24 Sur".into(),
            status: "procesado".into(),
            end_date: "2024-12-31".into(),
            ..Default::default()
        };
        let doc = build_report(&all, &filters, Some("Todo bien".into()), issued());

        assert_eq!(doc.title, TITLE_FILTERED);
        assert!(doc.file_name.starts_with("reporte_garantias_filtrado_"));
        assert_eq!(
            &doc.metadata[1..],
            [
                "Filtro Tienda: K24 Sur",
                "Filtro Estado: PROCESADO",
                "Período: Inicio a 2024-12-31"
            ]
        );
        assert_eq!(doc.total_records, 1);
        assert_eq!(doc.narrative.as_deref(), Some("Todo bien"));
    }

    struct StalledProvider;

    #[async_trait::async_trait]
    impl LlmProvider for StalledProvider {
        async fn chat_completion(
            &self,
            _messages: Vec<ChatMessage>,
        ) -> Result<LlmResponse, LlmError> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Err(LlmError::RateLimitExceeded)
        }

        fn provider_name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_export_finishes_when_model_stalls() {
        let analyst = WarrantyAnalyst::new(
            Some(Arc::new(StalledProvider) as Arc<dyn LlmProvider>),
            50,
            30,
        )
        .with_timeout(std::time::Duration::from_millis(50));
        let config = ReportConfig {
            logo_url: String::new(),
            logo_timeout_secs: 1,
        };
        let all = vec![record("1", "K24 Norte", 100.0)];
        let request = ReportRequest {
            filters: FilterState::default(),
            include_summary: true,
        };

        let report = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            export_pdf(&all, &request, &analyst, &config),
        )
        .await
        .expect("export must not wait for the model")
        .unwrap();
        assert!(report.bytes.starts_with(b"%PDF"));
        assert!(report.file_name.starts_with("reporte_garantias_general_"));
    }

    #[test]
    fn test_summary_context_placeholders() {
        assert_eq!(
            summary_context(&FilterState::default(), issued()),
            "Reporte filtrado para tienda: Todas. Estado: Todos. Fecha: 01/06/2024"
        );
    }
}
