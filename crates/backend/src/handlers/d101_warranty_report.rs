use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d101_warranty_report::ReportRequest;

use crate::dashboards::d101_warranty_report::service;
use crate::domain::a001_warranty_record::service as records;
use crate::shared::app_state::AppState;

/// POST /api/report/pdf
pub async fn export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, StatusCode> {
    let all = records::list_all(&state.store).await;

    let report = service::export_pdf(&all, &request, &state.analyst, &state.config.report)
        .await
        .map_err(|e| {
            tracing::error!("Failed to render PDF report: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.file_name),
        ),
    ];
    Ok((headers, report.bytes).into_response())
}
