use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::shared::app_state::AppState;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Warranty records
        .route(
            "/api/warranty",
            get(handlers::a001_warranty_record::list_all)
                .post(handlers::a001_warranty_record::create),
        )
        .route(
            "/api/warranty/:id",
            put(handlers::a001_warranty_record::update)
                .delete(handlers::a001_warranty_record::delete),
        )
        // U101 Load from the spreadsheet
        .route(
            "/api/warranty/reload",
            post(handlers::u101_load_warranty_data::reload),
        )
        .route(
            "/api/warranty/load_status",
            get(handlers::u101_load_warranty_data::load_status),
        )
        // D100 Dashboard
        .route(
            "/api/dashboard/warranty",
            post(handlers::d100_warranty_dashboard::get_dashboard),
        )
        // D101 PDF report
        .route(
            "/api/report/pdf",
            post(handlers::d101_warranty_report::export_pdf),
        )
        // U103 AI assistant
        .route("/api/ai/ask", post(handlers::u103_ai_assistant::ask))
        .layer(middleware::from_fn(system::middleware::request_logger))
        .with_state(state)
}
