use axum::{extract::State, Json};
use contracts::usecases::u103_ai_assistant::{request::AskRequest, response::AskResponse};

use crate::dashboards::d100_warranty_dashboard::service::filter_records;
use crate::domain::a001_warranty_record::service;
use crate::shared::app_state::AppState;

/// POST /api/ai/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Json<AskResponse> {
    // Копия, чтобы не держать блокировку на время запроса к модели
    let records = service::list_all(&state.store).await;
    let filtered = filter_records(&records, &request.filters);
    let answer = state.analyst.answer(&filtered, &request.question).await;
    Json(AskResponse { answer })
}
