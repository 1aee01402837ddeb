use axum::{extract::State, http::StatusCode, Json};
use contracts::usecases::u101_load_warranty_data::response::LoadResponse;

use crate::domain::a001_warranty_record::service;
use crate::shared::app_state::AppState;

/// POST /api/warranty/reload
pub async fn reload(State(state): State<AppState>) -> Json<LoadResponse> {
    Json(service::reload(&state.store, &state.resolver).await)
}

/// GET /api/warranty/load_status
pub async fn load_status(State(state): State<AppState>) -> Result<Json<LoadResponse>, StatusCode> {
    service::last_load(&state.store)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
