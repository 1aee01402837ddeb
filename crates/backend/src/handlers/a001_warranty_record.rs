use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_warranty_record::{
    MutationOutcome, WarrantyRecord, WarrantyRecordDto,
};
use serde_json::{json, Value};

use crate::domain::a001_warranty_record::service::{self, WarrantyError};
use crate::shared::app_state::AppState;

type ApiError = (StatusCode, Json<Value>);

fn map_error(e: WarrantyError) -> ApiError {
    let status = match e {
        WarrantyError::Validation(_) => StatusCode::BAD_REQUEST,
        WarrantyError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    tracing::warn!("Warranty mutation rejected: {}", e);
    (status, Json(json!({ "error": e.to_string() })))
}

/// GET /api/warranty
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<WarrantyRecord>> {
    Json(service::list_all(&state.store).await)
}

/// POST /api/warranty
pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<WarrantyRecordDto>,
) -> Result<Json<MutationOutcome>, ApiError> {
    service::create(&state.store, &state.mutation_client, dto)
        .await
        .map(Json)
        .map_err(map_error)
}

/// PUT /api/warranty/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<WarrantyRecordDto>,
) -> Result<Json<MutationOutcome>, ApiError> {
    service::update(&state.store, &state.mutation_client, &id, dto)
        .await
        .map(Json)
        .map_err(map_error)
}

/// DELETE /api/warranty/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, ApiError> {
    service::delete(&state.store, &state.mutation_client, &id)
        .await
        .map(Json)
        .map_err(map_error)
}
