use axum::{extract::State, Json};
use contracts::dashboards::d100_warranty_dashboard::{DashboardResponse, FilterState};

use crate::dashboards::d100_warranty_dashboard::service;
use crate::shared::app_state::AppState;

/// POST /api/dashboard/warranty
pub async fn get_dashboard(
    State(state): State<AppState>,
    Json(filters): Json<FilterState>,
) -> Json<DashboardResponse> {
    let store = state.store.read().await;
    Json(service::summarize(store.list_all(), &filters))
}
