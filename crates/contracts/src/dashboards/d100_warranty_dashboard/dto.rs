use serde::{Deserialize, Serialize};

use crate::domain::a001_warranty_record::{WarrantyRecord, WarrantyStatus};

/// Which sheet the records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordView {
    /// Only the working sheet
    Active,
    /// Only the history sheet
    History,
    #[default]
    All,
}

/// Filter state of the dashboard. Empty string means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Inclusive lower bound, "YYYY-MM-DD"
    #[serde(rename = "startDate", default)]
    pub start_date: String,
    /// Inclusive upper bound, "YYYY-MM-DD"
    #[serde(rename = "endDate", default)]
    pub end_date: String,
    /// Exact store name
    #[serde(rename = "tienda", default)]
    pub store: String,
    /// Case-insensitive search over device name, brand and defective IMEI
    #[serde(alias = "imei", default)]
    pub query: String,
    /// "pendiente" | "procesado" | "entregado"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub view: RecordView,
}

impl FilterState {
    /// Parsed status filter; unknown values behave like "any"
    pub fn status_filter(&self) -> Option<WarrantyStatus> {
        if self.status.trim().is_empty() {
            return None;
        }
        WarrantyStatus::from_str(&self.status).ok()
    }

    /// True when at least one predicate restricts the set
    pub fn is_active(&self) -> bool {
        !self.start_date.trim().is_empty()
            || !self.end_date.trim().is_empty()
            || !self.store.trim().is_empty()
            || !self.query.trim().is_empty()
            || self.status_filter().is_some()
            || self.view != RecordView::All
    }
}

/// Summary cards of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
    #[serde(rename = "totalValue")]
    pub total_value: f64,
    #[serde(rename = "topBrand")]
    pub top_brand: String,
    #[serde(rename = "topStore")]
    pub top_store: String,
}

/// Response for the warranty dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Filtered records, in load order
    pub records: Vec<WarrantyRecord>,
    /// Store names for the store selector (from all loaded records)
    pub stores: Vec<String>,
    pub stats: Stats,
    /// Size of the loaded set before filtering
    pub total_loaded: usize,
}
