pub mod u101_load_warranty_data;
pub mod u102_sync_to_sheets;
pub mod u103_ai_assistant;
