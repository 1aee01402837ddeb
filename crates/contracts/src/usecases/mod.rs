pub mod u101_load_warranty_data;
pub mod u103_ai_assistant;
