pub mod a001_warranty_record;
pub mod d100_warranty_dashboard;
pub mod d101_warranty_report;
pub mod u101_load_warranty_data;
pub mod u103_ai_assistant;
