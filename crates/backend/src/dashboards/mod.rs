pub mod d100_warranty_dashboard;
pub mod d101_warranty_report;
