pub mod logo;
pub mod pdf_renderer;
pub mod service;
