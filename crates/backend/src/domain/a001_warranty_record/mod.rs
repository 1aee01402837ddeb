pub mod column_map;
pub mod normalizer;
pub mod repository;
pub mod service;
