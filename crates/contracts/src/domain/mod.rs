pub mod a001_warranty_record;
