pub mod raw_row;
pub mod urls;

pub use raw_row::{RawRow, HISTORY_MARKER, PROVENANCE_COLUMN};
