pub mod sheets_script_client;

pub use sheets_script_client::{MutationAction, SheetsScriptClient};
