pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use csv_export::export_day_estimates;
pub use csv_import::import_holidays;
pub use file::{JsonFileStore, MemoryStore, WorkspaceStore};
