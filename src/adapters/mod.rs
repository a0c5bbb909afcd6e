// Adapters layer: concrete implementations for files, model artifacts and exports.

pub mod csv_source;
pub mod export;
pub mod forest;
pub mod storage;

pub use csv_source::CsvEntrySource;
pub use export::ReportExporter;
pub use forest::{ForestLoader, RandomForest};
pub use storage::LocalStorage;
