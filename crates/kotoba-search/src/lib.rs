pub mod executor;
pub mod export;
pub mod query;

pub use executor::DictSearch;
pub use export::ExportResult;
