pub mod error;
pub mod names;
pub mod registry;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use names::{clean_table_name, format_table_name, normalize_dict_name};
pub use store::DictStore;
