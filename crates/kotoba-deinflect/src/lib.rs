pub mod cache;
pub mod expand;

pub use cache::RuleCache;
pub use expand::expand;
