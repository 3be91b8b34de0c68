//! Data module - CSV loading, cleaning, feature derivation and persistence

pub mod features;
mod loader;
mod processor;
pub mod record;

pub use features::{CompanyType, FeatureDeriver, ReleaseEra, SalesCategory};
pub use loader::DataLoader;
pub use processor::DataProcessor;
pub use record::{GameRecord, SalesTable};
