//! Video game sales report
//!
//! Loads the raw sales CSV, cleans and enriches it, persists the processed
//! table, computes the statistics report and renders the category charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod settings;
pub mod stats;

use crate::config::ReportPaths;
use crate::data::{DataLoader, DataProcessor, FeatureDeriver, SalesTable};
use crate::error::Result;
use polars::prelude::DataFrame;
use tracing::info;

pub use crate::error::ReportError;

/// The enriched frame as written to disk and its typed projection.
pub struct PreparedData {
    pub frame: DataFrame,
    pub table: SalesTable,
}

/// Load, clean, derive features and persist the processed CSV.
pub fn prepare_data(paths: &ReportPaths) -> Result<PreparedData> {
    let raw = DataLoader::load_csv(paths.input())?;
    let cleaned = DataProcessor::clean(raw)?;
    let mut frame = FeatureDeriver::derive(cleaned)?;
    DataProcessor::save_processed(&mut frame, &paths.processed_csv)?;

    let table = SalesTable::from_dataframe(&frame)?;
    info!(
        "Final dataset: {} rows x {} columns",
        frame.height(),
        frame.width()
    );
    Ok(PreparedData { frame, table })
}
