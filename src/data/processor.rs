//! Data Processor Module
//! Handles data cleaning (imputation, critical-row drops) and persisting the
//! enriched table.

use crate::config::{COL_CRITIC, COL_GENRE, COL_PLATFORM, COL_PUBLISHER, COL_YEAR, UNKNOWN_PUBLISHER};
use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Handles data cleaning and persistence operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Percentage of missing values per column, only for columns that have any.
    pub fn missing_value_report(df: &DataFrame) -> Vec<(String, f64)> {
        let height = df.height();
        if height == 0 {
            return Vec::new();
        }

        df.get_columns()
            .iter()
            .filter(|c| c.null_count() > 0)
            .map(|c| {
                let pct = c.null_count() as f64 / height as f64 * 100.0;
                (c.name().to_string(), pct)
            })
            .collect()
    }

    /// Impute critic scores and publishers, then drop rows that cannot be grouped.
    ///
    /// Critic scores are filled with the (platform, genre) median first and the
    /// global median of the result second. Imputation runs before the drop so
    /// every source row contributes to the medians.
    pub fn clean(df: DataFrame) -> Result<DataFrame> {
        let initial_rows = df.height();

        info!("Missing values before cleaning:");
        for (name, pct) in Self::missing_value_report(&df) {
            info!("  {:<20} {:>6.2}%", name, pct);
        }

        let keys_present = col(COL_PLATFORM)
            .is_not_null()
            .and(col(COL_GENRE).is_not_null());
        let group_median = col(COL_CRITIC)
            .median()
            .over([col(COL_PLATFORM), col(COL_GENRE)]);

        let cleaned = df
            .lazy()
            .with_column(
                col(COL_CRITIC).fill_null(
                    when(keys_present)
                        .then(group_median)
                        .otherwise(col(COL_CRITIC)),
                ),
            )
            .with_column(col(COL_CRITIC).fill_null(col(COL_CRITIC).median()))
            .with_column(col(COL_PUBLISHER).fill_null(lit(UNKNOWN_PUBLISHER)))
            .filter(
                col(COL_YEAR)
                    .is_not_null()
                    .and(col(COL_GENRE).is_not_null())
                    .and(col(COL_PLATFORM).is_not_null()),
            )
            .collect()?;

        info!(
            "Removed {} rows with critical missing values",
            initial_rows - cleaned.height()
        );

        Ok(cleaned)
    }

    /// Write the enriched table as CSV, creating the parent directory if needed.
    /// An existing file is overwritten.
    pub fn save_processed(df: &mut DataFrame, file_path: &Path) -> Result<()> {
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ReportError::OutputPath {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = File::create(file_path).map_err(|source| ReportError::OutputPath {
            path: file_path.to_path_buf(),
            source,
        })?;

        CsvWriter::new(&mut file).include_header(true).finish(df)?;

        info!("Processed data saved to {}", file_path.display());
        Ok(())
    }
}
