//! Error types shared by every pipeline stage.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while building the sales report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input file is missing columns the pipeline cannot work without.
    #[error("Input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The input could not be parsed, or a frame operation failed.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A hypothesis test had a group too small to compute a variance.
    #[error("Insufficient data for {test}: group '{group}' has {count} observation(s)")]
    InsufficientData {
        test: &'static str,
        group: String,
        count: usize,
    },

    /// An output file or directory could not be created.
    #[error("Cannot write to {path}: {source}")]
    OutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// plotters failed while drawing a panel.
    #[error("Drawing failed: {0}")]
    Drawing(String),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for ReportError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ReportError::Drawing(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_columns() {
        let err = ReportError::MissingColumns(vec!["Genre".into(), "Platform".into()]);
        assert_eq!(
            err.to_string(),
            "Input is missing required columns: Genre, Platform"
        );
    }

    #[test]
    fn test_error_display_insufficient_data() {
        let err = ReportError::InsufficientData {
            test: "AAA vs Indie/Other sales",
            group: "AAA".into(),
            count: 0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data for AAA vs Indie/Other sales: group 'AAA' has 0 observation(s)"
        );
    }

    #[test]
    fn test_error_display_output_path() {
        let err = ReportError::OutputPath {
            path: PathBuf::from("/readonly/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/readonly/out.csv"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }
}
