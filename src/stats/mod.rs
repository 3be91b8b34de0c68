//! Statistics module - descriptive stats, hypothesis tests and dataset analysis

pub mod analyzer;
pub mod calculator;
pub mod grouping;

pub use analyzer::{AnalysisReport, Analyzer, CorrelationMatrix};
pub use calculator::{DescriptiveStats, StatsCalculator, TTestResult};
