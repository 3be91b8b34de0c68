use crate::config::{ReportPaths, DEFAULT_FIGURES_DIR, DEFAULT_INPUT, DEFAULT_OUTPUT};
use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean video game sales data, compute statistics and render report charts
#[derive(Parser, Debug, Clone)]
#[command(
    name = "vgsales-report",
    about = "Clean video game sales data, compute statistics and render report charts",
    version
)]
pub struct Settings {
    /// Raw sales CSV
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where the cleaned and enriched CSV is written
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Root directory of the chart images
    #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
    pub figures_dir: PathBuf,

    /// Run only the data and statistics stages
    #[arg(long)]
    pub skip_charts: bool,

    /// Print the statistics report as JSON
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

impl Settings {
    /// Output locations derived from the command line.
    pub fn paths(&self) -> ReportPaths {
        ReportPaths {
            input: self.input.clone(),
            processed_csv: self.output.clone(),
            figures_dir: self.figures_dir.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["vgsales-report"]).unwrap();
        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(settings.figures_dir, PathBuf::from(DEFAULT_FIGURES_DIR));
        assert!(!settings.skip_charts);
        assert!(!settings.json);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_overrides_resolve_into_paths() {
        let settings = Settings::try_parse_from([
            "vgsales-report",
            "--input",
            "raw.csv",
            "--output",
            "out/clean.csv",
            "--figures-dir",
            "out/figs",
            "--skip-charts",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(settings.skip_charts);
        assert!(settings.json);
        assert_eq!(settings.log_level, "debug");

        let paths = settings.paths();
        assert_eq!(paths.input, PathBuf::from("raw.csv"));
        assert_eq!(paths.processed_csv, PathBuf::from("out/clean.csv"));
        assert_eq!(
            paths.figure("genre_analysis", "genre_analysis.png"),
            PathBuf::from("out/figs/genre_analysis/genre_analysis.png")
        );
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Settings::try_parse_from(["vgsales-report", "--log-level", "loud"]).is_err());
    }
}
