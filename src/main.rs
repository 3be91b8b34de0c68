mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use vgsales_report::charts::StaticChartRenderer;
use vgsales_report::report::ReportPrinter;
use vgsales_report::settings::Settings;
use vgsales_report::stats::Analyzer;

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Video game sales report v{} starting", env!("CARGO_PKG_VERSION"));
    let paths = settings.paths();

    tracing::info!("Loading and processing data...");
    let prepared = vgsales_report::prepare_data(&paths)
        .with_context(|| format!("failed to prepare {}", paths.input.display()))?;

    tracing::info!("Performing statistical analysis...");
    let report = Analyzer::run(&prepared.table)?;

    if settings.skip_charts {
        tracing::info!("Chart rendering skipped");
    } else {
        tracing::info!("Generating visualizations...");
        StaticChartRenderer::render_all(&prepared.table, &report, &paths)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ReportPrinter::write(&report, settings.json, &mut out)?;
    out.flush()?;

    tracing::info!("Analysis complete!");
    Ok(())
}
