//! Static Chart Renderer
//! Composes the 2x2 panel figures of every analysis category and writes
//! them as PNG files.
//!
//! Layout per figure:
//! 1. Title centered at the top
//! 2. Four panels in a 2x2 grid, drawn by `ChartPlotter`
//!
//! Drawing goes into an in-memory RGB buffer that `image` encodes.

use crate::charts::plotter::{
    equal_width_intervals, interval_index, BarSeries, BoxGroup, ChartPlotter, LineSeries2D, Panel,
    DARK_ORANGE, FONT, GOLD, LIGHT_BLUE, LIGHT_CORAL, LIGHT_GREEN, LIGHT_STEEL_BLUE, ORANGE,
    PURPLE, SALMON, SKY_BLUE, STEEL_BLUE,
};
use crate::config::{
    ReportPaths, COL_CRITIC, COL_EU, COL_GLOBAL, COL_JP, COL_NA, COL_OTHER, FIGURE_SIZE,
    REGION_COLUMNS, REGION_NAMES,
};
use crate::data::{CompanyType, GameRecord, ReleaseEra, SalesTable};
use crate::error::{ReportError, Result};
use crate::stats::grouping::{
    aggregate_by, by_genre, by_platform, by_publisher, count, group_records, mean_critic,
    mean_sales, rank_asc, rank_desc, success_rate, top_by_count, top_by_total_sales, total_sales,
};
use crate::stats::{AnalysisReport, StatsCalculator};
use image::RgbImage;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GENRE_DIR: &str = "genre_analysis";
const CRITIC_DIR: &str = "critic_analysis";
const PUBLISHER_DIR: &str = "publisher_analysis";
const PLATFORM_DIR: &str = "platform_analysis";
const REGIONAL_DIR: &str = "regional_analysis";
const TEMPORAL_DIR: &str = "temporal_analysis";

const HEATMAP_COLUMNS: [&str; 6] = [COL_GLOBAL, COL_NA, COL_EU, COL_JP, COL_OTHER, COL_CRITIC];
const REGION_COLORS: [RGBColor; 4] = [BLUE, GREEN, RED, ORANGE];
const ERA_COLORS: [RGBColor; 4] = [RED, BLUE, GREEN, ORANGE];
const HISTOGRAM_BINS: usize = 50;
const HISTOGRAM_X_MAX: f64 = 5.0;
const CRITIC_BINS: usize = 10;
const LOG_FLOOR: f64 = 0.01;

const PUBLISHER_FIGURE_TITLE: &str = "Publisher and Genre Performance Analysis";
const CRITIC_BOX_TITLE: &str = "Critic Score Distribution: Successful vs Unsuccessful Games";
const TOP_PUBLISHER_COLOR: RGBColor = LIGHT_BLUE;

fn millions(_: usize, value: f64) -> Option<String> {
    Some(format!("${value:.2}M"))
}

fn whole_millions(_: usize, value: f64) -> Option<String> {
    Some(format!("${value:.0}M"))
}

fn percent(_: usize, value: f64) -> Option<String> {
    Some(format!("{value:.1}%"))
}

fn above_tenth(_: usize, value: f64) -> Option<String> {
    (value > 0.1).then(|| format!("{value:.2}"))
}

/// Largest-first rankings read best top-down on a bottom-up bar axis.
fn top_down(mut ranked: Vec<(String, f64)>) -> Vec<(String, f64)> {
    ranked.reverse();
    ranked
}

/// Critic-score intervals over the observed range and the mean global sales
/// of each; empty intervals are NaN.
pub fn critic_bin_means(records: &[GameRecord], bins: usize) -> Vec<(String, f64)> {
    let scores: Vec<f64> = records.iter().filter_map(|r| r.critic_score).collect();
    if scores.is_empty() {
        return Vec::new();
    }
    let stats = StatsCalculator::compute_descriptive_stats(&scores);

    let intervals = equal_width_intervals(stats.min, stats.max, bins);
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); intervals.len()];
    for record in records {
        if let Some(idx) = record.critic_score.and_then(|s| interval_index(&intervals, s)) {
            buckets[idx].push(record.global_sales);
        }
    }

    intervals
        .iter()
        .zip(buckets)
        .map(|((lower, upper), sales)| {
            let label = format!("{}-{}", lower.trunc() as i64, upper.trunc() as i64);
            (label, StatsCalculator::mean(&sales))
        })
        .collect()
}

/// Platform with the highest total sales in every era present, in era order.
pub fn dominant_platform_per_era(records: &[GameRecord]) -> Vec<(ReleaseEra, String, f64)> {
    ReleaseEra::ALL
        .iter()
        .filter_map(|era| {
            let in_era = records.iter().filter(|r| r.release_era == *era);
            let ranked = rank_desc(aggregate_by(in_era, by_platform, total_sales));
            ranked
                .into_iter()
                .next()
                .map(|(platform, sales)| (*era, platform, sales))
        })
        .collect()
}

/// Per-year series `(year, value)` in ascending year order.
fn yearly<F>(records: &[GameRecord], reduce: F) -> Vec<(f64, f64)>
where
    F: Fn(&[&GameRecord]) -> f64,
{
    group_records(records, |r| format!("{:06}", r.year))
        .into_iter()
        .filter_map(|(_, rows)| {
            let year = rows.first()?.year as f64;
            Some((year, reduce(&rows)))
        })
        .collect()
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every category figure, returning the written paths.
    pub fn render_all(
        table: &SalesTable,
        report: &AnalysisReport,
        paths: &ReportPaths,
    ) -> Result<Vec<PathBuf>> {
        let mut written = vec![
            Self::genre_analysis(table, paths)?,
            Self::critic_analysis(table, report, paths)?,
            Self::publisher_analysis(table, paths)?,
            Self::platform_analysis(table, paths)?,
        ];
        written.extend(Self::regional_analysis(table, paths)?);
        written.push(Self::temporal_analysis(table, paths)?);

        info!(
            "Saved {} figures under {}",
            written.len(),
            paths.figures_dir.display()
        );
        Ok(written)
    }

    fn figure_path(paths: &ReportPaths, category: &str, file: &str) -> Result<PathBuf> {
        let dir = paths.category_dir(category);
        fs::create_dir_all(&dir).map_err(|source| ReportError::OutputPath {
            path: dir.clone(),
            source,
        })?;
        Ok(paths.figure(category, file))
    }

    /// Draw a titled 2x2 figure into a buffer and encode it to `path`.
    fn render_figure<F>(path: &Path, title: &str, draw: F) -> Result<()>
    where
        F: FnOnce(&[Panel<'_>]) -> Result<()>,
    {
        let (width, height) = FIGURE_SIZE;
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            let body = root.titled(title, (FONT, 40).into_font().style(FontStyle::Bold))?;
            let panels = body.margin(10, 10, 10, 10).split_evenly((2, 2));
            draw(&panels)?;
            root.present()?;
        }

        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ReportError::Drawing(format!("pixel buffer does not match {width}x{height}"))
        })?;
        image.save(path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    pub fn genre_analysis(table: &SalesTable, paths: &ReportPaths) -> Result<PathBuf> {
        info!("Creating genre analysis visualizations...");
        let path = Self::figure_path(paths, GENRE_DIR, "genre_analysis.png")?;
        let records = &table.records;

        let avg = rank_asc(aggregate_by(records, by_genre, mean_sales));
        let total = rank_asc(aggregate_by(records, by_genre, total_sales));
        let counts = rank_desc(aggregate_by(records, by_genre, count));
        let success = rank_asc(aggregate_by(records, by_genre, success_rate));

        Self::render_figure(&path, "Genre Analysis for Video Game Success", |panels| {
            ChartPlotter::horizontal_bars(
                &panels[0],
                &BarSeries {
                    title: "Average Global Sales by Genre",
                    axis_desc: "Average Global Sales (Millions)",
                    bars: &avg,
                    colors: &[SKY_BLUE],
                    annotate: Some(&millions),
                },
            )?;
            ChartPlotter::horizontal_bars(
                &panels[1],
                &BarSeries {
                    title: "Total Global Sales by Genre",
                    axis_desc: "Total Global Sales (Millions)",
                    bars: &total,
                    colors: &[LIGHT_GREEN],
                    annotate: None,
                },
            )?;
            ChartPlotter::vertical_bars(
                &panels[2],
                &BarSeries {
                    title: "Number of Games by Genre",
                    axis_desc: "Number of Games",
                    bars: &counts,
                    colors: &[SALMON],
                    annotate: None,
                },
            )?;
            ChartPlotter::horizontal_bars(
                &panels[3],
                &BarSeries {
                    title: "Success Rate by Genre (%)",
                    axis_desc: "Success Rate (%)",
                    bars: &success,
                    colors: &[GOLD],
                    annotate: Some(&percent),
                },
            )
        })?;
        Ok(path)
    }

    pub fn critic_analysis(
        table: &SalesTable,
        report: &AnalysisReport,
        paths: &ReportPaths,
    ) -> Result<PathBuf> {
        info!("Creating critic score analysis visualizations...");
        let path = Self::figure_path(paths, CRITIC_DIR, "critic_analysis.png")?;
        let records = &table.records;

        let scatter: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| r.critic_score.map(|c| (c, r.global_sales)))
            .collect();
        let bin_means = critic_bin_means(records, CRITIC_BINS);

        let (successful, unsuccessful): (Vec<&GameRecord>, Vec<&GameRecord>) =
            records.iter().partition(|r| r.is_successful);
        let critic_of = |rows: &[&GameRecord]| -> Vec<f64> {
            rows.iter().filter_map(|r| r.critic_score).collect()
        };
        let boxes = [
            BoxGroup {
                label: "Unsuccessful".to_string(),
                values: critic_of(&unsuccessful[..]),
                color: LIGHT_CORAL,
            },
            BoxGroup {
                label: "Successful".to_string(),
                values: critic_of(&successful[..]),
                color: LIGHT_GREEN,
            },
        ];

        let matrix = report.correlations.subset(&HEATMAP_COLUMNS);

        Self::render_figure(&path, "Critic Score vs Sales Relationship", |panels| {
            ChartPlotter::scatter_with_trend(
                &panels[0],
                "Critic Score vs Global Sales",
                "Critic Score",
                "Global Sales (Millions)",
                &scatter,
            )?;
            ChartPlotter::category_line_chart(
                &panels[1],
                "Average Sales by Critic Score Range",
                "Critic Score Range",
                "Average Global Sales (Millions)",
                &bin_means,
                GREEN,
            )?;
            ChartPlotter::box_plot(
                &panels[2],
                CRITIC_BOX_TITLE,
                "Critic Score",
                &boxes,
                None,
            )?;
            ChartPlotter::heatmap(
                &panels[3],
                "Sales and Score Correlation Matrix",
                &matrix.columns,
                &matrix.values,
            )
        })?;
        Ok(path)
    }

    pub fn publisher_analysis(table: &SalesTable, paths: &ReportPaths) -> Result<PathBuf> {
        info!("Creating publisher analysis visualizations...");
        let path = Self::figure_path(paths, PUBLISHER_DIR, "publisher_analysis.png")?;
        let records = &table.records;

        let top_sales = top_down(top_by_total_sales(records, by_publisher, 10));

        let by_company = |r: &GameRecord| r.company_type.as_str().to_string();
        let company_rates = aggregate_by(records, by_company, success_rate);
        let company_rates: Vec<(String, f64)> = CompanyType::ALL
            .iter()
            .filter_map(|kind| {
                company_rates
                    .iter()
                    .find(|(label, _)| label == kind.as_str())
                    .cloned()
            })
            .collect();

        let prolific = top_by_count(records, by_publisher, 10);
        let prolific_rates: Vec<(String, f64)> = {
            let rates = aggregate_by(
                records
                    .iter()
                    .filter(|r| prolific.iter().any(|(p, _)| *p == r.publisher)),
                by_publisher,
                success_rate,
            );
            rank_asc(rates)
        };

        let sales_of = |kind: CompanyType| -> Vec<f64> {
            records
                .iter()
                .filter(|r| r.company_type == kind)
                .map(|r| r.global_sales)
                .collect()
        };
        let boxes = [
            BoxGroup {
                label: CompanyType::Aaa.as_str().to_string(),
                values: sales_of(CompanyType::Aaa),
                color: LIGHT_BLUE,
            },
            BoxGroup {
                label: CompanyType::IndieOther.as_str().to_string(),
                values: sales_of(CompanyType::IndieOther),
                color: LIGHT_CORAL,
            },
        ];

        Self::render_figure(&path, PUBLISHER_FIGURE_TITLE, |panels| {
            ChartPlotter::horizontal_bars(
                &panels[0],
                &BarSeries {
                    title: "Top 10 Publishers by Total Sales",
                    axis_desc: "Total Global Sales (Millions)",
                    bars: &top_sales,
                    colors: &[TOP_PUBLISHER_COLOR],
                    annotate: Some(&whole_millions),
                },
            )?;
            ChartPlotter::vertical_bars(
                &panels[1],
                &BarSeries {
                    title: "Success Rate: AAA vs Indie/Other Games",
                    axis_desc: "Success Rate (%)",
                    bars: &company_rates,
                    colors: &[STEEL_BLUE, DARK_ORANGE],
                    annotate: Some(&percent),
                },
            )?;
            ChartPlotter::horizontal_bars(
                &panels[2],
                &BarSeries {
                    title: "Success Rate for Top 10 Publishers",
                    axis_desc: "Success Rate (%)",
                    bars: &prolific_rates,
                    colors: &[LIGHT_GREEN],
                    annotate: Some(&percent),
                },
            )?;
            ChartPlotter::box_plot(
                &panels[3],
                "Sales Distribution: AAA vs Indie/Other",
                "Global Sales (Millions, log scale)",
                &boxes,
                Some(LOG_FLOOR),
            )
        })?;
        Ok(path)
    }

    pub fn platform_analysis(table: &SalesTable, paths: &ReportPaths) -> Result<PathBuf> {
        info!("Creating platform analysis visualizations...");
        let path = Self::figure_path(paths, PLATFORM_DIR, "platform_analysis.png")?;
        let records = &table.records;

        let top_sales = top_down(top_by_total_sales(records, by_platform, 15));

        let dominant = dominant_platform_per_era(records);
        let era_bars: Vec<(String, f64)> = dominant
            .iter()
            .map(|(era, _, sales)| (era.as_str().to_string(), *sales))
            .collect();
        let era_platform = |i: usize, _: f64| dominant.get(i).map(|(_, p, _)| p.clone());

        let mut best_success = rank_desc(aggregate_by(records, by_platform, success_rate));
        best_success.truncate(10);
        let best_success = top_down(best_success);

        let counts = top_down(top_by_count(records, by_platform, 15));

        Self::render_figure(&path, "Platform Performance Analysis", |panels| {
            ChartPlotter::horizontal_bars(
                &panels[0],
                &BarSeries {
                    title: "Top 15 Platforms by Total Sales",
                    axis_desc: "Total Global Sales (Millions)",
                    bars: &top_sales,
                    colors: &[LIGHT_STEEL_BLUE],
                    annotate: None,
                },
            )?;
            ChartPlotter::vertical_bars(
                &panels[1],
                &BarSeries {
                    title: "Dominant Platform in Each Era",
                    axis_desc: "Sales by Dominant Platform (Millions)",
                    bars: &era_bars,
                    colors: &ERA_COLORS,
                    annotate: Some(&era_platform),
                },
            )?;
            ChartPlotter::horizontal_bars(
                &panels[2],
                &BarSeries {
                    title: "Top 10 Platforms by Success Rate",
                    axis_desc: "Success Rate (%)",
                    bars: &best_success,
                    colors: &[LIGHT_GREEN],
                    annotate: None,
                },
            )?;
            ChartPlotter::horizontal_bars(
                &panels[3],
                &BarSeries {
                    title: "Number of Games Released per Platform (Top 15)",
                    axis_desc: "Number of Games",
                    bars: &counts,
                    colors: &[SALMON],
                    annotate: None,
                },
            )
        })?;
        Ok(path)
    }

    /// Writes the regional histograms and the genre-preference bars.
    pub fn regional_analysis(table: &SalesTable, paths: &ReportPaths) -> Result<Vec<PathBuf>> {
        info!("Creating regional analysis visualizations...");
        let distribution = Self::figure_path(paths, REGIONAL_DIR, "regional_distribution.png")?;
        let preferences = Self::figure_path(paths, REGIONAL_DIR, "regional_genre_preferences.png")?;
        let records = &table.records;

        let positive: Vec<Vec<f64>> = (0..REGION_COLUMNS.len())
            .map(|i| {
                records
                    .iter()
                    .map(|r| r.regional_sales()[i])
                    .filter(|v| *v > 0.0)
                    .collect()
            })
            .collect();

        Self::render_figure(&distribution, "Regional Sales Analysis", |panels| {
            for (i, panel) in panels.iter().enumerate().take(REGION_NAMES.len()) {
                let name = REGION_NAMES[i];
                ChartPlotter::histogram(
                    panel,
                    &format!("Sales Distribution in {name}"),
                    &format!("Sales in {name} (Millions)"),
                    &positive[i],
                    HISTOGRAM_BINS,
                    HISTOGRAM_X_MAX,
                    REGION_COLORS[i],
                )?;
            }
            Ok(())
        })?;

        let genre_means: Vec<Vec<(String, f64)>> = (0..REGION_COLUMNS.len())
            .map(|i| {
                rank_asc(aggregate_by(records, by_genre, |rows| {
                    let values: Vec<f64> = rows.iter().map(|r| r.regional_sales()[i]).collect();
                    StatsCalculator::mean(&values)
                }))
            })
            .collect();

        Self::render_figure(&preferences, "Genre Preferences by Region", |panels| {
            for (i, panel) in panels.iter().enumerate().take(REGION_NAMES.len()) {
                ChartPlotter::horizontal_bars(
                    panel,
                    &BarSeries {
                        title: &format!("Average {} Sales by Genre", REGION_NAMES[i]),
                        axis_desc: "Average Sales (Millions)",
                        bars: &genre_means[i],
                        colors: &REGION_COLORS[i..=i],
                        annotate: Some(&above_tenth),
                    },
                )?;
            }
            Ok(())
        })?;

        Ok(vec![distribution, preferences])
    }

    pub fn temporal_analysis(table: &SalesTable, paths: &ReportPaths) -> Result<PathBuf> {
        info!("Creating temporal analysis visualizations...");
        let path = Self::figure_path(paths, TEMPORAL_DIR, "temporal_analysis.png")?;
        let records = &table.records;

        let games = yearly(records, count);
        let avg_sales = yearly(records, mean_sales);
        let success = yearly(records, success_rate);
        let critic = yearly(records, mean_critic);

        Self::render_figure(&path, "Temporal Trends in Video Game Industry", |panels| {
            let series = [
                ("Games Released Per Year", "Number of Games", &games, BLUE),
                ("Average Sales Per Year", "Average Global Sales (Millions)", &avg_sales, GREEN),
                ("Success Rate Over Time", "Success Rate (%)", &success, RED),
                ("Average Critic Score Over Time", "Average Critic Score", &critic, PURPLE),
            ];
            for (panel, (title, y_desc, points, color)) in panels.iter().zip(series) {
                ChartPlotter::line_chart(
                    panel,
                    &LineSeries2D {
                        title,
                        x_desc: "Year",
                        y_desc,
                        points,
                        color,
                    },
                )?;
            }
            Ok(())
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::record;
    use crate::stats::Analyzer;

    fn records() -> Vec<GameRecord> {
        vec![
            record("NES", "Platform", "Nintendo", 1985, [29.0, 3.6, 6.8, 0.8], Some(90.0)),
            record("PS", "Racing", "Sony Computer Entertainment", 1997, [4.0, 3.0, 2.0, 1.0], Some(80.0)),
            record("PS2", "Action", "Take-Two Interactive", 2004, [9.4, 0.4, 0.4, 10.6], Some(95.0)),
            record("Wii", "Sports", "Nintendo", 2006, [41.4, 29.0, 3.8, 8.5], Some(76.0)),
            record("DS", "Puzzle", "Tiny Studio", 2007, [0.05, 0.02, 0.0, 0.01], Some(50.0)),
            record("PC", "Strategy", "Small Co", 2012, [0.1, 0.2, 0.0, 0.05], Some(70.0)),
            record("PS4", "Action", "Small Co", 2015, [0.5, 0.8, 0.1, 0.2], Some(60.0)),
            record("PC", "Puzzle", "Tiny Studio", 2013, [0.0, 0.03, 0.0, 0.0], Some(40.0)),
        ]
    }

    #[test]
    fn test_dominant_platform_per_era() {
        let data = records();
        let dominant = dominant_platform_per_era(&data);
        let eras: Vec<ReleaseEra> = dominant.iter().map(|(e, _, _)| *e).collect();
        assert_eq!(
            eras,
            [
                ReleaseEra::Era1980s,
                ReleaseEra::Era1990s,
                ReleaseEra::Era2000s,
                ReleaseEra::Era2010s
            ]
        );
        assert_eq!(dominant[2].1, "Wii");
        assert_eq!(dominant[3].1, "PS4");
    }

    #[test]
    fn test_critic_bin_means() {
        let data = records();
        let bins = critic_bin_means(&data, 10);
        assert_eq!(bins.len(), 10);
        // 40..95 over ten bins: the lowest score lands in the first interval
        assert_eq!(bins[0].0, "39-45");
        assert!((bins[0].1 - 0.03).abs() < 1e-9);
        assert!(bins.iter().any(|(_, v)| v.is_nan()));
        assert!(critic_bin_means(&[], 10).is_empty());
    }

    #[test]
    fn test_yearly_series_is_chronological() {
        let data = records();
        let games = yearly(&data, count);
        let years: Vec<f64> = games.iter().map(|(y, _)| *y).collect();
        let mut sorted = years.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(years, sorted);
        assert_eq!(games.len(), 8);
    }

    #[test]
    fn test_annotations() {
        assert_eq!(millions(0, 1.234), Some("$1.23M".to_string()));
        assert_eq!(percent(0, 12.34), Some("12.3%".to_string()));
        assert_eq!(above_tenth(0, 0.05), None);
        assert_eq!(above_tenth(0, 0.25), Some("0.25".to_string()));
    }

    #[test]
    fn test_publisher_and_critic_figure_labels() {
        assert_eq!(PUBLISHER_FIGURE_TITLE, "Publisher and Genre Performance Analysis");
        assert_eq!(
            CRITIC_BOX_TITLE,
            "Critic Score Distribution: Successful vs Unsuccessful Games"
        );
        assert_eq!(TOP_PUBLISHER_COLOR, RGBColor(173, 216, 230));
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_render_all_writes_every_figure() {
        let table = SalesTable::new(records(), false);
        let report = Analyzer::run(&table).expect("report");
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ReportPaths {
            figures_dir: dir.path().join("figures"),
            ..ReportPaths::default()
        };

        let written = StaticChartRenderer::render_all(&table, &report, &paths).expect("render");
        assert_eq!(written.len(), 7);
        for path in &written {
            assert!(path.exists(), "missing {}", path.display());
        }
        assert!(paths
            .figure(REGIONAL_DIR, "regional_genre_preferences.png")
            .exists());
    }
}
