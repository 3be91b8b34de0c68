//! Dataset analysis: correlations, summary statistics, per-group performance,
//! hypothesis tests and the insights derived from them.

use crate::config::{
    COL_CRITIC, COL_GLOBAL, COL_USER, CORRELATION_COLUMNS, TOP_PLATFORMS, TOP_PUBLISHERS,
};
use crate::data::{CompanyType, GameRecord, SalesTable};
use crate::error::{ReportError, Result};
use crate::stats::calculator::{StatsCalculator, TTestResult};
use crate::stats::grouping::{
    aggregate_by, by_genre, by_platform, by_publisher, count, group_records, mean_critic,
    mean_sales, median_sales, rank_desc, success_rate, top_by_total_sales, total_sales,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub const AAA_VS_INDIE_TEST: &str = "AAA vs Indie/Other global sales";
pub const CRITIC_SUCCESS_TEST: &str = "critic score by success";

/// Square Pearson correlation matrix with labelled rows and columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }

    /// Sub-matrix restricted to `columns`, in that order. Unknown names are skipped.
    pub fn subset(&self, columns: &[&str]) -> CorrelationMatrix {
        let keep: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.columns.iter().position(|have| have == c))
            .collect();

        CorrelationMatrix {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            values: keep
                .iter()
                .map(|&i| keep.iter().map(|&j| self.values[i][j]).collect())
                .collect(),
        }
    }
}

/// Dataset-wide descriptive statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStatistics {
    pub total_games: usize,
    pub successful_games: usize,
    pub success_rate: f64,
    pub avg_global_sales: f64,
    pub median_global_sales: f64,
    pub total_global_sales: f64,
    pub top_genre_sales: String,
    pub top_genre_count: String,
    pub top_publisher_sales: String,
    pub top_platform_sales: String,
    pub avg_critic_score: f64,
    pub years_covered: String,
}

impl SummaryStatistics {
    /// `(key, formatted value)` pairs in report order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("total_games", self.total_games.to_string()),
            ("successful_games", self.successful_games.to_string()),
            ("success_rate", format!("{:.2}", self.success_rate)),
            ("avg_global_sales", format!("{:.4}", self.avg_global_sales)),
            ("median_global_sales", format!("{:.4}", self.median_global_sales)),
            ("total_global_sales", format!("{:.2}", self.total_global_sales)),
            ("top_genre_sales", self.top_genre_sales.clone()),
            ("top_genre_count", self.top_genre_count.clone()),
            ("top_publisher_sales", self.top_publisher_sales.clone()),
            ("top_platform_sales", self.top_platform_sales.clone()),
            ("avg_critic_score", format!("{:.2}", self.avg_critic_score)),
            ("years_covered", self.years_covered.clone()),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenrePerformance {
    pub genre: String,
    pub count: usize,
    pub avg_sales: f64,
    pub median_sales: f64,
    pub total_sales: f64,
    pub avg_critic: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublisherPerformance {
    pub publisher: String,
    pub count: usize,
    pub avg_sales: f64,
    pub total_sales: f64,
    pub avg_critic: f64,
    pub success_rate: f64,
    pub company_type: CompanyType,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformPerformance {
    pub platform: String,
    pub count: usize,
    pub avg_sales: f64,
    pub total_sales: f64,
    pub avg_critic: f64,
    pub success_rate: f64,
    pub first_year: i32,
    pub last_year: i32,
    pub lifespan: i32,
}

/// A Welch t-test between two labelled samples.
#[derive(Debug, Clone, Serialize)]
pub struct GroupComparison {
    pub group_a: String,
    pub group_b: String,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    pub test: TTestResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticalTests {
    pub aaa_vs_indie: GroupComparison,
    pub critic_success: GroupComparison,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub best_genre: String,
    pub best_genre_avg_sales: f64,
    pub worst_genre: String,
    pub critic_correlation: f64,
    pub aaa_success_rate: f64,
    pub indie_success_rate: f64,
    pub aaa_vs_indie_ratio: f64,
    pub successful_critic_advantage: f64,
}

/// Everything the analysis stage produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub correlations: CorrelationMatrix,
    pub summary: SummaryStatistics,
    pub genres: Vec<GenrePerformance>,
    pub publishers: Vec<PublisherPerformance>,
    pub platforms: Vec<PlatformPerformance>,
    pub tests: StatisticalTests,
    pub insights: Insights,
}

/// Read-only reductions over a [`SalesTable`].
pub struct Analyzer;

impl Analyzer {
    /// Run every analysis. Fails when the table is empty or a test group is
    /// too small.
    pub fn run(table: &SalesTable) -> Result<AnalysisReport> {
        info!("Performing statistical analysis on {} games", table.len());

        let correlations = Self::correlations(table);
        let summary = Self::summary_statistics(table)?;
        let genres = Self::genre_performance(table);
        let publishers = Self::publisher_performance(table);
        let platforms = Self::platform_performance(table);
        let tests = Self::statistical_tests(table)?;
        let insights = Self::insights(table, &genres, &correlations, &tests);

        Ok(AnalysisReport {
            correlations,
            summary,
            genres,
            publishers,
            platforms,
            tests,
            insights,
        })
    }

    /// Pearson correlation over the sales and score columns, using
    /// pairwise-complete rows.
    pub fn correlations(table: &SalesTable) -> CorrelationMatrix {
        let columns: Vec<&str> = CORRELATION_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != COL_USER || table.has_user_score)
            .collect();

        let values: Vec<Vec<f64>> = columns
            .iter()
            .map(|a| {
                columns
                    .iter()
                    .map(|b| Self::pairwise_correlation(table, a, b))
                    .collect()
            })
            .collect();

        debug!("Correlation matrix computed over {:?}", columns);

        CorrelationMatrix {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    fn pairwise_correlation(table: &SalesTable, a: &str, b: &str) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = table
            .iter()
            .filter_map(|r| Some((r.numeric(a)?, r.numeric(b)?)))
            .unzip();
        StatsCalculator::pearson(&xs, &ys)
    }

    pub fn summary_statistics(table: &SalesTable) -> Result<SummaryStatistics> {
        if table.is_empty() {
            return Err(ReportError::InsufficientData {
                test: "summary statistics",
                group: "all games".into(),
                count: 0,
            });
        }

        let rows: Vec<&GameRecord> = table.iter().collect();
        let successful_games = rows.iter().filter(|r| r.is_successful).count();

        let top = |pairs: Vec<(String, f64)>| {
            rank_desc(pairs)
                .into_iter()
                .next()
                .map(|(label, _)| label)
                .unwrap_or_default()
        };

        let first_year = rows.iter().map(|r| r.year).min().unwrap_or_default();
        let last_year = rows.iter().map(|r| r.year).max().unwrap_or_default();

        Ok(SummaryStatistics {
            total_games: rows.len(),
            successful_games,
            success_rate: success_rate(&rows),
            avg_global_sales: mean_sales(&rows),
            median_global_sales: median_sales(&rows),
            total_global_sales: total_sales(&rows),
            top_genre_sales: top(aggregate_by(table.iter(), by_genre, mean_sales)),
            top_genre_count: top(aggregate_by(table.iter(), by_genre, count)),
            top_publisher_sales: top(aggregate_by(table.iter(), by_publisher, total_sales)),
            top_platform_sales: top(aggregate_by(table.iter(), by_platform, total_sales)),
            avg_critic_score: mean_critic(&rows),
            years_covered: format!("{first_year}-{last_year}"),
        })
    }

    /// Per-genre aggregates sorted by mean sales, highest first.
    pub fn genre_performance(table: &SalesTable) -> Vec<GenrePerformance> {
        let mut genres: Vec<GenrePerformance> = group_records(table.iter(), by_genre)
            .into_iter()
            .map(|(genre, rows)| GenrePerformance {
                genre,
                count: rows.len(),
                avg_sales: mean_sales(&rows),
                median_sales: median_sales(&rows),
                total_sales: total_sales(&rows),
                avg_critic: mean_critic(&rows),
                success_rate: success_rate(&rows),
            })
            .collect();

        genres.sort_by(|a, b| {
            b.avg_sales
                .total_cmp(&a.avg_sales)
                .then_with(|| a.genre.cmp(&b.genre))
        });
        genres
    }

    /// Aggregates for the top publishers by total sales, highest first.
    pub fn publisher_performance(table: &SalesTable) -> Vec<PublisherPerformance> {
        let top: BTreeSet<String> = top_by_total_sales(table.iter(), by_publisher, TOP_PUBLISHERS)
            .into_iter()
            .map(|(label, _)| label)
            .collect();

        let mut publishers: Vec<PublisherPerformance> =
            group_records(table.iter().filter(|r| top.contains(&r.publisher)), by_publisher)
                .into_iter()
                .map(|(publisher, rows)| PublisherPerformance {
                    count: rows.len(),
                    avg_sales: mean_sales(&rows),
                    total_sales: total_sales(&rows),
                    avg_critic: mean_critic(&rows),
                    success_rate: success_rate(&rows),
                    company_type: rows[0].company_type,
                    publisher,
                })
                .collect();

        publishers.sort_by(|a, b| {
            b.total_sales
                .total_cmp(&a.total_sales)
                .then_with(|| a.publisher.cmp(&b.publisher))
        });
        publishers
    }

    /// Aggregates for the top platforms by total sales, highest first.
    pub fn platform_performance(table: &SalesTable) -> Vec<PlatformPerformance> {
        let top: BTreeSet<String> = top_by_total_sales(table.iter(), by_platform, TOP_PLATFORMS)
            .into_iter()
            .map(|(label, _)| label)
            .collect();

        let mut platforms: Vec<PlatformPerformance> =
            group_records(table.iter().filter(|r| top.contains(&r.platform)), by_platform)
                .into_iter()
                .map(|(platform, rows)| {
                    let first_year = rows.iter().map(|r| r.year).min().unwrap_or_default();
                    let last_year = rows.iter().map(|r| r.year).max().unwrap_or_default();
                    PlatformPerformance {
                        platform,
                        count: rows.len(),
                        avg_sales: mean_sales(&rows),
                        total_sales: total_sales(&rows),
                        avg_critic: mean_critic(&rows),
                        success_rate: success_rate(&rows),
                        first_year,
                        last_year,
                        lifespan: last_year - first_year,
                    }
                })
                .collect();

        platforms.sort_by(|a, b| {
            b.total_sales
                .total_cmp(&a.total_sales)
                .then_with(|| a.platform.cmp(&b.platform))
        });
        platforms
    }

    /// Welch t-tests: AAA vs Indie/Other on global sales, and successful vs
    /// unsuccessful on critic score.
    pub fn statistical_tests(table: &SalesTable) -> Result<StatisticalTests> {
        let sales_of = |company: CompanyType| -> Vec<f64> {
            table
                .iter()
                .filter(|r| r.company_type == company)
                .map(|r| r.global_sales)
                .collect()
        };
        let aaa_sales = sales_of(CompanyType::Aaa);
        let indie_sales = sales_of(CompanyType::IndieOther);
        let aaa_vs_indie = Self::compare(
            AAA_VS_INDIE_TEST,
            (CompanyType::Aaa.as_str(), &aaa_sales[..]),
            (CompanyType::IndieOther.as_str(), &indie_sales[..]),
        )?;

        let critic_of = |successful: bool| -> Vec<f64> {
            table
                .iter()
                .filter(|r| r.is_successful == successful)
                .filter_map(|r| r.critic_score)
                .collect()
        };
        let successful_critic = critic_of(true);
        let unsuccessful_critic = critic_of(false);
        let critic_success = Self::compare(
            CRITIC_SUCCESS_TEST,
            ("Successful", &successful_critic[..]),
            ("Unsuccessful", &unsuccessful_critic[..]),
        )?;

        info!(
            "AAA vs Indie T-test: t={:.3}, p={:.3}",
            aaa_vs_indie.test.t_statistic, aaa_vs_indie.test.p_value
        );
        info!(
            "Successful vs Unsuccessful Critic Score T-test: t={:.3}, p={:.3}",
            critic_success.test.t_statistic, critic_success.test.p_value
        );

        Ok(StatisticalTests {
            aaa_vs_indie,
            critic_success,
        })
    }

    fn compare(
        test: &'static str,
        (label_a, sample_a): (&str, &[f64]),
        (label_b, sample_b): (&str, &[f64]),
    ) -> Result<GroupComparison> {
        for (label, sample) in [(label_a, sample_a), (label_b, sample_b)] {
            if sample.len() < 2 {
                return Err(ReportError::InsufficientData {
                    test,
                    group: label.to_string(),
                    count: sample.len(),
                });
            }
        }

        let result = StatsCalculator::welch_ttest(sample_a, sample_b).ok_or_else(|| {
            ReportError::InsufficientData {
                test,
                group: label_a.to_string(),
                count: sample_a.len(),
            }
        })?;

        Ok(GroupComparison {
            group_a: label_a.to_string(),
            group_b: label_b.to_string(),
            n_a: sample_a.len(),
            n_b: sample_b.len(),
            mean_a: StatsCalculator::mean(sample_a),
            mean_b: StatsCalculator::mean(sample_b),
            test: result,
        })
    }

    pub fn insights(
        table: &SalesTable,
        genres: &[GenrePerformance],
        correlations: &CorrelationMatrix,
        tests: &StatisticalTests,
    ) -> Insights {
        let best = genres.first();
        let worst = genres.last();

        let rate_of = |company: CompanyType| {
            let rows: Vec<&GameRecord> =
                table.iter().filter(|r| r.company_type == company).collect();
            success_rate(&rows)
        };

        Insights {
            best_genre: best.map(|g| g.genre.clone()).unwrap_or_default(),
            best_genre_avg_sales: best.map(|g| g.avg_sales).unwrap_or(f64::NAN),
            worst_genre: worst.map(|g| g.genre.clone()).unwrap_or_default(),
            critic_correlation: correlations.get(COL_CRITIC, COL_GLOBAL).unwrap_or(f64::NAN),
            aaa_success_rate: rate_of(CompanyType::Aaa),
            indie_success_rate: rate_of(CompanyType::IndieOther),
            aaa_vs_indie_ratio: tests.aaa_vs_indie.mean_a / tests.aaa_vs_indie.mean_b,
            successful_critic_advantage: tests.critic_success.mean_a
                - tests.critic_success.mean_b,
        }
    }
}
