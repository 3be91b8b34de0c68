//! Report Printer
//! Renders an `AnalysisReport` as a plain-text summary or as JSON.

use crate::config::{COL_CRITIC, COL_GLOBAL};
use crate::error::Result;
use crate::stats::analyzer::GroupComparison;
use crate::stats::AnalysisReport;
use std::io::Write;

const RULE_WIDTH: usize = 60;

pub struct ReportPrinter;

impl ReportPrinter {
    /// Write the report to `out`, as pretty JSON when `json` is set.
    pub fn write<W: Write>(report: &AnalysisReport, json: bool, out: &mut W) -> Result<()> {
        if json {
            Self::write_json(report, out)
        } else {
            Self::write_text(report, out)
        }
    }

    pub fn write_json<W: Write>(report: &AnalysisReport, out: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn write_text<W: Write>(report: &AnalysisReport, out: &mut W) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(out, "{rule}")?;
        writeln!(out, "KEY INSIGHTS SUMMARY")?;
        writeln!(out, "{rule}")?;
        for (key, value) in report.summary.entries() {
            writeln!(out, "{key}: {value}")?;
        }
        let critic_corr = report
            .correlations
            .get(COL_CRITIC, COL_GLOBAL)
            .unwrap_or(f64::NAN);
        writeln!(
            out,
            "\nCritic Score vs Global Sales correlation: {critic_corr:.3}"
        )?;

        writeln!(out, "\nGenre Performance:")?;
        writeln!(
            out,
            "  {:<14} {:>6} {:>9} {:>9} {:>10} {:>8} {:>8}",
            "genre", "count", "avg", "median", "total", "critic", "success%"
        )?;
        for g in &report.genres {
            writeln!(
                out,
                "  {:<14} {:>6} {:>9.3} {:>9.3} {:>10.2} {:>8.1} {:>8.1}",
                g.genre, g.count, g.avg_sales, g.median_sales, g.total_sales, g.avg_critic,
                g.success_rate
            )?;
        }

        writeln!(out, "\nTop Publishers:")?;
        for p in &report.publishers {
            writeln!(
                out,
                "  {:<36} {:>6} {:>10.2} {:>8.3} {:>8.1}% {}",
                p.publisher, p.count, p.total_sales, p.avg_sales, p.success_rate, p.company_type
            )?;
        }

        writeln!(out, "\nTop Platforms:")?;
        for p in &report.platforms {
            writeln!(
                out,
                "  {:<6} {:>6} {:>10.2} {:>8.3} {:>8.1}% {}-{} ({} years)",
                p.platform,
                p.count,
                p.total_sales,
                p.avg_sales,
                p.success_rate,
                p.first_year,
                p.last_year,
                p.lifespan
            )?;
        }

        writeln!(out, "\nStatistical Tests:")?;
        Self::write_comparison(&report.tests.aaa_vs_indie, out)?;
        Self::write_comparison(&report.tests.critic_success, out)?;

        let insights = &report.insights;
        let summary = &report.summary;
        writeln!(out, "\n{rule}")?;
        writeln!(out, "BUSINESS INSIGHTS")?;
        writeln!(out, "{rule}")?;
        writeln!(
            out,
            "- Analyzed {} games from {}",
            summary.total_games, summary.years_covered
        )?;
        writeln!(
            out,
            "- Overall success rate: {:.1}% of games sell >1M units",
            summary.success_rate
        )?;
        writeln!(
            out,
            "- Highest performing genre: {} (${:.2}M average sales)",
            insights.best_genre, insights.best_genre_avg_sales
        )?;
        writeln!(out, "- Most popular genre: {}", summary.top_genre_count)?;
        writeln!(out, "- Lowest average sales: {}", insights.worst_genre)?;
        writeln!(out, "- Market leader: {}", summary.top_publisher_sales)?;
        writeln!(
            out,
            "- AAA success rate: {:.1}% vs Indie: {:.1}%",
            insights.aaa_success_rate, insights.indie_success_rate
        )?;
        writeln!(
            out,
            "- AAA games sell {:.1}x more on average",
            insights.aaa_vs_indie_ratio
        )?;
        writeln!(out, "- Most successful platform: {}", summary.top_platform_sales)?;
        writeln!(
            out,
            "- Critic score correlation with sales: {:.3}",
            insights.critic_correlation
        )?;
        writeln!(
            out,
            "- Successful games score {:.1} points higher with critics on average",
            insights.successful_critic_advantage
        )?;
        writeln!(out, "{rule}")?;
        Ok(())
    }

    fn write_comparison<W: Write>(cmp: &GroupComparison, out: &mut W) -> Result<()> {
        let verdict = if cmp.test.is_significant {
            "significant"
        } else {
            "not significant"
        };
        writeln!(
            out,
            "  {} vs {}: t={:.3}, p={:.3}, df={:.1} ({verdict})",
            cmp.group_a,
            cmp.group_b,
            cmp.test.t_statistic,
            cmp.test.p_value,
            cmp.test.degrees_of_freedom
        )?;
        writeln!(
            out,
            "    {} mean {:.2} (n={}), {} mean {:.2} (n={})",
            cmp.group_a, cmp.mean_a, cmp.n_a, cmp.group_b, cmp.mean_b, cmp.n_b
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::record;
    use crate::data::SalesTable;
    use crate::stats::Analyzer;

    fn report() -> AnalysisReport {
        let table = SalesTable::new(
            vec![
                record("Wii", "Sports", "Nintendo", 2006, [41.4, 29.0, 3.8, 8.5], Some(76.0)),
                record("DS", "Puzzle", "Nintendo", 2007, [0.5, 0.3, 0.1, 0.1], Some(70.0)),
                record("PC", "Puzzle", "Tiny", 2011, [0.05, 0.02, 0.0, 0.0], Some(55.0)),
                record("PC", "Action", "Small Co", 2013, [1.2, 0.5, 0.0, 0.1], Some(81.0)),
                record("PS4", "Action", "Small Co", 2015, [0.2, 0.1, 0.0, 0.0], Some(60.0)),
            ],
            false,
        );
        Analyzer::run(&table).expect("report")
    }

    #[test]
    fn test_text_report_sections() {
        let mut out = Vec::new();
        ReportPrinter::write(&report(), false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(text.contains("KEY INSIGHTS SUMMARY"));
        assert!(text.contains("total_games: 5"));
        assert!(text.contains("years_covered: 2006-2015"));
        assert!(text.contains("Critic Score vs Global Sales correlation:"));
        assert!(text.contains("Statistical Tests:"));
        assert!(text.contains("Market leader: Nintendo"));
    }

    #[test]
    fn test_json_report_parses() {
        let mut out = Vec::new();
        ReportPrinter::write(&report(), true, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["summary"]["total_games"], 5);
        assert!(value["genres"].as_array().unwrap().len() >= 3);
        assert!(value["tests"]["aaa_vs_indie"]["test"]["p_value"].is_number());
    }
}
