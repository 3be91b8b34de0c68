//! Chart Plotter Module
//! Panel-level drawing primitives on top of plotters. Each function fills one
//! sub-area of a figure; composition into figures lives in `renderer`.

use crate::error::Result;
use crate::stats::StatsCalculator;
use plotters::coord::Shift;
use plotters::prelude::*;

pub const FONT: &str = "sans-serif";

pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
pub const SALMON: RGBColor = RGBColor(250, 128, 114);
pub const GOLD: RGBColor = RGBColor(255, 215, 0);
pub const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
pub const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
pub const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
pub const LIGHT_STEEL_BLUE: RGBColor = RGBColor(176, 196, 222);
pub const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const TREND_RED: RGBColor = RGBColor(214, 39, 40);
const MISSING_GRAY: RGBColor = RGBColor(200, 200, 200);

// Anchors of the diverging and sequential colour maps
const COOLWARM: [(f64, (u8, u8, u8)); 3] = [
    (-1.0, (59, 76, 192)),
    (0.0, (221, 221, 221)),
    (1.0, (180, 4, 38)),
];
const VIRIDIS: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (68, 1, 84)),
    (0.25, (59, 82, 139)),
    (0.5, (33, 145, 140)),
    (0.75, (94, 201, 98)),
    (1.0, (253, 231, 37)),
];

/// One sub-area of a figure.
pub type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Labelled bars, drawn in slice order (bottom-up or left-to-right).
pub struct BarSeries<'a> {
    pub title: &'a str,
    pub axis_desc: &'a str,
    pub bars: &'a [(String, f64)],
    pub colors: &'a [RGBColor],
    pub annotate: Option<&'a dyn Fn(usize, f64) -> Option<String>>,
}

impl BarSeries<'_> {
    fn color_at(&self, index: usize) -> RGBColor {
        if self.colors.is_empty() {
            SKY_BLUE
        } else {
            self.colors[index % self.colors.len()]
        }
    }

    fn labels(&self) -> Vec<String> {
        self.bars.iter().map(|(label, _)| label.clone()).collect()
    }
}

/// A numeric-x line chart with point markers.
pub struct LineSeries2D<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
}

/// One box of a box plot.
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
    pub color: RGBColor,
}

/// Box, whiskers and outliers of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub low: f64,
    pub high: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Whiskers reach the most extreme values within 1.5 IQR of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let stats = StatsCalculator::compute_descriptive_stats(values);
        let iqr = stats.q3 - stats.q1;
        let (lower_fence, upper_fence) = (stats.q1 - 1.5 * iqr, stats.q3 + 1.5 * iqr);

        let inside = values
            .iter()
            .copied()
            .filter(|v| *v >= lower_fence && *v <= upper_fence);
        let low = inside.clone().fold(f64::INFINITY, f64::min).min(stats.q1);
        let high = inside.fold(f64::NEG_INFINITY, f64::max).max(stats.q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low || *v > high)
            .collect();

        Some(Self {
            q1: stats.q1,
            median: stats.median,
            q3: stats.q3,
            low,
            high,
            outliers,
        })
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            q1: f(self.q1),
            median: f(self.median),
            q3: f(self.q3),
            low: f(self.low),
            high: f(self.high),
            outliers: self.outliers.iter().map(|v| f(*v)).collect(),
        }
    }
}

/// Equal-width histogram over the data range: `(lower, upper, count)` per bin.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        hi = lo + 1.0;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (lo + i as f64 * width, lo + (i + 1) as f64 * width, c))
        .collect()
}

/// Right-closed equal-width intervals over `[min, max]`, the first one
/// stretched by 0.1% of the range so the minimum falls inside it.
pub fn equal_width_intervals(min: f64, max: f64, bins: usize) -> Vec<(f64, f64)> {
    if bins == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (min, max) = if max > min {
        (min, max)
    } else {
        (min - 0.001 * min.abs().max(1.0), max + 0.001 * max.abs().max(1.0))
    };
    let width = (max - min) / bins as f64;
    (0..bins)
        .map(|i| {
            let lower = if i == 0 {
                min - (max - min) * 0.001
            } else {
                min + i as f64 * width
            };
            let upper = if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            (lower, upper)
        })
        .collect()
}

/// Index of the right-closed interval containing `value`.
pub fn interval_index(intervals: &[(f64, f64)], value: f64) -> Option<usize> {
    intervals
        .iter()
        .position(|(lower, upper)| value > *lower && value <= *upper)
}

/// Upper axis bound leaving `headroom` (a factor) above the largest value.
pub fn value_axis_max(values: impl IntoIterator<Item = f64>, headroom: f64) -> f64 {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if max > 0.0 {
        max * headroom
    } else {
        1.0
    }
}

fn interpolate(anchors: &[(f64, (u8, u8, u8))], t: f64) -> RGBColor {
    let (first, last) = (anchors[0], anchors[anchors.len() - 1]);
    let t = t.clamp(first.0, last.0);
    for pair in anchors.windows(2) {
        let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2));
        }
    }
    RGBColor(last.1 .0, last.1 .1, last.1 .2)
}

/// Diverging map for correlations in `[-1, 1]`; NaN is gray.
pub fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return MISSING_GRAY;
    }
    interpolate(&COOLWARM, value)
}

/// Sequential map for `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    if t.is_nan() {
        return MISSING_GRAY;
    }
    interpolate(&VIRIDIS, t)
}

/// Label for a segmented axis tick; only segment centres carry text.
pub fn segment_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn caption_font() -> FontDesc<'static> {
    (FONT, 26).into_font().style(FontStyle::Bold)
}

fn label_area_width(labels: &[String]) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    (longest * 9 + 16).clamp(60, 280)
}

fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

fn padded(lo: f64, hi: f64, fraction: f64) -> (f64, f64) {
    if hi > lo {
        let pad = (hi - lo) * fraction;
        (lo - pad, hi + pad)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

/// Panel-level chart primitives.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Title-only panel for an empty series.
    pub fn empty_panel(area: &Panel, title: &str) -> Result<()> {
        area.draw(&Text::new(
            format!("{title} (no data)"),
            (30, 30),
            caption_font(),
        ))?;
        Ok(())
    }

    /// Horizontal bars with category labels on the y axis.
    pub fn horizontal_bars(area: &Panel, series: &BarSeries) -> Result<()> {
        if series.bars.is_empty() {
            return Self::empty_panel(area, series.title);
        }
        let n = series.bars.len() as i32;
        let labels = series.labels();
        let x_max = value_axis_max(series.bars.iter().map(|(_, v)| *v), 1.18);

        let mut chart = ChartBuilder::on(area)
            .caption(series.title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(label_area_width(&labels))
            .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

        let fmt = |v: &SegmentValue<i32>| segment_label(v, &labels);
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(labels.len())
            .y_label_formatter(&fmt)
            .x_desc(series.axis_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 15))
            .draw()?;

        chart.draw_series(series.bars.iter().enumerate().map(|(i, (_, value))| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (value.max(0.0), SegmentValue::Exact(i + 1)),
                ],
                series.color_at(i as usize).mix(0.85).filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))?;

        if let Some(annotate) = series.annotate {
            chart.draw_series(series.bars.iter().enumerate().filter_map(|(i, (_, value))| {
                let text = annotate(i, *value)?;
                Some(
                    EmptyElement::at((value.max(0.0), SegmentValue::CenterOf(i as i32)))
                        + Text::new(text, (6, -8), (FONT, 15).into_font().style(FontStyle::Bold)),
                )
            }))?;
        }
        Ok(())
    }

    /// Vertical bars with category labels on the x axis.
    pub fn vertical_bars(area: &Panel, series: &BarSeries) -> Result<()> {
        if series.bars.is_empty() {
            return Self::empty_panel(area, series.title);
        }
        let n = series.bars.len() as i32;
        let labels = series.labels();
        let y_max = value_axis_max(series.bars.iter().map(|(_, v)| *v), 1.15);

        let mut chart = ChartBuilder::on(area)
            .caption(series.title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

        let fmt = |v: &SegmentValue<i32>| segment_label(v, &labels);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&fmt)
            .y_desc(series.axis_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 13))
            .draw()?;

        chart.draw_series(series.bars.iter().enumerate().map(|(i, (_, value))| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), value.max(0.0)),
                ],
                series.color_at(i as usize).mix(0.85).filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))?;

        if let Some(annotate) = series.annotate {
            chart.draw_series(series.bars.iter().enumerate().filter_map(|(i, (_, value))| {
                let text = annotate(i, *value)?;
                Some(
                    EmptyElement::at((SegmentValue::CenterOf(i as i32), value.max(0.0)))
                        + Text::new(text, (-20, -22), (FONT, 15).into_font().style(FontStyle::Bold)),
                )
            }))?;
        }
        Ok(())
    }

    /// Line with point markers over a numeric x axis.
    pub fn line_chart(area: &Panel, series: &LineSeries2D) -> Result<()> {
        let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (
            finite_range(series.points.iter().map(|p| p.0)),
            finite_range(series.points.iter().map(|p| p.1)),
        ) else {
            return Self::empty_panel(area, series.title);
        };
        let (x_lo, x_hi) = padded(x_lo, x_hi, 0.03);
        let (y_lo, y_hi) = padded(y_lo.min(0.0), y_hi, 0.08);
        let y_lo = y_lo.max(0.0);

        let mut chart = ChartBuilder::on(area)
            .caption(series.title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|x| format!("{x:.0}"))
            .x_desc(series.x_desc)
            .y_desc(series.y_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 14))
            .draw()?;

        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            series.color.stroke_width(2),
        ))?;
        chart.draw_series(
            points
                .iter()
                .map(|p| Circle::new(*p, 4, series.color.filled())),
        )?;
        Ok(())
    }

    /// Line with point markers over labelled categories. NaN points are
    /// left out of the line.
    pub fn category_line_chart(
        area: &Panel,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        points: &[(String, f64)],
        color: RGBColor,
    ) -> Result<()> {
        let Some((_, y_hi)) = finite_range(points.iter().map(|p| p.1)) else {
            return Self::empty_panel(area, title);
        };
        let n = points.len() as i32;
        let labels: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();

        let mut chart = ChartBuilder::on(area)
            .caption(title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..value_axis_max([y_hi], 1.1))?;

        let fmt = |v: &SegmentValue<i32>| segment_label(v, &labels);
        chart
            .configure_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&fmt)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 12))
            .draw()?;

        let present: Vec<(SegmentValue<i32>, f64)> = points
            .iter()
            .enumerate()
            .filter(|(_, (_, v))| v.is_finite())
            .map(|(i, (_, v))| (SegmentValue::CenterOf(i as i32), *v))
            .collect();
        chart.draw_series(LineSeries::new(present.iter().cloned(), color.stroke_width(2)))?;
        chart.draw_series(
            present
                .iter()
                .map(|p| Circle::new(p.clone(), 5, color.filled())),
        )?;
        Ok(())
    }

    /// Scatter coloured by y with a least-squares trend line.
    pub fn scatter_with_trend(
        area: &Panel,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        points: &[(f64, f64)],
    ) -> Result<()> {
        let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (
            finite_range(points.iter().map(|p| p.0)),
            finite_range(points.iter().map(|p| p.1)),
        ) else {
            return Self::empty_panel(area, title);
        };

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let trend = StatsCalculator::linear_fit(&xs, &ys)
            .map(|(slope, intercept)| {
                [(x_lo, slope * x_lo + intercept), (x_hi, slope * x_hi + intercept)]
            });

        let trend_ys = trend.iter().flat_map(|t| [t[0].1, t[1].1]);
        let (view_lo, view_hi) = finite_range([y_lo.min(0.0), y_hi].into_iter().chain(trend_ys))
            .unwrap_or((0.0, 1.0));
        let (x_lo_view, x_hi_view) = padded(x_lo, x_hi, 0.03);
        let (view_lo, view_hi) = padded(view_lo, view_hi, 0.05);

        let mut chart = ChartBuilder::on(area)
            .caption(title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo_view..x_hi_view, view_lo..view_hi)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 14))
            .draw()?;

        let span = if y_hi > y_lo { y_hi - y_lo } else { 1.0 };
        chart.draw_series(points.iter().map(|&(x, y)| {
            Circle::new((x, y), 3, viridis((y - y_lo) / span).mix(0.6).filled())
        }))?;

        if let Some(line) = trend {
            chart
                .draw_series(LineSeries::new(line, TREND_RED.stroke_width(3)))?
                .label("Trend")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TREND_RED));
            chart
                .configure_series_labels()
                .label_font((FONT, 15))
                .border_style(BLACK)
                .background_style(WHITE.mix(0.8))
                .draw()?;
        }
        Ok(())
    }

    /// Box plot per group. With `log_scale` values are clamped at `floor`
    /// and drawn in decades.
    pub fn box_plot(
        area: &Panel,
        title: &str,
        y_desc: &str,
        groups: &[BoxGroup],
        log_scale: Option<f64>,
    ) -> Result<()> {
        let transform = |v: f64| match log_scale {
            Some(floor) => v.max(floor).log10(),
            None => v,
        };
        let summaries: Vec<(usize, BoxSummary)> = groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| BoxSummary::from_values(&g.values).map(|s| (i, s.map(transform))))
            .collect();

        let extremes = summaries.iter().flat_map(|(_, s)| {
            s.outliers.iter().copied().chain([s.low, s.high])
        });
        let Some((y_lo, y_hi)) = finite_range(extremes) else {
            return Self::empty_panel(area, title);
        };
        let (y_lo, y_hi) = padded(y_lo, y_hi, 0.05);
        let n = groups.len() as i32;
        let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();

        let mut chart = ChartBuilder::on(area)
            .caption(title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), y_lo..y_hi)?;

        let x_fmt = |v: &SegmentValue<i32>| segment_label(v, &labels);
        let y_fmt = |v: &f64| match log_scale {
            Some(_) => format!("{}", 10f64.powf(*v)),
            None => format!("{v:.2}"),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .y_desc(y_desc)
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 15))
            .draw()?;

        let box_margin = area.dim_in_pixel().0 / (4 * n.max(1) as u32);
        for (i, summary) in &summaries {
            let color = groups[*i].color;
            let x = *i as i32;
            let left = SegmentValue::Exact(x);
            let right = SegmentValue::Exact(x + 1);
            let centre = SegmentValue::CenterOf(x);

            let mut body = Rectangle::new(
                [(left.clone(), summary.q1), (right.clone(), summary.q3)],
                color.mix(0.7).filled(),
            );
            body.set_margin(0, 0, box_margin, box_margin);
            let mut outline = Rectangle::new(
                [(left.clone(), summary.q1), (right.clone(), summary.q3)],
                BLACK.stroke_width(1),
            );
            outline.set_margin(0, 0, box_margin, box_margin);
            let mut median = Rectangle::new(
                [(left.clone(), summary.median), (right.clone(), summary.median)],
                BLACK.stroke_width(3),
            );
            median.set_margin(0, 0, box_margin, box_margin);
            chart.draw_series([body, outline, median])?;

            chart.draw_series([
                PathElement::new(
                    vec![(centre.clone(), summary.low), (centre.clone(), summary.q1)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(centre.clone(), summary.q3), (centre.clone(), summary.high)],
                    BLACK.stroke_width(1),
                ),
            ])?;

            let caps = [summary.low, summary.high].map(|y| {
                let mut cap =
                    Rectangle::new([(left.clone(), y), (right.clone(), y)], BLACK.stroke_width(1));
                cap.set_margin(0, 0, box_margin * 3 / 2, box_margin * 3 / 2);
                cap
            });
            chart.draw_series(caps)?;

            chart.draw_series(
                summary
                    .outliers
                    .iter()
                    .map(|y| Circle::new((centre.clone(), *y), 3, BLACK.mix(0.4))),
            )?;
        }
        Ok(())
    }

    /// Annotated correlation heatmap; the first row is drawn at the top.
    pub fn heatmap(area: &Panel, title: &str, labels: &[String], values: &[Vec<f64>]) -> Result<()> {
        if labels.is_empty() {
            return Self::empty_panel(area, title);
        }
        let n = labels.len() as i32;
        let rows_top_down: Vec<String> = labels.iter().rev().cloned().collect();

        let mut chart = ChartBuilder::on(area)
            .caption(title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(label_area_width(labels))
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        let x_fmt = |v: &SegmentValue<i32>| segment_label(v, labels);
        let y_fmt = |v: &SegmentValue<i32>| segment_label(v, &rows_top_down);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(labels.len())
            .y_labels(labels.len())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style((FONT, 13))
            .draw()?;

        let cells: Vec<(i32, i32, f64)> = values
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .map(move |(col, v)| (col as i32, n - 1 - row as i32, *v))
            })
            .collect();

        chart.draw_series(cells.iter().map(|&(x, y, v)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                coolwarm(v).filled(),
            )
        }))?;

        chart.draw_series(cells.iter().map(|&(x, y, v)| {
            let text_color = if v.abs() > 0.5 { WHITE } else { BLACK };
            EmptyElement::at((SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)))
                + Text::new(
                    format!("{v:.2}"),
                    (-16, -8),
                    (FONT, 15).into_font().color(&text_color),
                )
        }))?;
        Ok(())
    }

    /// Histogram with a dashed-style mean marker, cropped to `[0, x_max]`.
    pub fn histogram(
        area: &Panel,
        title: &str,
        x_desc: &str,
        values: &[f64],
        bins: usize,
        x_max: f64,
        color: RGBColor,
    ) -> Result<()> {
        let bins = histogram_bins(values, bins);
        let visible: Vec<(f64, f64, usize)> = bins
            .into_iter()
            .filter(|(lower, _, _)| *lower < x_max)
            .map(|(lower, upper, count)| (lower.max(0.0), upper.min(x_max), count))
            .collect();
        if visible.is_empty() {
            return Self::empty_panel(area, title);
        }
        let y_max = value_axis_max(visible.iter().map(|b| b.2 as f64), 1.1);

        let mut chart = ChartBuilder::on(area)
            .caption(title, caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc("Frequency")
            .y_label_formatter(&|v| format!("{v:.0}"))
            .axis_desc_style((FONT, 18))
            .label_style((FONT, 14))
            .draw()?;

        chart.draw_series(visible.iter().map(|&(lower, upper, count)| {
            Rectangle::new([(lower, 0.0), (upper, count as f64)], color.mix(0.7).filled())
        }))?;
        chart.draw_series(visible.iter().map(|&(lower, upper, count)| {
            Rectangle::new([(lower, 0.0), (upper, count as f64)], BLACK.stroke_width(1))
        }))?;

        let mean = StatsCalculator::mean(values);
        if mean.is_finite() && mean <= x_max {
            chart
                .draw_series(LineSeries::new(
                    [(mean, 0.0), (mean, y_max)],
                    TREND_RED.stroke_width(2),
                ))?
                .label(format!("Mean: {mean:.2}M"))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TREND_RED));
            chart
                .configure_series_labels()
                .label_font((FONT, 15))
                .border_style(BLACK)
                .background_style(WHITE.mix(0.8))
                .draw()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_bins_cover_range() {
        let bins = histogram_bins(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].0, 0.0);
        assert_eq!(bins[3].1, 4.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.2).collect();
        // the maximum lands in the last bin
        assert_eq!(counts, [1, 1, 1, 2]);
        assert!(histogram_bins(&[], 10).is_empty());
        assert!(histogram_bins(&[f64::NAN], 10).is_empty());
    }

    #[test]
    fn test_histogram_bins_constant_values() {
        let bins = histogram_bins(&[2.0, 2.0], 5);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 2);
        assert_eq!(bins[0].2, 2);
    }

    #[test]
    fn test_equal_width_intervals_include_minimum() {
        let intervals = equal_width_intervals(10.0, 90.0, 4);
        assert_eq!(intervals.len(), 4);
        assert_eq!(interval_index(&intervals, 10.0), Some(0));
        assert_eq!(interval_index(&intervals, 30.0), Some(0));
        assert_eq!(interval_index(&intervals, 30.5), Some(1));
        assert_eq!(interval_index(&intervals, 90.0), Some(3));
        assert_eq!(interval_index(&intervals, 95.0), None);
    }

    #[test]
    fn test_value_axis_max() {
        assert!((value_axis_max([1.0, 2.0, f64::NAN], 1.5) - 3.0).abs() < 1e-12);
        assert_eq!(value_axis_max([], 1.5), 1.0);
        assert_eq!(value_axis_max([0.0], 1.5), 1.0);
    }

    #[test]
    fn test_colour_maps() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(2.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(f64::NAN), MISSING_GRAY);
        assert_eq!(viridis(0.0), RGBColor(68, 1, 84));
        assert_eq!(viridis(1.0), RGBColor(253, 231, 37));
    }

    #[test]
    fn test_segment_label() {
        let labels = vec!["Action".to_string(), "Puzzle".to_string()];
        assert_eq!(segment_label(&SegmentValue::CenterOf(1), &labels), "Puzzle");
        assert_eq!(segment_label(&SegmentValue::CenterOf(5), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Exact(0), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Last, &labels), "");
    }

    #[test]
    fn test_box_summary_whiskers_and_outliers() {
        let summary = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.low, 1.0);
        assert_eq!(summary.high, 4.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!(BoxSummary::from_values(&[]).is_none());
    }
}
