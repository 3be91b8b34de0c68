//! Charts module - static PNG figures per analysis category

mod plotter;
mod renderer;

pub use plotter::{BarSeries, BoxGroup, BoxSummary, ChartPlotter, LineSeries2D, Panel};
pub use renderer::{critic_bin_means, dominant_platform_per_era, StaticChartRenderer};
