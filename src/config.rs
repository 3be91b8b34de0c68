//! Fixed report constants and output path layout.

use std::path::{Path, PathBuf};

pub const COL_NAME: &str = "Name";
pub const COL_PLATFORM: &str = "Platform";
pub const COL_YEAR: &str = "Year_of_Release";
pub const COL_GENRE: &str = "Genre";
pub const COL_PUBLISHER: &str = "Publisher";
pub const COL_NA: &str = "NA_Sales";
pub const COL_EU: &str = "EU_Sales";
pub const COL_JP: &str = "JP_Sales";
pub const COL_OTHER: &str = "Other_Sales";
pub const COL_GLOBAL: &str = "Global_Sales";
pub const COL_CRITIC: &str = "Critic_Score";
pub const COL_USER: &str = "User_Score";

pub const COL_COMPANY_TYPE: &str = "Company_Type";
pub const COL_RELEASE_ERA: &str = "Release_Era";
pub const COL_IS_SUCCESSFUL: &str = "Is_Successful";
pub const COL_SALES_CATEGORY: &str = "Sales_Category";

/// Columns the loader refuses to run without.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_PLATFORM,
    COL_YEAR,
    COL_GENRE,
    COL_PUBLISHER,
    COL_NA,
    COL_EU,
    COL_JP,
    COL_OTHER,
    COL_GLOBAL,
];

/// Regional sales columns, in display order.
pub const REGION_COLUMNS: [&str; 4] = [COL_NA, COL_EU, COL_JP, COL_OTHER];

pub const REGION_NAMES: [&str; 4] = ["North America", "Europe", "Japan", "Other Regions"];

/// Columns fed to the correlation matrix. `User_Score` is used only when present.
pub const CORRELATION_COLUMNS: [&str; 7] = [
    COL_GLOBAL, COL_NA, COL_EU, COL_JP, COL_OTHER, COL_CRITIC, COL_USER,
];

/// Publishers tagged as `AAA`.
pub const MAJOR_PUBLISHERS: [&str; 13] = [
    "Nintendo",
    "Electronic Arts",
    "Activision",
    "Sony Computer Entertainment",
    "Ubisoft",
    "Take-Two Interactive",
    "THQ",
    "Sega",
    "Microsoft Game Studios",
    "Capcom",
    "Square Enix",
    "Bandai Namco Games",
    "Konami Digital Entertainment",
];

pub const UNKNOWN_PUBLISHER: &str = "Unknown";

/// Cell values read as missing, in addition to empty cells. Same list pandas
/// uses by default.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Global sales (millions) above which a game counts as successful.
pub const SUCCESS_THRESHOLD: f64 = 1.0;

/// Right-inclusive bin edges for `Sales_Category`.
pub const SALES_BIN_EDGES: [f64; 6] = [0.0, 0.1, 1.0, 5.0, 10.0, 100.0];

pub const TOP_PUBLISHERS: usize = 20;
pub const TOP_PLATFORMS: usize = 15;

/// Pixel size of every multi-panel figure.
pub const FIGURE_SIZE: (u32, u32) = (2000, 1500);

pub const DEFAULT_INPUT: &str = "data/video_games_sales.csv";
pub const DEFAULT_OUTPUT: &str = "data/processed_sales.csv";
pub const DEFAULT_FIGURES_DIR: &str = "reports/figures";

/// Where every artifact of a run is written.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub input: PathBuf,
    pub processed_csv: PathBuf,
    pub figures_dir: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            processed_csv: PathBuf::from(DEFAULT_OUTPUT),
            figures_dir: PathBuf::from(DEFAULT_FIGURES_DIR),
        }
    }
}

impl ReportPaths {
    /// Path of a chart image, e.g. `reports/figures/genre_analysis/genre_analysis.png`.
    pub fn figure(&self, category: &str, file: &str) -> PathBuf {
        self.figures_dir.join(category).join(file)
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.figures_dir.join(category)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_path_layout() {
        let paths = ReportPaths {
            figures_dir: PathBuf::from("out/figs"),
            ..ReportPaths::default()
        };
        assert_eq!(
            paths.figure("genre_analysis", "genre_analysis.png"),
            PathBuf::from("out/figs/genre_analysis/genre_analysis.png")
        );
    }

    #[test]
    fn test_bin_edges_ascending() {
        assert!(SALES_BIN_EDGES.windows(2).all(|w| w[0] < w[1]));
    }
}
