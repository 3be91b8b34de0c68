//! Feature Derivation Module
//! Adds company type, release era, success flag, sales category and regional
//! share columns. Every derived value is a pure function of the raw columns.

use crate::config::{
    COL_COMPANY_TYPE, COL_GLOBAL, COL_IS_SUCCESSFUL, COL_PUBLISHER, COL_RELEASE_ERA,
    COL_SALES_CATEGORY, COL_YEAR, MAJOR_PUBLISHERS, REGION_COLUMNS, SALES_BIN_EDGES,
    SUCCESS_THRESHOLD,
};
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Publisher size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CompanyType {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "Indie/Other")]
    IndieOther,
}

impl CompanyType {
    pub const ALL: [CompanyType; 2] = [CompanyType::Aaa, CompanyType::IndieOther];

    /// Exact, case-sensitive match against the major-publisher allow-list.
    pub fn classify(publisher: &str) -> Self {
        if MAJOR_PUBLISHERS.contains(&publisher) {
            CompanyType::Aaa
        } else {
            CompanyType::IndieOther
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::Aaa => "AAA",
            CompanyType::IndieOther => "Indie/Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decade-aligned release era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReleaseEra {
    #[serde(rename = "1980s")]
    Era1980s,
    #[serde(rename = "1990s")]
    Era1990s,
    #[serde(rename = "2000s")]
    Era2000s,
    #[serde(rename = "2010s")]
    Era2010s,
    Unknown,
}

impl ReleaseEra {
    pub const ALL: [ReleaseEra; 5] = [
        ReleaseEra::Era1980s,
        ReleaseEra::Era1990s,
        ReleaseEra::Era2000s,
        ReleaseEra::Era2010s,
        ReleaseEra::Unknown,
    ];

    /// The year is truncated toward zero before bucketing.
    pub fn from_year(year: Option<f64>) -> Self {
        let Some(year) = year.filter(|y| y.is_finite()) else {
            return ReleaseEra::Unknown;
        };

        match year.trunc() as i64 {
            y if y < 1990 => ReleaseEra::Era1980s,
            y if y < 2000 => ReleaseEra::Era1990s,
            y if y < 2010 => ReleaseEra::Era2000s,
            _ => ReleaseEra::Era2010s,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseEra::Era1980s => "1980s",
            ReleaseEra::Era1990s => "1990s",
            ReleaseEra::Era2000s => "2000s",
            ReleaseEra::Era2010s => "2010s",
            ReleaseEra::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == label)
    }
}

impl fmt::Display for ReleaseEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered magnitude bucket of global sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesCategory {
    Flop,
    #[serde(rename = "below average")]
    BelowAverage,
    Average,
    Hit,
    Blockbuster,
}

impl SalesCategory {
    pub const ALL: [SalesCategory; 5] = [
        SalesCategory::Flop,
        SalesCategory::BelowAverage,
        SalesCategory::Average,
        SalesCategory::Hit,
        SalesCategory::Blockbuster,
    ];

    /// Right-inclusive bins over `SALES_BIN_EDGES`; values outside `(0, 100]`
    /// have no category.
    pub fn from_sales(global_sales: f64) -> Option<Self> {
        SALES_BIN_EDGES
            .windows(2)
            .position(|edge| global_sales > edge[0] && global_sales <= edge[1])
            .map(|idx| Self::ALL[idx])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SalesCategory::Flop => "flop",
            SalesCategory::BelowAverage => "below average",
            SalesCategory::Average => "average",
            SalesCategory::Hit => "hit",
            SalesCategory::Blockbuster => "blockbuster",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for SalesCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_successful(global_sales: f64) -> bool {
    global_sales > SUCCESS_THRESHOLD
}

/// Share of global sales in percent. A zero or missing denominator counts as 0%.
pub fn region_percentage(region_sales: Option<f64>, global_sales: Option<f64>) -> f64 {
    match (region_sales, global_sales) {
        (Some(region), Some(global)) if global != 0.0 => {
            let pct = region / global * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Name of the percentage column derived from a regional sales column.
pub fn pct_column(region: &str) -> String {
    format!("{region}_Pct")
}

/// Appends the derived columns to a cleaned frame.
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn derive(mut df: DataFrame) -> Result<DataFrame> {
        let publishers = df.column(COL_PUBLISHER)?.str()?.clone();
        let years = df.column(COL_YEAR)?.f64()?.clone();
        let global = df.column(COL_GLOBAL)?.f64()?.clone();

        let company_type: Vec<&'static str> = publishers
            .into_iter()
            .map(|p| CompanyType::classify(p.unwrap_or_default()).as_str())
            .collect();

        let release_era: Vec<&'static str> = years
            .into_iter()
            .map(|y| ReleaseEra::from_year(y).as_str())
            .collect();

        // A missing sales figure compares as not greater than the threshold.
        let successful: Vec<bool> = global
            .into_iter()
            .map(|g| g.is_some_and(is_successful))
            .collect();

        let sales_category: Vec<Option<&'static str>> = global
            .into_iter()
            .map(|g| g.and_then(SalesCategory::from_sales).map(|c| c.as_str()))
            .collect();

        df.with_column(Column::new(COL_COMPANY_TYPE.into(), company_type))?;
        df.with_column(Column::new(COL_RELEASE_ERA.into(), release_era))?;
        df.with_column(Column::new(COL_IS_SUCCESSFUL.into(), successful))?;
        df.with_column(Column::new(COL_SALES_CATEGORY.into(), sales_category))?;

        for region in REGION_COLUMNS {
            let sales = df.column(region)?.f64()?.clone();
            let pct: Vec<f64> = sales
                .into_iter()
                .zip(global.into_iter())
                .map(|(r, g)| region_percentage(r, g))
                .collect();
            df.with_column(Column::new(pct_column(region).into(), pct))?;
        }

        info!(
            "Derived features; final dataset shape: {} x {}",
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COL_EU, COL_JP, COL_NA, COL_OTHER};

    #[test]
    fn test_company_type_allow_list() {
        assert_eq!(CompanyType::classify("Nintendo"), CompanyType::Aaa);
        assert_eq!(CompanyType::classify("Some Tiny Studio"), CompanyType::IndieOther);
        assert_eq!(CompanyType::classify("nintendo"), CompanyType::IndieOther);
        assert_eq!(CompanyType::from_label("Indie/Other"), Some(CompanyType::IndieOther));
    }

    #[test]
    fn test_release_era_boundaries() {
        assert_eq!(ReleaseEra::from_year(Some(1985.0)), ReleaseEra::Era1980s);
        assert_eq!(ReleaseEra::from_year(Some(1989.9)), ReleaseEra::Era1980s);
        assert_eq!(ReleaseEra::from_year(Some(1990.0)), ReleaseEra::Era1990s);
        assert_eq!(ReleaseEra::from_year(Some(1999.0)), ReleaseEra::Era1990s);
        assert_eq!(ReleaseEra::from_year(Some(2000.0)), ReleaseEra::Era2000s);
        assert_eq!(ReleaseEra::from_year(Some(2009.0)), ReleaseEra::Era2000s);
        assert_eq!(ReleaseEra::from_year(Some(2010.0)), ReleaseEra::Era2010s);
        assert_eq!(ReleaseEra::from_year(Some(2020.0)), ReleaseEra::Era2010s);
        assert_eq!(ReleaseEra::from_year(None), ReleaseEra::Unknown);
        assert_eq!(ReleaseEra::from_year(Some(f64::NAN)), ReleaseEra::Unknown);
    }

    #[test]
    fn test_release_era_is_total_over_years() {
        for year in 1950..2050 {
            let era = ReleaseEra::from_year(Some(year as f64));
            assert_ne!(era, ReleaseEra::Unknown, "year {year}");
        }
    }

    #[test]
    fn test_sales_category_bins_are_right_inclusive() {
        assert_eq!(SalesCategory::from_sales(0.0), None);
        assert_eq!(SalesCategory::from_sales(0.05), Some(SalesCategory::Flop));
        assert_eq!(SalesCategory::from_sales(0.1), Some(SalesCategory::Flop));
        assert_eq!(SalesCategory::from_sales(0.11), Some(SalesCategory::BelowAverage));
        assert_eq!(SalesCategory::from_sales(1.0), Some(SalesCategory::BelowAverage));
        assert_eq!(SalesCategory::from_sales(2.5), Some(SalesCategory::Average));
        assert_eq!(SalesCategory::from_sales(10.0), Some(SalesCategory::Hit));
        assert_eq!(SalesCategory::from_sales(82.53), Some(SalesCategory::Blockbuster));
        assert_eq!(SalesCategory::from_sales(100.5), None);
    }

    #[test]
    fn test_success_threshold_is_strict() {
        assert!(!is_successful(1.0));
        assert!(is_successful(1.01));
    }

    #[test]
    fn test_region_percentage_zero_denominator() {
        assert_eq!(region_percentage(Some(0.5), Some(0.0)), 0.0);
        assert_eq!(region_percentage(None, Some(2.0)), 0.0);
        assert_eq!(region_percentage(Some(1.0), Some(2.5)), 40.0);
    }

    #[test]
    fn test_derive_example_row() {
        let df = df!(
            COL_PUBLISHER => ["Nintendo", "Some Tiny Studio"],
            COL_YEAR => [2006.0, 1995.0],
            COL_NA => [1.0, 0.0],
            COL_EU => [1.0, 0.0],
            COL_JP => [0.3, 0.0],
            COL_OTHER => [0.2, 0.0],
            COL_GLOBAL => [2.5, 0.0]
        )
        .expect("frame");

        let df = FeatureDeriver::derive(df).expect("derive");

        let company = df.column(COL_COMPANY_TYPE).unwrap().str().unwrap();
        assert_eq!(company.get(0), Some("AAA"));
        assert_eq!(company.get(1), Some("Indie/Other"));

        let era = df.column(COL_RELEASE_ERA).unwrap().str().unwrap();
        assert_eq!(era.get(0), Some("2000s"));
        assert_eq!(era.get(1), Some("1990s"));

        let success = df.column(COL_IS_SUCCESSFUL).unwrap().bool().unwrap();
        assert_eq!(success.get(0), Some(true));
        assert_eq!(success.get(1), Some(false));

        let category = df.column(COL_SALES_CATEGORY).unwrap().str().unwrap();
        assert_eq!(category.get(0), Some("average"));
        assert_eq!(category.get(1), None);

        let expected = [40.0, 40.0, 12.0, 8.0];
        for (region, want) in REGION_COLUMNS.iter().zip(expected) {
            let pct = df.column(&pct_column(region)).unwrap().f64().unwrap();
            assert!((pct.get(0).unwrap() - want).abs() < 1e-9, "{region}");
            assert_eq!(pct.get(1), Some(0.0));
        }
    }
}
