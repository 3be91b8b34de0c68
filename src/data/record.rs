//! Typed, read-only view of the enriched table used by analysis and charting.

use crate::config::{
    COL_COMPANY_TYPE, COL_CRITIC, COL_EU, COL_GENRE, COL_GLOBAL, COL_IS_SUCCESSFUL, COL_JP,
    COL_NA, COL_NAME, COL_OTHER, COL_PLATFORM, COL_PUBLISHER, COL_RELEASE_ERA,
    COL_SALES_CATEGORY, COL_USER, COL_YEAR, UNKNOWN_PUBLISHER,
};
use crate::data::features::{CompanyType, ReleaseEra, SalesCategory};
use crate::error::Result;
use polars::prelude::*;
use tracing::warn;

/// One game release on one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub name: Option<String>,
    pub platform: String,
    pub year: i32,
    pub genre: String,
    pub publisher: String,
    pub na_sales: f64,
    pub eu_sales: f64,
    pub jp_sales: f64,
    pub other_sales: f64,
    pub global_sales: f64,
    pub critic_score: Option<f64>,
    pub user_score: Option<f64>,
    pub company_type: CompanyType,
    pub release_era: ReleaseEra,
    pub is_successful: bool,
    pub sales_category: Option<SalesCategory>,
}

impl GameRecord {
    /// Regional sales in `REGION_COLUMNS` order.
    pub fn regional_sales(&self) -> [f64; 4] {
        [self.na_sales, self.eu_sales, self.jp_sales, self.other_sales]
    }

    /// Value of a numeric column by its CSV name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            COL_GLOBAL => Some(self.global_sales),
            COL_NA => Some(self.na_sales),
            COL_EU => Some(self.eu_sales),
            COL_JP => Some(self.jp_sales),
            COL_OTHER => Some(self.other_sales),
            COL_CRITIC => self.critic_score,
            COL_USER => self.user_score,
            COL_YEAR => Some(self.year as f64),
            _ => None,
        }
    }
}

/// The enriched table as typed rows.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    pub records: Vec<GameRecord>,
    pub has_user_score: bool,
    /// Sales cells that were missing or unparseable and read as 0.
    pub zeroed_sales: usize,
}

impl SalesTable {
    pub fn new(records: Vec<GameRecord>, has_user_score: bool) -> Self {
        Self {
            records,
            has_user_score,
            zeroed_sales: 0,
        }
    }

    /// Project a cleaned and feature-derived frame into typed rows.
    ///
    /// Rows still lacking platform, genre, or year are skipped; after cleaning
    /// there are none.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let has_name = df.get_column_index(COL_NAME).is_some();
        let has_user_score = df.get_column_index(COL_USER).is_some();

        let names = if has_name {
            Some(df.column(COL_NAME)?.str()?)
        } else {
            None
        };
        let user = if has_user_score {
            Some(df.column(COL_USER)?.f64()?)
        } else {
            None
        };

        let platform = df.column(COL_PLATFORM)?.str()?;
        let genre = df.column(COL_GENRE)?.str()?;
        let publisher = df.column(COL_PUBLISHER)?.str()?;
        let year = df.column(COL_YEAR)?.f64()?;
        let na = df.column(COL_NA)?.f64()?;
        let eu = df.column(COL_EU)?.f64()?;
        let jp = df.column(COL_JP)?.f64()?;
        let other = df.column(COL_OTHER)?.f64()?;
        let global = df.column(COL_GLOBAL)?.f64()?;
        let critic = df.column(COL_CRITIC)?.f64()?;
        let company = df.column(COL_COMPANY_TYPE)?.str()?;
        let era = df.column(COL_RELEASE_ERA)?.str()?;
        let success = df.column(COL_IS_SUCCESSFUL)?.bool()?;
        let category = df.column(COL_SALES_CATEGORY)?.str()?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        let mut zeroed = 0usize;
        let mut sales = |column: &Float64Chunked, i: usize| {
            column.get(i).unwrap_or_else(|| {
                zeroed += 1;
                0.0
            })
        };

        for i in 0..df.height() {
            let (Some(platform_name), Some(genre_name), Some(release_year)) =
                (platform.get(i), genre.get(i), year.get(i))
            else {
                skipped += 1;
                continue;
            };

            records.push(GameRecord {
                name: names.and_then(|n| n.get(i)).map(str::to_string),
                platform: platform_name.to_string(),
                year: release_year.trunc() as i32,
                genre: genre_name.to_string(),
                publisher: publisher.get(i).unwrap_or(UNKNOWN_PUBLISHER).to_string(),
                na_sales: sales(na, i),
                eu_sales: sales(eu, i),
                jp_sales: sales(jp, i),
                other_sales: sales(other, i),
                global_sales: sales(global, i),
                critic_score: critic.get(i),
                user_score: user.and_then(|u| u.get(i)),
                company_type: company
                    .get(i)
                    .and_then(CompanyType::from_label)
                    .unwrap_or(CompanyType::IndieOther),
                release_era: era
                    .get(i)
                    .and_then(ReleaseEra::from_label)
                    .unwrap_or(ReleaseEra::Unknown),
                is_successful: success.get(i).unwrap_or(false),
                sales_category: category.get(i).and_then(SalesCategory::from_label),
            });
        }

        if skipped > 0 {
            warn!("Skipped {} rows without platform, genre, or year", skipped);
        }
        if zeroed > 0 {
            warn!("Read {} missing or unparseable sales values as 0", zeroed);
        }

        Ok(Self {
            zeroed_sales: zeroed,
            ..Self::new(records, has_user_score)
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::features::{is_successful, CompanyType, ReleaseEra, SalesCategory};

    /// Build a record with the derived fields computed from the raw ones.
    pub(crate) fn record(
        platform: &str,
        genre: &str,
        publisher: &str,
        year: i32,
        regions: [f64; 4],
        critic: Option<f64>,
    ) -> GameRecord {
        let global: f64 = regions.iter().sum();
        GameRecord {
            name: Some(format!("{publisher} {genre} {year}")),
            platform: platform.to_string(),
            year,
            genre: genre.to_string(),
            publisher: publisher.to_string(),
            na_sales: regions[0],
            eu_sales: regions[1],
            jp_sales: regions[2],
            other_sales: regions[3],
            global_sales: global,
            critic_score: critic,
            user_score: None,
            company_type: CompanyType::classify(publisher),
            release_era: ReleaseEra::from_year(Some(year as f64)),
            is_successful: is_successful(global),
            sales_category: SalesCategory::from_sales(global),
        }
    }

    #[test]
    fn test_from_dataframe_reads_derived_columns() {
        let df = df!(
            COL_NAME => [Some("Wii Sports"), None],
            COL_PLATFORM => ["Wii", "PC"],
            COL_GENRE => ["Sports", "Puzzle"],
            COL_PUBLISHER => ["Nintendo", "Tiny"],
            COL_YEAR => [2006.0, 2011.0],
            COL_NA => [41.36, 0.01],
            COL_EU => [28.96, 0.0],
            COL_JP => [3.77, 0.0],
            COL_OTHER => [8.45, 0.0],
            COL_GLOBAL => [82.53, 0.01],
            COL_CRITIC => [Some(76.0), None],
            COL_COMPANY_TYPE => ["AAA", "Indie/Other"],
            COL_RELEASE_ERA => ["2000s", "2010s"],
            COL_IS_SUCCESSFUL => [true, false],
            COL_SALES_CATEGORY => ["blockbuster", "flop"]
        )
        .expect("frame");

        let table = SalesTable::from_dataframe(&df).expect("table");
        assert_eq!(table.len(), 2);
        assert!(!table.has_user_score);
        assert_eq!(table.zeroed_sales, 0);

        let first = &table.records[0];
        assert_eq!(first.name.as_deref(), Some("Wii Sports"));
        assert_eq!(first.year, 2006);
        assert_eq!(first.company_type, CompanyType::Aaa);
        assert_eq!(first.release_era, ReleaseEra::Era2000s);
        assert_eq!(first.sales_category, Some(SalesCategory::Blockbuster));
        assert!(first.is_successful);

        let second = &table.records[1];
        assert_eq!(second.name, None);
        assert_eq!(second.critic_score, None);
        assert_eq!(second.numeric(COL_GLOBAL), Some(0.01));
    }

    #[test]
    fn test_missing_sales_are_counted() {
        let df = df!(
            COL_PLATFORM => ["Wii", "PC"],
            COL_GENRE => ["Sports", "Puzzle"],
            COL_PUBLISHER => ["Nintendo", "Tiny"],
            COL_YEAR => [2006.0, 2011.0],
            COL_NA => [Some(1.0), Some(0.5)],
            COL_EU => [Some(1.0), None],
            COL_JP => [0.3, 0.0],
            COL_OTHER => [0.2, 0.0],
            COL_GLOBAL => [None, Some(2.5)],
            COL_CRITIC => [Some(76.0), None],
            COL_COMPANY_TYPE => ["AAA", "Indie/Other"],
            COL_RELEASE_ERA => ["2000s", "2010s"],
            COL_IS_SUCCESSFUL => [false, true],
            COL_SALES_CATEGORY => [None::<&str>, Some("hit")]
        )
        .expect("frame");

        let table = SalesTable::from_dataframe(&df).expect("table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.zeroed_sales, 2);
        assert_eq!(table.records[0].global_sales, 0.0);
        assert_eq!(table.records[1].eu_sales, 0.0);
        assert_eq!(table.records[1].global_sales, 2.5);
    }

    #[test]
    fn test_numeric_lookup() {
        let r = record("Wii", "Sports", "Nintendo", 2006, [1.0, 1.0, 0.3, 0.2], Some(80.0));
        assert_eq!(r.numeric(COL_CRITIC), Some(80.0));
        assert_eq!(r.numeric(COL_USER), None);
        assert_eq!(r.numeric("Rating"), None);
        assert_eq!(r.regional_sales(), [1.0, 1.0, 0.3, 0.2]);
    }
}
