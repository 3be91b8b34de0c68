//! CSV Data Loader Module
//! Reads the sales CSV with Polars and normalises column types.

use crate::config::{
    COL_CRITIC, COL_GENRE, COL_GLOBAL, COL_NAME, COL_PLATFORM, COL_PUBLISHER, COL_USER, COL_YEAR,
    NULL_TOKENS, REGION_COLUMNS, REQUIRED_COLUMNS,
};
use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, validate the required columns and cast them to the
    /// types the rest of the pipeline expects.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame> {
        let null_values =
            NullValues::AllColumns(NULL_TOKENS.iter().map(|token| (*token).into()).collect());
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_null_values(Some(null_values))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        debug!("Columns: {:?}", Self::get_columns(&df));

        Self::prepare(df)
    }

    /// Validate and normalise an already materialised frame.
    pub fn prepare(df: DataFrame) -> Result<DataFrame> {
        Self::validate_columns(&df)?;
        let df = Self::ensure_optional_columns(df)?;
        Self::normalize_types(df)
    }

    /// Fail with every missing required column listed.
    pub fn validate_columns(df: &DataFrame) -> Result<()> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| df.get_column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::MissingColumns(missing))
        }
    }

    /// `Critic_Score` feeds imputation and the critic tests, so an absent
    /// column is replaced by an all-null one.
    fn ensure_optional_columns(mut df: DataFrame) -> Result<DataFrame> {
        if df.get_column_index(COL_CRITIC).is_none() {
            warn!("Input has no {} column; scores will be empty", COL_CRITIC);
            let nulls = Series::full_null(COL_CRITIC.into(), df.height(), &DataType::Float64);
            df.with_column(nulls)?;
        }
        Ok(df)
    }

    fn normalize_types(df: DataFrame) -> Result<DataFrame> {
        let mut exprs: Vec<Expr> = Vec::new();

        let mut numeric: Vec<&str> = vec![COL_YEAR, COL_GLOBAL, COL_CRITIC];
        numeric.extend(REGION_COLUMNS);
        if df.get_column_index(COL_USER).is_some() {
            numeric.push(COL_USER);
        }
        for name in numeric {
            debug!("Casting {} to Float64", name);
            exprs.push(col(name).cast(DataType::Float64));
        }

        let mut categorical = vec![COL_PLATFORM, COL_GENRE, COL_PUBLISHER];
        if df.get_column_index(COL_NAME).is_some() {
            categorical.push(COL_NAME);
        }
        for name in categorical {
            exprs.push(col(name).cast(DataType::String));
        }

        let df = df.lazy().with_columns(exprs).collect()?;
        Ok(df)
    }

    /// Get list of column names from a DataFrame.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UNKNOWN_PUBLISHER;
    use crate::data::DataProcessor;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_csv_casts_columns() {
        let file = write_csv(
            "Name,Platform,Year_of_Release,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales,Critic_Score,User_Score\n\
             Wii Sports,Wii,2006,Sports,Nintendo,41.36,28.96,3.77,8.45,82.53,76,8\n\
             Obscure,PC,2011,Puzzle,Tiny,0.01,0.0,0.0,0.0,0.01,,tbd\n",
        );
        let df = DataLoader::load_csv(file.path()).expect("load");

        assert_eq!(df.height(), 2);
        assert_eq!(df.column(COL_YEAR).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(COL_USER).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(COL_USER).unwrap().null_count(), 1);
        assert_eq!(df.column(COL_CRITIC).unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_required_columns_are_reported() {
        let file = write_csv("Name,Platform,Global_Sales\nA,Wii,1.0\n");
        let err = DataLoader::load_csv(file.path()).unwrap_err();
        match err {
            ReportError::MissingColumns(cols) => {
                assert!(cols.contains(&"Genre".to_string()));
                assert!(cols.contains(&"Year_of_Release".to_string()));
                assert!(!cols.contains(&"Platform".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_absent_critic_column_is_added() {
        let file = write_csv(
            "Platform,Year_of_Release,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales\n\
             Wii,2006,Sports,Nintendo,1.0,1.0,0.3,0.2,2.5\n",
        );
        let df = DataLoader::load_csv(file.path()).expect("load");
        let critic = df.column(COL_CRITIC).expect("critic column");
        assert_eq!(critic.null_count(), 1);
        assert!(DataLoader::get_columns(&df).contains(&COL_CRITIC.to_string()));
    }

    #[test]
    fn test_missing_value_tokens_read_as_null() {
        let file = write_csv(
            "Name,Platform,Year_of_Release,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales,Critic_Score\n\
             A,Wii,2006,Sports,N/A,1.0,1.0,0.3,0.2,2.5,80\n\
             B,Wii,2007,NA,Nintendo,1.0,1.0,0.3,0.2,2.5,nan\n\
             C,PS2,2003,Action,Nintendo,1.0,1.0,0.3,0.2,2.5,70\n",
        );
        let df = DataLoader::load_csv(file.path()).expect("load");

        assert_eq!(df.column(COL_PUBLISHER).unwrap().null_count(), 1);
        assert_eq!(df.column(COL_GENRE).unwrap().null_count(), 1);
        assert_eq!(df.column(COL_CRITIC).unwrap().null_count(), 1);

        let cleaned = DataProcessor::clean(df).expect("clean");
        assert_eq!(cleaned.height(), 2);
        let publishers: Vec<Option<&str>> = cleaned
            .column(COL_PUBLISHER)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(publishers, vec![Some(UNKNOWN_PUBLISHER), Some("Nintendo")]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = DataLoader::load_csv(Path::new("/definitely/not/here.csv"));
        assert!(result.is_err());
    }
}
