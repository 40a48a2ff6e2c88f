use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::column_normalizer::{ColumnNormalizer, NormalizeError};
use super::frames;
use super::lookup::{self, LookupError};
use crate::models::Restaurant;
use crate::storage::csv_store::{self, StorageError};

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("DataFrame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Column order used when the table is shown to users.
pub const DISPLAY_COLUMNS: [&str; 21] = [
    "restaurant_id",
    "restaurant_name",
    "country",
    "city",
    "address",
    "locality",
    "locality_verbose",
    "longitude",
    "latitude",
    "cuisines",
    "price_type",
    "average_cost_for_two",
    "currency",
    "has_table_booking",
    "has_online_delivery",
    "is_delivering_now",
    "aggregate_rating",
    "rating_color",
    "color_name",
    "rating_text",
    "votes",
];

pub const CUISINE_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy)]
enum ColumnType {
    Integer,
    Float,
    Flag,
}

/// Columns stored typed in the cleaned table; the rest stay text.
const TYPED_COLUMNS: [(&str, ColumnType); 11] = [
    ("restaurant_id", ColumnType::Integer),
    ("country_code", ColumnType::Integer),
    ("longitude", ColumnType::Float),
    ("latitude", ColumnType::Float),
    ("average_cost_for_two", ColumnType::Float),
    ("has_table_booking", ColumnType::Flag),
    ("has_online_delivery", ColumnType::Flag),
    ("is_delivering_now", ColumnType::Flag),
    ("price_range", ColumnType::Integer),
    ("aggregate_rating", ColumnType::Float),
    ("votes", ColumnType::Integer),
];

#[derive(Debug, Clone)]
pub struct CleanerSettings {
    pub processed_path: PathBuf,
    pub constant_column: String,
}

/// The deduplicated, fully resolved restaurant dataset.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    frame: DataFrame,
    restaurants: Vec<Restaurant>,
}

impl CleanedTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn display_frame(&self) -> Result<DataFrame, CleanError> {
        Ok(self.frame.select(DISPLAY_COLUMNS)?)
    }
}

pub struct DataCleaner {
    settings: CleanerSettings,
    normalizer: ColumnNormalizer,
}

impl DataCleaner {
    pub fn new(settings: CleanerSettings) -> Result<Self, CleanError> {
        Ok(DataCleaner {
            settings,
            normalizer: ColumnNormalizer::new()?,
        })
    }

    pub fn settings(&self) -> &CleanerSettings {
        &self.settings
    }

    /// Runs the full cleaning sequence over `source` and overwrites the
    /// processed side file with the result. Nothing is written when any step
    /// fails.
    pub fn clean(&self, source: &Path) -> Result<CleanedTable, CleanError> {
        if !source.exists() {
            return Err(CleanError::SourceNotFound(source.to_path_buf()));
        }

        info!("Cleaning restaurant dataset from {}", source.display());
        let df = csv_store::read_csv_as_text(source)?;
        info!("Loaded {} raw rows with {} columns", df.height(), df.width());

        let df = self.rename_columns(&df)?;
        let mut df = self.drop_missing_rows(df)?;

        self.keep_first_cuisine(&mut df)?;
        self.attach_country(&mut df)?;
        self.attach_price_type(&mut df)?;
        self.attach_color_name(&mut df)?;

        let mut df = self.drop_constant_column(df)?;
        self.cast_columns(&mut df)?;
        let mut df = self.drop_duplicates(df)?;

        let restaurants = restaurants_from_frame(&df)?;

        csv_store::write_csv_atomic(&mut df, &self.settings.processed_path, b',')?;
        info!("Cleaned table holds {} restaurants", restaurants.len());

        Ok(CleanedTable {
            frame: df,
            restaurants,
        })
    }

    fn rename_columns(&self, df: &DataFrame) -> Result<DataFrame, CleanError> {
        let raw_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let normalized = self.normalizer.normalize(&raw_names)?;

        let mut columns: Vec<Column> = Vec::with_capacity(normalized.len());
        for (raw_name, new_name) in raw_names.iter().zip(&normalized) {
            let values: Vec<Option<String>> = text_column(df, raw_name)?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect();
            columns.push(Series::new(new_name.as_str().into(), values).into());
        }

        debug!("Normalized headers: {:?}", normalized);
        Ok(DataFrame::new(columns)?)
    }

    /// Drops rows holding a null or an empty field. Whitespace counts as a
    /// value.
    fn drop_missing_rows(&self, df: DataFrame) -> Result<DataFrame, CleanError> {
        let before = df.height();
        let not_empty = df
            .get_column_names()
            .iter()
            .fold(lit(true), |keep, name| keep.and(col(name.as_str()).neq(lit(""))));

        let filtered = df.lazy().drop_nulls(None).filter(not_empty).collect()?;

        let dropped = before - filtered.height();
        if dropped > 0 {
            info!("Dropped {} rows with missing values", dropped);
        }

        Ok(filtered)
    }

    fn keep_first_cuisine(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        let cuisines: Vec<Option<String>> = text_column(df, "cuisines")?
            .into_iter()
            .map(|value| value.map(first_cuisine))
            .collect();

        df.with_column(Series::new("cuisines".into(), cuisines))?;
        Ok(())
    }

    fn attach_country(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        let codes = text_column(df, "country_code")?;

        let mut names = Vec::with_capacity(codes.len());
        for (row, code) in codes.into_iter().enumerate() {
            let code = parse_int("country_code", row, code.unwrap_or_default())?;
            names.push(lookup::resolve_country(code)?);
        }

        df.with_column(Series::new("country".into(), names))?;
        Ok(())
    }

    fn attach_price_type(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        let ranges = text_column(df, "price_range")?;

        let mut tiers = Vec::with_capacity(ranges.len());
        for (row, range) in ranges.into_iter().enumerate() {
            let range = parse_int("price_range", row, range.unwrap_or_default())?;
            tiers.push(lookup::resolve_price_tier(range).as_str());
        }

        df.with_column(Series::new("price_type".into(), tiers))?;
        Ok(())
    }

    fn attach_color_name(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        let colors = text_column(df, "rating_color")?;

        let mut names = Vec::with_capacity(colors.len());
        for color in colors.into_iter() {
            names.push(lookup::resolve_color(color.unwrap_or_default().trim())?);
        }

        df.with_column(Series::new("color_name".into(), names))?;
        Ok(())
    }

    fn drop_constant_column(&self, df: DataFrame) -> Result<DataFrame, CleanError> {
        let name = self.settings.constant_column.as_str();

        if df.column(name).is_err() {
            debug!("Column '{}' not present, nothing to drop", name);
            return Ok(df);
        }

        let distinct = text_column(&df, name)?
            .into_iter()
            .collect::<HashSet<Option<&str>>>()
            .len();
        if distinct > 1 {
            warn!(
                "Column '{}' holds {} distinct values but is dropped as constant",
                name, distinct
            );
        }

        Ok(df.drop(name)?)
    }

    /// Replaces the numeric and flag columns with typed ones, so equal values
    /// compare equal whatever their source formatting.
    fn cast_columns(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        for (name, column_type) in TYPED_COLUMNS {
            let values = text_column(df, name)?;
            let typed = match column_type {
                ColumnType::Integer => {
                    Series::new(name.into(), parse_all(values, name, parse_int)?)
                }
                ColumnType::Float => {
                    Series::new(name.into(), parse_all(values, name, parse_float)?)
                }
                ColumnType::Flag => {
                    Series::new(name.into(), parse_all(values, name, parse_flag)?)
                }
            };
            df.with_column(typed)?;
        }

        Ok(())
    }

    fn drop_duplicates(&self, df: DataFrame) -> Result<DataFrame, CleanError> {
        let before = df.height();
        let deduplicated = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        let removed = before - deduplicated.height();
        if removed > 0 {
            info!("Removed {} duplicate rows", removed);
        }

        Ok(deduplicated)
    }
}

fn first_cuisine(cuisines: &str) -> String {
    cuisines
        .split(CUISINE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, CleanError> {
    let column = df
        .column(name)
        .map_err(|_| CleanError::MissingColumn(name.to_string()))?;
    Ok(column.str()?)
}

fn invalid(column: &str, row: usize, value: &str) -> CleanError {
    CleanError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

fn parse_int(column: &str, row: usize, value: &str) -> Result<i64, CleanError> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(parsed);
    }

    // Integral floats ("4.0") show up when a file passed through a float column.
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(parsed as i64),
        _ => Err(invalid(column, row, value)),
    }
}

fn parse_float(column: &str, row: usize, value: &str) -> Result<f64, CleanError> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(invalid(column, row, value)),
    }
}

fn parse_flag(column: &str, row: usize, value: &str) -> Result<bool, CleanError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(invalid(column, row, value)),
    }
}

fn parse_all<T>(
    values: &StringChunked,
    column: &str,
    parse: fn(&str, usize, &str) -> Result<T, CleanError>,
) -> Result<Vec<T>, CleanError> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| parse(column, row, value.unwrap_or_default()))
        .collect()
}

/// Materializes typed records from a cleaned, typed frame.
pub fn restaurants_from_frame(df: &DataFrame) -> Result<Vec<Restaurant>, CleanError> {
    for name in DISPLAY_COLUMNS.iter().chain(&["country_code", "price_range"]) {
        if df.column(name).is_err() {
            return Err(CleanError::MissingColumn(name.to_string()));
        }
    }

    Ok(frames::rows(df)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const RAW_HEADER: &str = concat!(
        "Restaurant ID,Restaurant Name,Country Code,City,Address,Locality,Locality Verbose,",
        "Longitude,Latitude,Cuisines,Average Cost for two,Currency,Has Table booking,",
        "Has Online delivery,Is delivering now,Switch to order menu,Price range,",
        "Aggregate rating,Rating color,Rating text,Votes"
    );

    pub struct RawRow<'a> {
        pub id: i64,
        pub name: &'a str,
        pub country_code: i64,
        pub city: &'a str,
        pub cuisines: &'a str,
        pub cost: i64,
        pub price_range: i64,
        pub rating: f64,
        pub color: &'a str,
        pub votes: i64,
    }

    impl RawRow<'_> {
        pub fn to_line(&self) -> String {
            format!(
                concat!(
                    "{},{},{},{},\"1 Main Street, {}\",Centre,\"Centre, {}\",-43.1,-22.9,",
                    "\"{}\",{},BRL(R$),1,0,0,0,{},{},{},Excellent,{}"
                ),
                self.id,
                self.name,
                self.country_code,
                self.city,
                self.city,
                self.city,
                self.cuisines,
                self.cost,
                self.price_range,
                self.rating,
                self.color,
                self.votes
            )
        }
    }

    pub fn row<'a>(
        id: i64,
        country_code: i64,
        city: &'a str,
        cuisines: &'a str,
        rating: f64,
        votes: i64,
    ) -> RawRow<'a> {
        RawRow {
            id,
            name: "Sample Bistro",
            country_code,
            city,
            cuisines,
            cost: 100,
            price_range: 2,
            rating,
            color: "5BA829",
            votes,
        }
    }

    pub fn write_raw_csv(dir: &Path, lines: &[String]) -> PathBuf {
        let path = dir.join("zomato.csv");
        let mut content = String::from(RAW_HEADER);
        for line in lines {
            content.push('\n');
            content.push_str(line);
        }
        content.push('\n');
        fs::write(&path, content).unwrap();
        path
    }
}
