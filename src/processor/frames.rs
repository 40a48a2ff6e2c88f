use polars::prelude::*;
use serde::de::DeserializeOwned;

/// Lowest restaurant id of a group; grouped views tie-break on it.
pub const OLDEST_RESTAURANT: &str = "oldest_restaurant_id";

/// Reads every row of `df` into `T`, matching columns to fields by name.
/// Columns without a matching field are ignored.
pub fn rows<T: DeserializeOwned>(df: &DataFrame) -> PolarsResult<Vec<T>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let mut df = df.clone();
    let mut buf = Vec::new();
    JsonWriter::new(&mut buf)
        .with_json_format(JsonFormat::Json)
        .finish(&mut df)?;

    serde_json::from_slice(&buf).map_err(|e| {
        PolarsError::ComputeError(format!("Failed to read frame rows: {}", e).into())
    })
}

pub fn sort_options(descending: &[bool]) -> SortMultipleOptions {
    SortMultipleOptions {
        descending: descending.to_vec(),
        ..Default::default()
    }
}

/// Groups by `keys` and computes `value` per group as `value_name`, carrying
/// the group's lowest restaurant id along.
pub fn group_values(lf: LazyFrame, keys: &[&str], value: Expr, value_name: &str) -> LazyFrame {
    lf.group_by(keys.iter().map(|key| col(*key)).collect::<Vec<_>>())
        .agg([
            value.alias(value_name),
            col("restaurant_id").min().alias(OLDEST_RESTAURANT),
        ])
}

/// Orders groups by `value_name`, then by lowest restaurant id, then by key.
pub fn order_groups(
    lf: LazyFrame,
    keys: &[&str],
    value_name: &str,
    descending: bool,
) -> LazyFrame {
    let mut by = vec![col(value_name), col(OLDEST_RESTAURANT)];
    let mut order = vec![descending, false];
    for key in keys {
        by.push(col(*key));
        order.push(false);
    }

    lf.sort_by_exprs(by, sort_options(&order))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds a float column to two decimals in place.
pub fn round_column(mut df: DataFrame, name: &str) -> PolarsResult<DataFrame> {
    let rounded: Vec<Option<f64>> = df
        .column(name)?
        .f64()?
        .into_iter()
        .map(|value| value.map(round2))
        .collect();

    df.with_column(Series::new(name.into(), rounded))?;
    Ok(df)
}
