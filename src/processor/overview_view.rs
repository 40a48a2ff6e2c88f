use polars::prelude::*;

use crate::models::{MapMarker, Restaurant};

/// One-row frame of headline counts: restaurants, countries, cities, total
/// votes and cuisines.
pub fn overview_metrics(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .select([
            col("restaurant_id").n_unique().alias("restaurants"),
            col("country").n_unique().alias("countries"),
            col("city").n_unique().alias("cities"),
            col("votes").sum().alias("total_votes"),
            col("cuisines").n_unique().alias("cuisines"),
        ])
        .collect()
}

pub fn map_markers(rows: &[Restaurant]) -> Vec<MapMarker> {
    rows.iter()
        .map(|row| MapMarker {
            restaurant_name: row.restaurant_name.clone(),
            city: row.city.clone(),
            latitude: row.latitude,
            longitude: row.longitude,
            aggregate_rating: row.aggregate_rating,
            address: row.address.clone(),
            cuisines: row.cuisines.clone(),
            price_type: row.price_type,
            average_cost_for_two: row.average_cost_for_two,
            currency: row.currency.clone(),
            color_name: row.color_name.clone(),
            popup: popup_text(row),
        })
        .collect()
}

fn popup_text(row: &Restaurant) -> String {
    format!(
        "Restaurant: {}\nCity: {}\nCuisine: {}\nRating: {}/5.0\nCost for two: {} - {}\nAddress: {}",
        row.restaurant_name,
        row.city,
        row.cuisines,
        row.aggregate_rating,
        row.average_cost_for_two,
        row.currency,
        row.address
    )
}
