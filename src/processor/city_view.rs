use polars::prelude::*;

use super::frames::{group_values, order_groups, OLDEST_RESTAURANT};

pub const TOP_CITIES: usize = 10;
pub const TOP_RATING_BAND_CITIES: usize = 7;
pub const TOP_CUISINE_DIVERSITY_CITIES: usize = 10;

/// Ratings strictly above this count as "best".
pub const BEST_RATING_ABOVE: f64 = 4.0;
/// Ratings strictly below this count as "worst".
pub const WORST_RATING_BELOW: f64 = 2.5;

const CITY: [&str; 2] = ["country", "city"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    Best,
    Worst,
}

impl RatingBand {
    pub fn predicate(&self) -> Expr {
        match self {
            RatingBand::Best => col("aggregate_rating").gt(lit(BEST_RATING_ABOVE)),
            RatingBand::Worst => col("aggregate_rating").lt(lit(WORST_RATING_BELOW)),
        }
    }
}

fn top_cities(lf: LazyFrame, value: Expr, value_name: &str, n: usize) -> LazyFrame {
    order_groups(group_values(lf, &CITY, value, value_name), &CITY, value_name, true)
        .limit(n as IdxSize)
}

/// Cities with the most restaurants; ties go to the city holding the
/// oldest (lowest) restaurant id.
pub fn top_cities_by_restaurants(df: &DataFrame, n: usize) -> PolarsResult<DataFrame> {
    let count = col("restaurant_id").count();

    top_cities(df.clone().lazy(), count, "restaurants", n)
        .select([
            col("country"),
            col("city"),
            col("restaurants"),
            col(OLDEST_RESTAURANT),
        ])
        .collect()
}

/// Cities with the most restaurants inside a rating band.
pub fn top_cities_by_rating_band(
    df: &DataFrame,
    band: RatingBand,
    n: usize,
) -> PolarsResult<DataFrame> {
    let in_band = df.clone().lazy().filter(band.predicate());

    top_cities(in_band, col("restaurant_id").count(), "count", n)
        .select([col("country"), col("city"), col("count")])
        .collect()
}

/// Cities offering the most distinct cuisines.
pub fn top_cities_by_cuisine_diversity(df: &DataFrame, n: usize) -> PolarsResult<DataFrame> {
    top_cities(df.clone().lazy(), col("cuisines").n_unique(), "count", n)
        .select([col("country"), col("city"), col("count")])
        .collect()
}
