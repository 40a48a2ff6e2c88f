use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::models::PriceTier;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Minimum rating {0} outside 0.0..=5.0")]
    RatingOutOfRange(f64),
}

/// The selectable values offered by the sidebar, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub price_tiers: Vec<PriceTier>,
}

impl FilterOptions {
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let price_tiers = distinct_text(df, "price_type")?
            .iter()
            .filter_map(|tier| tier.parse::<PriceTier>().ok())
            .collect();

        Ok(FilterOptions {
            countries: distinct_text(df, "country")?,
            price_tiers,
        })
    }
}

fn distinct_text(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let distinct = df
        .clone()
        .lazy()
        .select([col(name).unique_stable()])
        .collect()?;

    Ok(distinct
        .column(name)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Country, price tier and minimum rating predicates, combined with AND.
/// An empty country or tier selection matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantFilter {
    countries: BTreeSet<String>,
    price_tiers: BTreeSet<PriceTier>,
    min_rating: f64,
}

impl RestaurantFilter {
    pub fn new<C, T>(countries: C, price_tiers: T, min_rating: f64) -> Result<Self, FilterError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        T: IntoIterator<Item = PriceTier>,
    {
        if !(MIN_RATING..=MAX_RATING).contains(&min_rating) {
            return Err(FilterError::RatingOutOfRange(min_rating));
        }

        Ok(RestaurantFilter {
            countries: countries.into_iter().map(Into::into).collect(),
            price_tiers: price_tiers.into_iter().collect(),
            min_rating,
        })
    }

    /// Selects every offered option at the lowest rating threshold.
    pub fn pass_through(options: &FilterOptions) -> Self {
        RestaurantFilter {
            countries: options.countries.iter().cloned().collect(),
            price_tiers: options.price_tiers.iter().copied().collect(),
            min_rating: MIN_RATING,
        }
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn price_tiers(&self) -> &BTreeSet<PriceTier> {
        &self.price_tiers
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    /// The filter as a single boolean expression over the cleaned table.
    pub fn predicate(&self) -> Expr {
        let country = self.countries.iter().fold(lit(false), |any, country| {
            any.or(col("country").eq(lit(country.as_str())))
        });
        let tier = self.price_tiers.iter().fold(lit(false), |any, tier| {
            any.or(col("price_type").eq(lit(tier.as_str())))
        });

        country
            .and(tier)
            .and(col("aggregate_rating").gt_eq(lit(self.min_rating)))
    }

    /// Keeps the matching rows, in their original order.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let filtered = df.clone().lazy().filter(self.predicate()).collect()?;

        debug!(
            "Filter kept {} of {} rows (countries={:?}, tiers={:?}, min_rating={})",
            filtered.height(),
            df.height(),
            self.countries,
            self.price_tiers,
            self.min_rating
        );

        Ok(filtered)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{frame, restaurant};
    use super::*;
    use crate::models::Restaurant;
    use crate::processor::frames;

    fn table() -> DataFrame {
        let mut cheap = restaurant(1, "India", "New Delhi", "Italian", 4.5, 10);
        cheap.price_type = PriceTier::Cheap;
        let mut gourmet = restaurant(2, "Brazil", "Rio de Janeiro", "Bakery", 2.0, 5);
        gourmet.price_type = PriceTier::Gourmet;
        let mut low = restaurant(3, "India", "Agra", "Cafe", 3.2, 7);
        low.price_type = PriceTier::Cheap;

        frame(&[cheap, gourmet, low])
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        frames::rows::<Restaurant>(df)
            .unwrap()
            .iter()
            .map(|r| r.restaurant_id)
            .collect()
    }

    #[test]
    fn test_empty_country_selection_matches_nothing() {
        let filter = RestaurantFilter::new(Vec::<String>::new(), PriceTier::ALL, 0.0).unwrap();
        assert_eq!(filter.apply(&table()).unwrap().height(), 0);

        let filter = RestaurantFilter::new(["India"], Vec::new(), 0.0).unwrap();
        assert_eq!(filter.apply(&table()).unwrap().height(), 0);
    }

    #[test]
    fn test_full_selection_passes_everything() {
        let df = table();
        let options = FilterOptions::from_frame(&df).unwrap();
        let filter = RestaurantFilter::pass_through(&options);
        assert_eq!(ids(&filter.apply(&df).unwrap()), vec![1, 2, 3]);

        let explicit = RestaurantFilter::new(["India", "Brazil"], PriceTier::ALL, 0.0).unwrap();
        assert!(explicit.apply(&df).unwrap().equals(&df));
    }

    #[test]
    fn test_conjunction_of_predicates() {
        let filter = RestaurantFilter::new(["India"], [PriceTier::Cheap], 4.0).unwrap();
        assert_eq!(ids(&filter.apply(&table()).unwrap()), vec![1]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let filter = RestaurantFilter::new(["India"], PriceTier::ALL, 3.2).unwrap();
        assert_eq!(ids(&filter.apply(&table()).unwrap()), vec![1, 3]);
    }

    #[test]
    fn test_rating_range_is_validated() {
        assert_eq!(
            RestaurantFilter::new(["India"], PriceTier::ALL, 5.5).unwrap_err(),
            FilterError::RatingOutOfRange(5.5)
        );
        assert!(RestaurantFilter::new(["India"], PriceTier::ALL, -0.1).is_err());
        assert!(RestaurantFilter::new(["India"], PriceTier::ALL, 5.0).is_ok());
    }

    #[test]
    fn test_options_keep_first_seen_order() {
        let options = FilterOptions::from_frame(&table()).unwrap();
        assert_eq!(options.countries, vec!["India".to_string(), "Brazil".to_string()]);
        assert_eq!(options.price_tiers, vec![PriceTier::Cheap, PriceTier::Gourmet]);
    }
}
