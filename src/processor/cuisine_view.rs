use polars::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use super::frames::{group_values, order_groups, rows, sort_options, OLDEST_RESTAURANT};
use crate::models::{CuisineCard, Restaurant};

pub const CUISINE_CARDS: usize = 5;
pub const TOP_CUISINE_SCORES: usize = 10;
pub const MAX_TABLE_SIZE: usize = 20;

const CUISINE: [&str; 1] = ["cuisines"];

const TOP_RESTAURANT_COLUMNS: [&str; 8] = [
    "restaurant_id",
    "restaurant_name",
    "country",
    "city",
    "cuisines",
    "average_cost_for_two",
    "currency",
    "aggregate_rating",
];

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Cuisine rank {placement} out of range: only {available} cuisines available")]
    RankOutOfRange { placement: usize, available: usize },
    #[error("Table size {0} out of range 0..={MAX_TABLE_SIZE}", MAX_TABLE_SIZE = MAX_TABLE_SIZE)]
    TableSizeOutOfRange(usize),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Deserialize)]
struct CuisineGroup {
    cuisines: String,
    restaurants: usize,
}

/// Highest rating first, then lowest id.
fn by_rating_then_id(lf: LazyFrame) -> LazyFrame {
    lf.sort_by_exprs(
        vec![col("aggregate_rating"), col("restaurant_id")],
        sort_options(&[true, false]),
    )
}

/// Cuisines ordered by how many restaurants serve them, most first.
fn ranked_cuisines(df: &DataFrame) -> PolarsResult<Vec<CuisineGroup>> {
    let count = col("restaurant_id").count();
    let grouped = group_values(df.clone().lazy(), &CUISINE, count, "restaurants");

    rows(&order_groups(grouped, &CUISINE, "restaurants", true).collect()?)
}

fn card_for(df: &DataFrame, group: &CuisineGroup) -> PolarsResult<Option<CuisineCard>> {
    let served = df
        .clone()
        .lazy()
        .filter(col("cuisines").eq(lit(group.cuisines.as_str())));
    let best = by_rating_then_id(served).limit(1).collect()?;

    Ok(rows::<Restaurant>(&best)?.into_iter().next().map(|best| CuisineCard {
        cuisine: group.cuisines.clone(),
        restaurants: group.restaurants,
        restaurant_id: best.restaurant_id,
        restaurant_name: best.restaurant_name,
        country: best.country,
        city: best.city,
        average_cost_for_two: best.average_cost_for_two,
        currency: best.currency,
        aggregate_rating: best.aggregate_rating,
    }))
}

/// Picks the cuisine at `placement` (0-based) in the restaurant count ranking
/// and returns its best rated restaurant.
pub fn best_restaurant_for_cuisine(
    df: &DataFrame,
    placement: usize,
) -> Result<CuisineCard, ViewError> {
    let ranked = ranked_cuisines(df)?;
    let out_of_range = ViewError::RankOutOfRange {
        placement,
        available: ranked.len(),
    };

    match ranked.get(placement) {
        Some(group) => card_for(df, group)?.ok_or(out_of_range),
        None => Err(out_of_range),
    }
}

/// Cards for the `count` most served cuisines; fewer when the table runs out
/// of cuisines.
pub fn cuisine_cards(df: &DataFrame, count: usize) -> Result<Vec<CuisineCard>, ViewError> {
    let mut cards = Vec::new();
    for group in ranked_cuisines(df)?.iter().take(count) {
        if let Some(card) = card_for(df, group)? {
            cards.push(card);
        }
    }
    Ok(cards)
}

/// Mean rating and mean votes per cuisine. `Descending` lists the best
/// cuisines, `Ascending` the worst.
pub fn cuisine_score_ranking(
    df: &DataFrame,
    order: SortOrder,
    n: usize,
) -> PolarsResult<DataFrame> {
    let grouped = df.clone().lazy().group_by([col("cuisines")]).agg([
        col("aggregate_rating").mean().alias("mean_rating"),
        col("votes").mean().alias("mean_votes"),
        col("restaurant_id").min().alias(OLDEST_RESTAURANT),
    ]);
    let descending = order == SortOrder::Descending;

    order_groups(grouped, &CUISINE, "mean_rating", descending)
        .limit(n as IdxSize)
        .select([
            col("cuisines").alias("cuisine"),
            col("mean_rating"),
            col("mean_votes"),
        ])
        .collect()
}

/// The `n` best rated restaurants, lowest id first on equal ratings.
pub fn top_restaurants(df: &DataFrame, n: usize) -> Result<DataFrame, ViewError> {
    if n > MAX_TABLE_SIZE {
        return Err(ViewError::TableSizeOutOfRange(n));
    }

    let columns: Vec<Expr> = TOP_RESTAURANT_COLUMNS.iter().map(|name| col(*name)).collect();
    Ok(by_rating_then_id(df.clone().lazy())
        .limit(n as IdxSize)
        .select(columns)
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CuisineScore, TopRestaurantRow};
    use crate::processor::filter_engine::test_support::{frame, restaurant};

    fn table() -> DataFrame {
        frame(&[
            restaurant(5, "Italy", "Rome", "Italian", 4.8, 300),
            restaurant(2, "Italy", "Milan", "Italian", 4.8, 200),
            restaurant(9, "Italy", "Turin", "Italian", 3.1, 100),
            restaurant(1, "Japan", "Tokyo", "Japanese", 4.9, 150),
            restaurant(3, "Japan", "Osaka", "Japanese", 2.0, 150),
            restaurant(4, "Brazil", "Recife", "Bakery", 3.0, 20),
        ])
    }

    fn names(scores: &[CuisineScore]) -> Vec<&str> {
        scores.iter().map(|s| s.cuisine.as_str()).collect()
    }

    #[test]
    fn test_best_restaurant_of_most_served_cuisine() {
        let card = best_restaurant_for_cuisine(&table(), 0).unwrap();

        assert_eq!(card.cuisine, "Italian");
        assert_eq!(card.restaurants, 3);
        // 4.8 tie between ids 5 and 2
        assert_eq!(card.restaurant_id, 2);
        assert_eq!(card.city, "Milan");
    }

    #[test]
    fn test_ranking_counts_restaurants_not_votes() {
        let table = frame(&[
            restaurant(1, "Brazil", "Rio", "Cafe", 3.0, 1),
            restaurant(2, "Brazil", "Rio", "Cafe", 3.5, 1),
            restaurant(3, "Brazil", "Rio", "Cafe", 4.0, 1),
            restaurant(4, "Brazil", "Rio", "Steakhouse", 4.9, 500),
        ]);

        let first = best_restaurant_for_cuisine(&table, 0).unwrap();
        assert_eq!(first.cuisine, "Cafe");
        assert_eq!(first.restaurants, 3);
        assert_eq!(first.restaurant_id, 3);

        let second = best_restaurant_for_cuisine(&table, 1).unwrap();
        assert_eq!(second.cuisine, "Steakhouse");
    }

    #[test]
    fn test_equal_counts_go_to_oldest_restaurant() {
        let table = frame(&[
            restaurant(7, "India", "Agra", "Mughlai", 4.0, 10),
            restaurant(3, "India", "Agra", "Cafe", 4.0, 10),
        ]);

        let cards = cuisine_cards(&table, CUISINE_CARDS).unwrap();
        let cuisines: Vec<&str> = cards.iter().map(|c| c.cuisine.as_str()).collect();
        assert_eq!(cuisines, vec!["Cafe", "Mughlai"]);
    }

    #[test]
    fn test_lower_placements() {
        let second = best_restaurant_for_cuisine(&table(), 1).unwrap();
        assert_eq!(second.cuisine, "Japanese");
        assert_eq!(second.restaurant_id, 1);

        let third = best_restaurant_for_cuisine(&table(), 2).unwrap();
        assert_eq!(third.cuisine, "Bakery");
    }

    #[test]
    fn test_placement_out_of_range() {
        assert!(matches!(
            best_restaurant_for_cuisine(&table(), 3),
            Err(ViewError::RankOutOfRange {
                placement: 3,
                available: 3
            })
        ));
        assert!(matches!(
            best_restaurant_for_cuisine(&frame(&[]), 0),
            Err(ViewError::RankOutOfRange {
                placement: 0,
                available: 0
            })
        ));
    }

    #[test]
    fn test_cards_stop_when_cuisines_run_out() {
        let cards = cuisine_cards(&table(), CUISINE_CARDS).unwrap();
        let cuisines: Vec<&str> = cards.iter().map(|c| c.cuisine.as_str()).collect();
        assert_eq!(cuisines, vec!["Italian", "Japanese", "Bakery"]);
    }

    #[test]
    fn test_cuisine_scores_both_directions() {
        let best = cuisine_score_ranking(&table(), SortOrder::Descending, TOP_CUISINE_SCORES);
        let best: Vec<CuisineScore> = rows(&best.unwrap()).unwrap();
        assert_eq!(names(&best), vec!["Italian", "Japanese", "Bakery"]);
        assert!((best[0].mean_rating - 12.7 / 3.0).abs() < 1e-9);
        assert_eq!(best[0].mean_votes, 200.0);

        let worst = cuisine_score_ranking(&table(), SortOrder::Ascending, 2);
        let worst: Vec<CuisineScore> = rows(&worst.unwrap()).unwrap();
        assert_eq!(names(&worst), vec!["Bakery", "Japanese"]);
    }

    #[test]
    fn test_top_restaurants_table() {
        let top: Vec<TopRestaurantRow> = rows(&top_restaurants(&table(), 3).unwrap()).unwrap();
        let ids: Vec<i64> = top.iter().map(|r| r.restaurant_id).collect();
        assert_eq!(ids, vec![1, 2, 5]);

        assert_eq!(top_restaurants(&table(), 0).unwrap().height(), 0);
        assert_eq!(top_restaurants(&table(), MAX_TABLE_SIZE).unwrap().height(), 6);
        assert!(matches!(
            top_restaurants(&table(), 21),
            Err(ViewError::TableSizeOutOfRange(21))
        ));
    }
}
