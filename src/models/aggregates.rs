use serde::{Deserialize, Serialize};

use super::restaurant::PriceTier;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub restaurants: usize,
    pub countries: usize,
    pub cities: usize,
    pub total_votes: i64,
    pub cuisines: usize,
}

/// Everything the map layer needs to place and label one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub restaurant_name: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub aggregate_rating: f64,
    pub address: String,
    pub cuisines: String,
    pub price_type: PriceTier,
    pub average_cost_for_two: f64,
    pub currency: String,
    pub color_name: String,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMean {
    pub country: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCost {
    pub country: String,
    pub currency: String,
    pub mean_cost_for_two: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRanking {
    pub country: String,
    pub city: String,
    pub restaurants: usize,
    pub oldest_restaurant_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCount {
    pub country: String,
    pub city: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuisineCard {
    pub cuisine: String,
    pub restaurants: usize,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub country: String,
    pub city: String,
    pub average_cost_for_two: f64,
    pub currency: String,
    pub aggregate_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuisineScore {
    pub cuisine: String,
    pub mean_rating: f64,
    pub mean_votes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRestaurantRow {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub country: String,
    pub city: String,
    pub cuisines: String,
    pub average_cost_for_two: f64,
    pub currency: String,
    pub aggregate_rating: f64,
}
