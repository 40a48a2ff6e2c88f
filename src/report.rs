use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{DashboardConfig, Page};
use crate::models::*;
use crate::processor::frames::rows;
use crate::processor::{
    self, CleanedTable, FilterOptions, RatingBand, RestaurantFilter, SortOrder,
};

/// View frames of one page, titled, in display order.
pub type PageTables = Vec<(String, DataFrame)>;

/// Keeps `df` for display and returns its rows for serialization.
fn keep_table<T: DeserializeOwned>(
    tables: &mut PageTables,
    title: &str,
    df: DataFrame,
) -> PolarsResult<Vec<T>> {
    let typed = rows(&df)?;
    tables.push((title.to_string(), df));
    Ok(typed)
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewPage {
    pub filter: RestaurantFilter,
    pub metrics: OverviewMetrics,
    pub markers: Vec<MapMarker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountriesPage {
    pub filter: RestaurantFilter,
    pub restaurants: Vec<CountryCount>,
    pub cities: Vec<CountryCount>,
    pub mean_votes: Vec<CountryMean>,
    pub mean_cost: Vec<CountryCost>,
    #[serde(skip)]
    pub tables: PageTables,
}

#[derive(Debug, Clone, Serialize)]
pub struct CitiesPage {
    pub filter: RestaurantFilter,
    pub most_restaurants: Vec<CityRanking>,
    pub best_rated: Vec<CityCount>,
    pub worst_rated: Vec<CityCount>,
    pub cuisine_diversity: Vec<CityCount>,
    #[serde(skip)]
    pub tables: PageTables,
}

#[derive(Debug, Clone, Serialize)]
pub struct CuisinesPage {
    pub filter: RestaurantFilter,
    pub cards: Vec<CuisineCard>,
    pub top_restaurants: Vec<TopRestaurantRow>,
    pub best_cuisines: Vec<CuisineScore>,
    pub worst_cuisines: Vec<CuisineScore>,
    #[serde(skip)]
    pub tables: PageTables,
}

/// Every page evaluated with its default sidebar selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub restaurants: usize,
    pub options: FilterOptions,
    pub overview: OverviewPage,
    pub countries: CountriesPage,
    pub cities: CitiesPage,
    pub cuisines: CuisinesPage,
}

/// The sidebar selection a page opens with. Configured countries missing
/// from the table are skipped.
pub fn page_filter(
    config: &DashboardConfig,
    page: Page,
    options: &FilterOptions,
) -> Result<RestaurantFilter> {
    let countries: Vec<String> = match config.default_countries(page) {
        Some(selected) => selected
            .iter()
            .filter(|country| {
                let known = options.countries.contains(country);
                if !known {
                    warn!(
                        "Default country '{}' for {} page not in table, skipping",
                        country, page
                    );
                }
                known
            })
            .cloned()
            .collect(),
        None => options.countries.clone(),
    };

    let tiers = options.price_tiers.iter().copied();
    RestaurantFilter::new(countries, tiers, config.filters.min_rating)
        .with_context(|| format!("Invalid default filter for {} page", page))
}

pub fn overview_page(filter: RestaurantFilter, df: &DataFrame) -> Result<OverviewPage> {
    let filtered = filter.apply(df)?;
    let metrics = rows::<OverviewMetrics>(&processor::overview_metrics(&filtered)?)?
        .into_iter()
        .next()
        .unwrap_or_default();

    Ok(OverviewPage {
        metrics,
        markers: processor::map_markers(&rows::<Restaurant>(&filtered)?),
        filter,
    })
}

pub fn countries_page(filter: RestaurantFilter, df: &DataFrame) -> Result<CountriesPage> {
    let filtered = filter.apply(df)?;
    let mut tables = PageTables::new();

    Ok(CountriesPage {
        restaurants: keep_table(
            &mut tables,
            "Restaurants per country",
            processor::restaurants_by_country(&filtered)?,
        )?,
        cities: keep_table(
            &mut tables,
            "Cities per country",
            processor::cities_by_country(&filtered)?,
        )?,
        mean_votes: keep_table(
            &mut tables,
            "Mean votes per country",
            processor::votes_by_country(&filtered)?,
        )?,
        mean_cost: keep_table(
            &mut tables,
            "Mean cost for two per country",
            processor::cost_by_country(&filtered)?,
        )?,
        tables,
        filter,
    })
}

pub fn cities_page(
    config: &DashboardConfig,
    filter: RestaurantFilter,
    df: &DataFrame,
) -> Result<CitiesPage> {
    let filtered = filter.apply(df)?;
    let views = &config.views;
    let band = views.top_rating_band_cities;
    let mut tables = PageTables::new();

    Ok(CitiesPage {
        most_restaurants: keep_table(
            &mut tables,
            "Cities with most restaurants",
            processor::top_cities_by_restaurants(&filtered, views.top_cities)?,
        )?,
        best_rated: keep_table(
            &mut tables,
            "Cities with most restaurants rated above 4.0",
            processor::top_cities_by_rating_band(&filtered, RatingBand::Best, band)?,
        )?,
        worst_rated: keep_table(
            &mut tables,
            "Cities with most restaurants rated below 2.5",
            processor::top_cities_by_rating_band(&filtered, RatingBand::Worst, band)?,
        )?,
        cuisine_diversity: keep_table(
            &mut tables,
            "Cities with most distinct cuisines",
            processor::top_cities_by_cuisine_diversity(
                &filtered,
                views.top_cuisine_diversity_cities,
            )?,
        )?,
        tables,
        filter,
    })
}

pub fn cuisines_page(
    config: &DashboardConfig,
    filter: RestaurantFilter,
    df: &DataFrame,
) -> Result<CuisinesPage> {
    let filtered = filter.apply(df)?;
    let views = &config.views;
    let scores = views.top_cuisine_scores;
    let mut tables = PageTables::new();

    Ok(CuisinesPage {
        cards: processor::cuisine_cards(&filtered, views.cuisine_cards)?,
        top_restaurants: keep_table(
            &mut tables,
            "Top restaurants",
            processor::top_restaurants(&filtered, views.top_restaurants)?,
        )?,
        best_cuisines: keep_table(
            &mut tables,
            "Best cuisines",
            processor::cuisine_score_ranking(&filtered, SortOrder::Descending, scores)?,
        )?,
        worst_cuisines: keep_table(
            &mut tables,
            "Worst cuisines",
            processor::cuisine_score_ranking(&filtered, SortOrder::Ascending, scores)?,
        )?,
        tables,
        filter,
    })
}

pub fn build_snapshot(config: &DashboardConfig, table: &CleanedTable) -> Result<DashboardSnapshot> {
    let df = table.frame();
    let options = FilterOptions::from_frame(df)?;

    let snapshot = DashboardSnapshot {
        generated_at: Utc::now(),
        restaurants: table.len(),
        overview: overview_page(page_filter(config, Page::Overview, &options)?, df)?,
        countries: countries_page(page_filter(config, Page::Countries, &options)?, df)?,
        cities: cities_page(config, page_filter(config, Page::Cities, &options)?, df)?,
        cuisines: cuisines_page(config, page_filter(config, Page::Cuisines, &options)?, df)?,
        options,
    };

    info!(
        "Built dashboard snapshot: {} restaurants, {} countries",
        snapshot.restaurants,
        snapshot.options.countries.len()
    );

    Ok(snapshot)
}

pub fn write_snapshot(snapshot: &DashboardSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create snapshot directory: {}", parent.display())
        })?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    info!("Wrote dashboard snapshot to {}", path.display());
    Ok(())
}

fn print_tables(tables: &PageTables) {
    for (title, df) in tables {
        println!("{}:\n{}", title, df);
    }
}

/// Prints every page of the snapshot as terminal tables.
pub fn print_snapshot(snapshot: &DashboardSnapshot) {
    let overview = &snapshot.overview.metrics;
    println!("\n=== Overview ===");
    println!("Restaurants registered: {}", overview.restaurants);
    println!("Countries registered: {}", overview.countries);
    println!("Cities registered: {}", overview.cities);
    println!("Ratings given: {}", overview.total_votes);
    println!("Cuisine types offered: {}", overview.cuisines);
    println!("Map markers: {}", snapshot.overview.markers.len());

    println!("\n=== Countries ===");
    print_tables(&snapshot.countries.tables);

    println!("\n=== Cities ===");
    print_tables(&snapshot.cities.tables);

    let cuisines = &snapshot.cuisines;
    println!("\n=== Cuisines ===");
    for card in &cuisines.cards {
        println!(
            "{} ({} restaurants) - {}: {}/5.0 ({}, {}; cost for two {} - {})",
            card.cuisine,
            card.restaurants,
            card.restaurant_name,
            card.aggregate_rating,
            card.city,
            card.country,
            card.average_cost_for_two,
            card.currency
        );
    }
    print_tables(&cuisines.tables);
}
