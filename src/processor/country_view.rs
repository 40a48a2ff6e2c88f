use polars::prelude::*;

use super::frames::{group_values, order_groups, round_column};

const COUNTRY: [&str; 1] = ["country"];

/// Restaurants per country, most first.
pub fn restaurants_by_country(df: &DataFrame) -> PolarsResult<DataFrame> {
    let grouped = group_values(df.clone().lazy(), &COUNTRY, col("restaurant_id").count(), "count");

    order_groups(grouped, &COUNTRY, "count", true)
        .select([col("country"), col("count")])
        .collect()
}

/// Distinct cities per country, most first.
pub fn cities_by_country(df: &DataFrame) -> PolarsResult<DataFrame> {
    let grouped = group_values(df.clone().lazy(), &COUNTRY, col("city").n_unique(), "count");

    order_groups(grouped, &COUNTRY, "count", true)
        .select([col("country"), col("count")])
        .collect()
}

/// Mean vote count per country, lowest first, two decimals.
pub fn votes_by_country(df: &DataFrame) -> PolarsResult<DataFrame> {
    let grouped = group_values(df.clone().lazy(), &COUNTRY, col("votes").mean(), "mean").collect()?;
    let rounded = round_column(grouped, "mean")?;

    order_groups(rounded.lazy(), &COUNTRY, "mean", false)
        .select([col("country"), col("mean")])
        .collect()
}

/// Mean cost for two per country and currency, cheapest first, two decimals.
/// Countries quoting several currencies get one row per currency.
pub fn cost_by_country(df: &DataFrame) -> PolarsResult<DataFrame> {
    let keys = ["country", "currency"];
    let value = col("average_cost_for_two").mean();
    let grouped = group_values(df.clone().lazy(), &keys, value, "mean_cost_for_two").collect()?;
    let rounded = round_column(grouped, "mean_cost_for_two")?;

    order_groups(rounded.lazy(), &keys, "mean_cost_for_two", false)
        .select([col("country"), col("currency"), col("mean_cost_for_two")])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryCost, CountryCount, CountryMean, Restaurant};
    use crate::processor::filter_engine::test_support::{frame, restaurant};
    use crate::processor::frames::rows;

    fn table() -> DataFrame {
        let mut rows = vec![
            restaurant(1, "India", "New Delhi", "North Indian", 4.0, 100),
            restaurant(2, "India", "Agra", "Cafe", 3.5, 50),
            restaurant(3, "India", "New Delhi", "Chinese", 3.0, 1),
            restaurant(4, "Brazil", "Rio de Janeiro", "Bakery", 4.2, 10),
            restaurant(5, "Brazil", "Brasília", "Brazilian", 4.4, 20),
            restaurant(6, "Qatar", "Doha", "Arabian", 3.9, 3),
        ];
        rows[0].average_cost_for_two = 700.0;
        rows[1].average_cost_for_two = 300.0;
        rows[2].average_cost_for_two = 200.0;
        rows[2].currency = "Indian Rupees(Rs.)".to_string();
        rows[3].average_cost_for_two = 60.0;
        rows[4].average_cost_for_two = 85.0;
        rows[5].average_cost_for_two = 150.0;
        frame(&rows)
    }

    fn counts(df: DataFrame) -> Vec<(String, usize)> {
        rows::<CountryCount>(&df)
            .unwrap()
            .into_iter()
            .map(|c| (c.country, c.count))
            .collect()
    }

    fn pair(country: &str, count: usize) -> (String, usize) {
        (country.to_string(), count)
    }

    #[test]
    fn test_restaurant_counts_descending() {
        let counts = counts(restaurants_by_country(&table()).unwrap());
        assert_eq!(counts, vec![pair("India", 3), pair("Brazil", 2), pair("Qatar", 1)]);
    }

    #[test]
    fn test_city_counts_descending_with_id_tie_break() {
        let counts = counts(cities_by_country(&table()).unwrap());
        // India and Brazil both have two cities; India holds the lower id
        assert_eq!(counts, vec![pair("India", 2), pair("Brazil", 2), pair("Qatar", 1)]);
    }

    #[test]
    fn test_vote_means_ascending_and_rounded() {
        let means = rows::<CountryMean>(&votes_by_country(&table()).unwrap()).unwrap();
        assert_eq!(means[0].country, "Qatar");
        assert_eq!(means[0].mean, 3.0);
        assert_eq!(means[1].country, "Brazil");
        assert_eq!(means[1].mean, 15.0);
        assert_eq!(means[2].country, "India");
        assert_eq!(means[2].mean, 50.33);
    }

    #[test]
    fn test_cost_means_split_by_currency() {
        let costs = rows::<CountryCost>(&cost_by_country(&table()).unwrap()).unwrap();
        let flat: Vec<(&str, &str, f64)> = costs
            .iter()
            .map(|c| (c.country.as_str(), c.currency.as_str(), c.mean_cost_for_two))
            .collect();

        assert_eq!(
            flat,
            vec![
                ("Brazil", "Dollar($)", 72.5),
                ("Qatar", "Dollar($)", 150.0),
                ("India", "Indian Rupees(Rs.)", 200.0),
                ("India", "Dollar($)", 500.0),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let empty = frame(&Vec::<Restaurant>::new());
        assert_eq!(restaurants_by_country(&empty).unwrap().height(), 0);
        assert_eq!(votes_by_country(&empty).unwrap().height(), 0);
        assert_eq!(cost_by_country(&empty).unwrap().height(), 0);
    }
}
