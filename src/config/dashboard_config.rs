use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The dashboard pages, each with its own sidebar defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Overview,
    Countries,
    Cities,
    Cuisines,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Countries, Page::Cities, Page::Cuisines];
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Overview => "overview",
            Page::Countries => "countries",
            Page::Cities => "cities",
            Page::Cuisines => "cuisines",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataSection,
    pub views: ViewSection,
    pub filters: FilterSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub export_file_name: String,
    pub constant_column: String,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSection {
    pub top_cities: usize,
    pub top_rating_band_cities: usize,
    pub top_cuisine_diversity_cities: usize,
    pub cuisine_cards: usize,
    pub top_cuisine_scores: usize,
    pub top_restaurants: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub min_rating: f64,
    /// Preselected countries keyed by page name; a page without an entry
    /// starts with every country selected.
    pub countries: BTreeMap<String, Vec<String>>,
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config file: {}", path))?;

        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse dashboard config file: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Preselected countries for `page`, `None` meaning all of them.
    pub fn default_countries(&self, page: Page) -> Option<&[String]> {
        self.filters.countries.get(&page.to_string()).map(Vec::as_slice)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.raw_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Raw data path cannot be empty"));
        }

        if self.data.processed_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Processed data path cannot be empty"));
        }

        if self.data.processed_path == self.data.raw_path {
            return Err(anyhow::anyhow!("Processed data path must differ from the raw data path"));
        }

        if self.data.export_file_name.is_empty() {
            return Err(anyhow::anyhow!("Export file name cannot be empty"));
        }

        if self.data.constant_column.is_empty() {
            return Err(anyhow::anyhow!("Constant column name cannot be empty"));
        }

        if !(0.0..=5.0).contains(&self.filters.min_rating) {
            return Err(anyhow::anyhow!(
                "Default minimum rating {} outside 0.0..=5.0",
                self.filters.min_rating
            ));
        }

        if self.views.top_restaurants > 20 {
            return Err(anyhow::anyhow!(
                "Top restaurant table size {} exceeds 20",
                self.views.top_restaurants
            ));
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: DataSection::default(),
            views: ViewSection::default(),
            filters: FilterSection::default(),
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("data/raw_data/zomato.csv"),
            processed_path: PathBuf::from("data/processed/data.csv"),
            export_file_name: "data.csv".to_string(),
            constant_column: "switch_to_order_menu".to_string(),
            snapshot_path: None,
        }
    }
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            top_cities: 10,
            top_rating_band_cities: 7,
            top_cuisine_diversity_cities: 10,
            cuisine_cards: 5,
            top_cuisine_scores: 10,
            top_restaurants: 10,
        }
    }
}

impl Default for FilterSection {
    fn default() -> Self {
        let brazil = vec!["Brazil".to_string()];
        let mut countries = BTreeMap::new();
        countries.insert(Page::Overview.to_string(), brazil.clone());
        countries.insert(Page::Cities.to_string(), brazil.clone());
        countries.insert(Page::Cuisines.to_string(), brazil);

        Self {
            min_rating: 0.0,
            countries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data.export_file_name, "data.csv");
        assert_eq!(config.views.top_rating_band_cities, 7);
        assert_eq!(config.default_countries(Page::Overview), Some(&["Brazil".to_string()][..]));
        assert_eq!(config.default_countries(Page::Countries), None);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [data]
            raw_path = "input/zomato.csv"

            [filters]
            min_rating = 3.5

            [filters.countries]
            cities = ["India", "Brazil"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.raw_path, PathBuf::from("input/zomato.csv"));
        assert_eq!(config.data.processed_path, PathBuf::from("data/processed/data.csv"));
        assert_eq!(config.views.top_cities, 10);
        assert_eq!(config.filters.min_rating, 3.5);
        assert_eq!(config.default_countries(Page::Cities).unwrap().len(), 2);
        // an explicit table replaces the default per-page selections
        assert_eq!(config.default_countries(Page::Overview), None);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = DashboardConfig::default();
        config.filters.min_rating = 6.0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.views.top_restaurants = 21;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.data.processed_path = config.data.raw_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bundled_config_parses() {
        let config = DashboardConfig::from_file("src/configs/dashboard.toml").unwrap();
        assert_eq!(config.data.constant_column, "switch_to_order_menu");
        assert_eq!(config.default_countries(Page::Countries), None);
    }
}
