use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price class derived from the dataset's 1-4 `price_range` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Cheap,
    Normal,
    Expensive,
    Gourmet,
}

impl PriceTier {
    pub const ALL: [PriceTier; 4] = [
        PriceTier::Cheap,
        PriceTier::Normal,
        PriceTier::Expensive,
        PriceTier::Gourmet,
    ];

    /// Anything outside 1..=3 is gourmet, including out-of-range codes.
    pub fn from_range(price_range: i64) -> Self {
        match price_range {
            1 => PriceTier::Cheap,
            2 => PriceTier::Normal,
            3 => PriceTier::Expensive,
            _ => PriceTier::Gourmet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Cheap => "cheap",
            PriceTier::Normal => "normal",
            PriceTier::Expensive => "expensive",
            PriceTier::Gourmet => "gourmet",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cheap" => Ok(PriceTier::Cheap),
            "normal" => Ok(PriceTier::Normal),
            "expensive" => Ok(PriceTier::Expensive),
            "gourmet" => Ok(PriceTier::Gourmet),
            other => Err(format!("unknown price tier: {}", other)),
        }
    }
}

/// One row of the cleaned restaurant table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub country_code: i64,
    pub country: String,
    pub city: String,
    pub address: String,
    pub locality: String,
    pub locality_verbose: String,
    pub longitude: f64,
    pub latitude: f64,
    pub cuisines: String,
    pub price_range: i64,
    pub price_type: PriceTier,
    pub average_cost_for_two: f64,
    pub currency: String,
    pub has_table_booking: bool,
    pub has_online_delivery: bool,
    pub is_delivering_now: bool,
    pub aggregate_rating: f64,
    pub rating_color: String,
    pub color_name: String,
    pub rating_text: String,
    pub votes: i64,
}
