use thiserror::Error;

use crate::models::PriceTier;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Unknown country code: {0}")]
    UnknownCountry(i64),
    #[error("Unknown rating color code: {0}")]
    UnknownColor(String),
}

// Spellings match the published dataset.
static COUNTRIES: &[(i64, &str)] = &[
    (1, "India"),
    (14, "Australia"),
    (30, "Brazil"),
    (37, "Canada"),
    (94, "Indonesia"),
    (148, "New Zeland"),
    (162, "Philippines"),
    (166, "Qatar"),
    (184, "Singapure"),
    (189, "South Africa"),
    (191, "Sri Lanka"),
    (208, "Turkey"),
    (214, "United Arab Emirates"),
    (215, "England"),
    (216, "United States of America"),
];

static COLORS: &[(&str, &str)] = &[
    ("3F7E00", "darkgreen"),
    ("5BA829", "green"),
    ("9ACD32", "lightgreen"),
    ("CDD614", "orange"),
    ("FFBA00", "red"),
    ("CBCBC8", "darkred"),
    ("FF7800", "darkred"),
];

pub fn resolve_country(code: i64) -> Result<&'static str, LookupError> {
    COUNTRIES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .ok_or(LookupError::UnknownCountry(code))
}

pub fn resolve_price_tier(price_range: i64) -> PriceTier {
    PriceTier::from_range(price_range)
}

pub fn resolve_color(hex: &str) -> Result<&'static str, LookupError> {
    COLORS
        .iter()
        .find(|(known, _)| *known == hex)
        .map(|(_, name)| *name)
        .ok_or_else(|| LookupError::UnknownColor(hex.to_string()))
}

/// Every country name a cleaned row can carry.
pub fn country_names() -> impl Iterator<Item = &'static str> {
    COUNTRIES.iter().map(|(_, name)| *name)
}
