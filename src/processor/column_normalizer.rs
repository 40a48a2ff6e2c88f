use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Headers '{first}' and '{second}' both normalize to '{normalized}'")]
    Collision {
        first: String,
        second: String,
        normalized: String,
    },
    #[error("Invalid normalization pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Turns raw dataset headers such as `Average Cost for two` into
/// `average_cost_for_two`.
///
/// Each header is title-cased word by word, stripped of spaces and then
/// converted to snake case, so `Has Online delivery` becomes
/// `HasOnlineDelivery` before ending up as `has_online_delivery`. Already
/// normalized headers map to themselves.
pub struct ColumnNormalizer {
    acronym_boundary: Regex,
    word_boundary: Regex,
}

impl ColumnNormalizer {
    pub fn new() -> Result<Self, NormalizeError> {
        Ok(ColumnNormalizer {
            acronym_boundary: Regex::new(r"([A-Z]+)([A-Z][a-z])")?,
            word_boundary: Regex::new(r"([a-z\d])([A-Z])")?,
        })
    }

    /// Normalizes every header, keeping order and length. Two distinct raw
    /// headers landing on the same name is an error.
    pub fn normalize<S: AsRef<str>>(&self, headers: &[S]) -> Result<Vec<String>, NormalizeError> {
        let mut seen: HashMap<String, String> = HashMap::with_capacity(headers.len());
        let mut normalized = Vec::with_capacity(headers.len());

        for header in headers {
            let raw = header.as_ref();
            let name = self.normalize_header(raw);

            if let Some(first) = seen.get(&name) {
                return Err(NormalizeError::Collision {
                    first: first.clone(),
                    second: raw.to_string(),
                    normalized: name,
                });
            }

            seen.insert(name.clone(), raw.to_string());
            normalized.push(name);
        }

        Ok(normalized)
    }

    pub fn normalize_header(&self, header: &str) -> String {
        let titled = self.titleize(header);
        let despaced: String = titled.chars().filter(|c| *c != ' ').collect();
        self.underscore(&despaced)
    }

    fn underscore(&self, word: &str) -> String {
        let word = self.acronym_boundary.replace_all(word, "${1}_${2}");
        let word = self.word_boundary.replace_all(&word, "${1}_${2}");
        word.replace('-', "_").to_lowercase()
    }

    fn titleize(&self, word: &str) -> String {
        let humanized = self.underscore(word).replace('_', " ");

        let mut titled = String::with_capacity(humanized.len());
        let mut previous_alphabetic = false;
        for c in humanized.chars() {
            if c.is_alphabetic() {
                if previous_alphabetic {
                    titled.extend(c.to_lowercase());
                } else {
                    titled.extend(c.to_uppercase());
                }
                previous_alphabetic = true;
            } else {
                titled.push(c);
                previous_alphabetic = false;
            }
        }

        titled.trim().to_string()
    }
}
