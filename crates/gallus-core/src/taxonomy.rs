//! The 4-level subject-matter taxonomy.
//!
//! Level 1 (`Category`) is a closed set: a record carrying a value outside
//! it is a fatal ingestion error, never a silent default. Levels 2-4
//! (subcategory, topic, attributes) are open vocabulary: new values appear
//! organically from source content and must be accepted without a schema
//! change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Closed top-level category set for knowledge-base content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Animal_Health")]
    AnimalHealth,
    #[serde(rename = "Nutrition")]
    Nutrition,
    #[serde(rename = "Genetics")]
    Genetics,
    #[serde(rename = "Environment")]
    Environment,
    #[serde(rename = "Management")]
    Management,
    #[serde(rename = "Performance")]
    Performance,
    #[serde(rename = "Biosecurity")]
    Biosecurity,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Welfare")]
    Welfare,
}

impl Category {
    /// All categories, in canonical order.
    pub const ALL: &'static [Category] = &[
        Category::AnimalHealth,
        Category::Nutrition,
        Category::Genetics,
        Category::Environment,
        Category::Management,
        Category::Performance,
        Category::Biosecurity,
        Category::Processing,
        Category::Welfare,
    ];

    /// Canonical wire form, matching the vector store's filterable values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AnimalHealth => "Animal_Health",
            Category::Nutrition => "Nutrition",
            Category::Genetics => "Genetics",
            Category::Environment => "Environment",
            Category::Management => "Management",
            Category::Performance => "Performance",
            Category::Biosecurity => "Biosecurity",
            Category::Processing => "Processing",
            Category::Welfare => "Welfare",
        }
    }

    /// Parse a category value leniently.
    ///
    /// Case and separator variations of a known category are accepted
    /// (`animal_health`, `Animal Health`, `animal-health`); anything outside
    /// the closed set is rejected.
    pub fn parse(value: &str) -> Result<Category, Error> {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        for category in Self::ALL {
            if category.as_str().to_lowercase() == normalized {
                return Ok(*category);
            }
        }
        Err(Error::InvalidInput(format!(
            "Unknown category: {:?}",
            value
        )))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

/// Normalize an open-vocabulary value to title case (`ross` → `Ross`,
/// `cobb 500` → `Cobb 500`).
///
/// Trims surrounding whitespace and uppercases the first letter of each
/// whitespace-separated word. Never rejects a value.
pub fn title_case(value: &str) -> String {
    value
        .trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_form() {
        assert_eq!(Category::parse("Animal_Health").unwrap(), Category::AnimalHealth);
        assert_eq!(Category::parse("Nutrition").unwrap(), Category::Nutrition);
    }

    #[test]
    fn parse_is_lenient_on_case_and_separator() {
        assert_eq!(Category::parse("animal_health").unwrap(), Category::AnimalHealth);
        assert_eq!(Category::parse("Animal Health").unwrap(), Category::AnimalHealth);
        assert_eq!(Category::parse("animal-health").unwrap(), Category::AnimalHealth);
        assert_eq!(Category::parse("  biosecurity  ").unwrap(), Category::Biosecurity);
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(Category::parse("Astrology").is_err());
        assert!(Category::parse("").is_err());
    }

    #[test]
    fn wire_form_round_trips_through_serde() {
        let json = serde_json::to_string(&Category::AnimalHealth).unwrap();
        assert_eq!(json, "\"Animal_Health\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::AnimalHealth);
    }

    #[test]
    fn all_contains_every_variant_once() {
        assert_eq!(Category::ALL.len(), 9);
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()).unwrap(), *category);
        }
    }

    #[test]
    fn title_case_normalizes_open_vocabulary() {
        assert_eq!(title_case("ross"), "Ross");
        assert_eq!(title_case("COBB"), "Cobb");
        assert_eq!(title_case("cobb 500"), "Cobb 500");
        assert_eq!(title_case("  hubbard  "), "Hubbard");
        assert_eq!(title_case(""), "");
    }
}
