//! Taxonomy constraints for retrieval queries.
//!
//! A caller narrows a semantic query by subject-matter and business
//! context; the access filter builder ANDs these constraints onto the
//! always-present security clause.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gallus_core::Category;

/// Optional taxonomy/business-context constraints for a query.
///
/// Every field is optional; an empty constraint set filters by security
/// alone. Set-valued constraints match records sharing at least one value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub species: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genetic_line: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub production_stage: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub site_type: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub geo_region: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub technical_tags: BTreeSet<String>,
}

impl TaxonomyConstraints {
    /// Create an empty constraint set (security filtering only).
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species.insert(species.into());
        self
    }

    pub fn with_genetic_line(mut self, line: impl Into<String>) -> Self {
        self.genetic_line = Some(line.into());
        self
    }

    pub fn with_production_stage(mut self, stage: impl Into<String>) -> Self {
        self.production_stage.insert(stage.into());
        self
    }

    pub fn with_site_type(mut self, site_type: impl Into<String>) -> Self {
        self.site_type.insert(site_type.into());
        self
    }

    pub fn with_geo_region(mut self, region: impl Into<String>) -> Self {
        self.geo_region.insert(region.into());
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_technical_tag(mut self, tag: impl Into<String>) -> Self {
        self.technical_tags.insert(tag.into());
        self
    }

    /// Check if no constraints are set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.subcategory.is_none()
            && self.topic.is_none()
            && self.species.is_empty()
            && self.genetic_line.is_none()
            && self.production_stage.is_empty()
            && self.site_type.is_empty()
            && self.geo_region.is_empty()
            && self.source_type.is_none()
            && self.language.is_none()
            && self.technical_tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_constraints() {
        let constraints = TaxonomyConstraints::new();
        assert!(constraints.is_empty());
    }

    #[test]
    fn builder_sets_fields() {
        let constraints = TaxonomyConstraints::new()
            .with_category(Category::AnimalHealth)
            .with_species("broiler")
            .with_genetic_line("Ross");

        assert!(!constraints.is_empty());
        assert_eq!(constraints.category, Some(Category::AnimalHealth));
        assert!(constraints.species.contains("broiler"));
        assert_eq!(constraints.genetic_line.as_deref(), Some("Ross"));
    }

    #[test]
    fn serde_skips_empty_fields() {
        let json = serde_json::to_string(&TaxonomyConstraints::new()).unwrap();
        assert_eq!(json, "{}");
    }
}
