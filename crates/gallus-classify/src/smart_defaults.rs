//! Conservative fallback values (tier 3).
//!
//! Applied field-by-field after the path and LLM tiers; an existing value
//! is never overwritten. Visibility defaults to `public_global`: content
//! invisible to everyone is a worse failure mode here than over-exposing
//! non-secret technical material, and genuinely private content always
//! arrives through an explicit tenant path segment that tier 1 resolves
//! before defaults ever apply. Subject-matter category has no default;
//! the default tier must not guess taxonomy.

use gallus_core::{defaults, schema, PartialMetadata, VisibilityLevel};

/// The static default table.
pub struct SmartDefaults;

impl SmartDefaults {
    /// Fill every still-absent defaultable field, returning the schema
    /// names of the fields this tier resolved.
    pub fn apply(fields: &mut PartialMetadata) -> Vec<&'static str> {
        let mut filled = Vec::new();

        if fields.visibility_level.is_none() {
            fields.visibility_level = Some(VisibilityLevel::PublicGlobal);
            filled.push(schema::VISIBILITY_LEVEL);
        }
        // owner_org_id intentionally stays absent: the public_global
        // default carries no owner.
        if fields.geo_region.is_empty() {
            fields.geo_region.insert(defaults::DEFAULT_GEO_REGION.to_string());
            filled.push(schema::GEO_REGION);
        }
        if fields.production_stage.is_empty() {
            fields
                .production_stage
                .insert(defaults::DEFAULT_PRODUCTION_STAGE.to_string());
            filled.push(schema::PRODUCTION_STAGE);
        }
        if fields.site_type.is_empty() {
            fields.site_type.insert(defaults::DEFAULT_SITE_TYPE.to_string());
            filled.push(schema::SITE_TYPE);
        }
        if fields.source_type.is_none() {
            fields.source_type = Some(defaults::DEFAULT_SOURCE_TYPE.to_string());
            filled.push(schema::SOURCE_TYPE);
        }
        if fields.document_purpose.is_none() {
            fields.document_purpose = Some(defaults::DEFAULT_DOCUMENT_PURPOSE.to_string());
            filled.push(schema::DOCUMENT_PURPOSE);
        }
        if fields.language.is_none() {
            fields.language = Some(defaults::DEFAULT_LANGUAGE.to_string());
            filled.push(schema::LANGUAGE);
        }
        if fields.climate_zone.is_empty() {
            fields
                .climate_zone
                .insert(defaults::DEFAULT_CLIMATE_ZONE.to_string());
            filled.push(schema::CLIMATE_ZONE);
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_defaultable_field_on_empty_input() {
        let mut fields = PartialMetadata::new();
        let filled = SmartDefaults::apply(&mut fields);

        assert_eq!(fields.visibility_level, Some(VisibilityLevel::PublicGlobal));
        assert!(fields.owner_org_id.is_none());
        assert!(fields.geo_region.contains(defaults::DEFAULT_GEO_REGION));
        assert!(fields
            .production_stage
            .contains(defaults::DEFAULT_PRODUCTION_STAGE));
        assert!(fields.site_type.contains(defaults::DEFAULT_SITE_TYPE));
        assert_eq!(fields.source_type.as_deref(), Some(defaults::DEFAULT_SOURCE_TYPE));
        assert_eq!(
            fields.document_purpose.as_deref(),
            Some(defaults::DEFAULT_DOCUMENT_PURPOSE)
        );
        assert_eq!(fields.language.as_deref(), Some(defaults::DEFAULT_LANGUAGE));
        assert!(fields.climate_zone.contains(defaults::DEFAULT_CLIMATE_ZONE));
        assert_eq!(filled.len(), 8);
    }

    #[test]
    fn never_overwrites_existing_values() {
        let mut fields = PartialMetadata::new();
        fields.visibility_level = Some(VisibilityLevel::OrgShared);
        fields.owner_org_id = Some("AcmeFarms".to_string());
        fields.language = Some("de".to_string());
        fields.geo_region.insert("europe".to_string());

        let filled = SmartDefaults::apply(&mut fields);

        assert_eq!(fields.visibility_level, Some(VisibilityLevel::OrgShared));
        assert_eq!(fields.language.as_deref(), Some("de"));
        assert_eq!(fields.geo_region.iter().collect::<Vec<_>>(), vec!["europe"]);
        assert!(!filled.contains(&schema::VISIBILITY_LEVEL));
        assert!(!filled.contains(&schema::LANGUAGE));
        assert!(!filled.contains(&schema::GEO_REGION));
    }

    #[test]
    fn category_is_never_defaulted() {
        let mut fields = PartialMetadata::new();
        SmartDefaults::apply(&mut fields);
        assert!(fields.category.is_none());
        assert!(fields.subcategory.is_none());
        assert!(fields.topic.is_none());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut fields = PartialMetadata::new();
        SmartDefaults::apply(&mut fields);
        let snapshot = fields.clone();
        let second = SmartDefaults::apply(&mut fields);
        assert_eq!(fields, snapshot);
        assert!(second.is_empty());
    }
}
