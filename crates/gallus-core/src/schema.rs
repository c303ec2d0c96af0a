//! Filterable-property field names shared with the vector store.
//!
//! Predicates, rule tables, and the vector-store driver all reference
//! metadata fields by these names. They must match the property names
//! declared in the store's schema exactly.

// ─── Security fields ───────────────────────────────────────────────────────

pub const VISIBILITY_LEVEL: &str = "visibility_level";
pub const OWNER_ORG_ID: &str = "owner_org_id";
pub const ALLOWED_ORG_IDS: &str = "allowed_org_ids";

// ─── Business context fields ───────────────────────────────────────────────

pub const SPECIES: &str = "species";
pub const GENETIC_LINE: &str = "genetic_line";
pub const PRODUCTION_STAGE: &str = "production_stage";
pub const SITE_TYPE: &str = "site_type";
pub const CLIMATE_ZONE: &str = "climate_zone";
pub const GEO_REGION: &str = "geo_region";
pub const SOURCE_TYPE: &str = "source_type";
pub const LANGUAGE: &str = "language";

// ─── Taxonomy fields ───────────────────────────────────────────────────────

pub const CATEGORY: &str = "category";
pub const SUBCATEGORY: &str = "subcategory";
pub const TOPIC: &str = "topic";
pub const ATTRIBUTES: &str = "attributes";
pub const TECHNICAL_TAGS: &str = "technical_tags";
pub const DOCUMENT_PURPOSE: &str = "document_purpose";

// ─── Provenance fields ─────────────────────────────────────────────────────

pub const CLASSIFICATION_METHOD: &str = "classification_method";
pub const CLASSIFICATION_CONFIDENCE: &str = "classification_confidence";
pub const SOURCE_FILE: &str = "source_file";
pub const CHUNK_ID: &str = "chunk_id";
pub const RECORD_VERSION: &str = "record_version";

/// Every classifier-settable field name, in schema order.
///
/// Rule tables are validated against this list at load time; an unknown
/// field name in a rule file is a configuration error.
pub const CLASSIFIABLE_FIELDS: &[&str] = &[
    VISIBILITY_LEVEL,
    OWNER_ORG_ID,
    ALLOWED_ORG_IDS,
    SPECIES,
    GENETIC_LINE,
    PRODUCTION_STAGE,
    SITE_TYPE,
    CLIMATE_ZONE,
    GEO_REGION,
    SOURCE_TYPE,
    LANGUAGE,
    CATEGORY,
    SUBCATEGORY,
    TOPIC,
    ATTRIBUTES,
    TECHNICAL_TAGS,
    DOCUMENT_PURPOSE,
];
