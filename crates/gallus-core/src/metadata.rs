//! Classification metadata model.
//!
//! [`PartialMetadata`] is the accumulator the three classification tiers
//! write into; [`MetadataRecord`] is the immutable, invariant-checked
//! result persisted alongside a content chunk. Set-valued fields use
//! `BTreeSet` and attributes use `BTreeMap` so that equal records always
//! serialize byte-identically (classification is idempotent under a fixed
//! rule table and deterministic model).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::schema;
use crate::taxonomy::Category;

// =============================================================================
// ENUMS
// =============================================================================

/// Security classification of a content chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityLevel {
    /// Visible to every caller, authenticated or not.
    PublicGlobal,
    /// Visible to all members of the owning organization.
    OrgShared,
    /// Visible only to listed subdivisions of the owning organization.
    OrgInternal,
}

impl VisibilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityLevel::PublicGlobal => "public_global",
            VisibilityLevel::OrgShared => "org_shared",
            VisibilityLevel::OrgInternal => "org_internal",
        }
    }
}

impl fmt::Display for VisibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VisibilityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public_global" => Ok(VisibilityLevel::PublicGlobal),
            "org_shared" => Ok(VisibilityLevel::OrgShared),
            "org_internal" => Ok(VisibilityLevel::OrgInternal),
            other => Err(Error::InvalidInput(format!(
                "Unknown visibility level: {:?}",
                other
            ))),
        }
    }
}

/// Which tier combination produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    /// Path rules resolved the record; the LLM tier was not needed.
    PathBased,
    /// The LLM tier resolved the record with no path contribution.
    LlmBased,
    /// Both the path and LLM tiers contributed fields.
    Hybrid,
    /// The default tier carried the record.
    Default,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationMethod::PathBased => "path_based",
            ClassificationMethod::LlmBased => "llm_based",
            ClassificationMethod::Hybrid => "hybrid",
            ClassificationMethod::Default => "default",
        }
    }
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PARTIAL METADATA (tier accumulator)
// =============================================================================

/// Partially-populated metadata, accumulated across classification tiers.
///
/// A field that no tier has resolved is `None` (scalars) or empty (sets).
/// Zero resolved fields is a valid, common state: an unmatched path with
/// the LLM tier disabled produces exactly that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMetadata {
    // Security
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_level: Option<VisibilityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_org_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_org_ids: BTreeSet<String>,

    // Business context
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub species: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genetic_line: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub production_stage: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub site_type: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub climate_zone: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub geo_region: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    // Taxonomy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub technical_tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_purpose: Option<String>,
}

impl PartialMetadata {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named field holds a non-empty value.
    pub fn is_field_set(&self, field: &str) -> bool {
        match field {
            schema::VISIBILITY_LEVEL => self.visibility_level.is_some(),
            schema::OWNER_ORG_ID => self.owner_org_id.is_some(),
            schema::ALLOWED_ORG_IDS => !self.allowed_org_ids.is_empty(),
            schema::SPECIES => !self.species.is_empty(),
            schema::GENETIC_LINE => self.genetic_line.is_some(),
            schema::PRODUCTION_STAGE => !self.production_stage.is_empty(),
            schema::SITE_TYPE => !self.site_type.is_empty(),
            schema::CLIMATE_ZONE => !self.climate_zone.is_empty(),
            schema::GEO_REGION => !self.geo_region.is_empty(),
            schema::SOURCE_TYPE => self.source_type.is_some(),
            schema::LANGUAGE => self.language.is_some(),
            schema::CATEGORY => self.category.is_some(),
            schema::SUBCATEGORY => self.subcategory.is_some(),
            schema::TOPIC => self.topic.is_some(),
            schema::ATTRIBUTES => !self.attributes.is_empty(),
            schema::TECHNICAL_TAGS => !self.technical_tags.is_empty(),
            schema::DOCUMENT_PURPOSE => self.document_purpose.is_some(),
            _ => false,
        }
    }

    /// Number of resolved fields.
    pub fn field_count(&self) -> usize {
        schema::CLASSIFIABLE_FIELDS
            .iter()
            .filter(|f| self.is_field_set(f))
            .count()
    }

    /// Whether no tier has resolved anything yet.
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Merge `other` into `self`, writing only fields that are still
    /// absent or empty here. This is the inter-tier merge rule: an earlier
    /// tier's value is never overwritten by a later one.
    pub fn merge_missing(&mut self, other: &PartialMetadata) {
        if self.visibility_level.is_none() {
            self.visibility_level = other.visibility_level;
        }
        if self.owner_org_id.is_none() {
            self.owner_org_id = other.owner_org_id.clone();
        }
        if self.allowed_org_ids.is_empty() {
            self.allowed_org_ids = other.allowed_org_ids.clone();
        }
        if self.species.is_empty() {
            self.species = other.species.clone();
        }
        if self.genetic_line.is_none() {
            self.genetic_line = other.genetic_line.clone();
        }
        if self.production_stage.is_empty() {
            self.production_stage = other.production_stage.clone();
        }
        if self.site_type.is_empty() {
            self.site_type = other.site_type.clone();
        }
        if self.climate_zone.is_empty() {
            self.climate_zone = other.climate_zone.clone();
        }
        if self.geo_region.is_empty() {
            self.geo_region = other.geo_region.clone();
        }
        if self.source_type.is_none() {
            self.source_type = other.source_type.clone();
        }
        if self.language.is_none() {
            self.language = other.language.clone();
        }
        if self.category.is_none() {
            self.category = other.category.clone();
        }
        if self.subcategory.is_none() {
            self.subcategory = other.subcategory.clone();
        }
        if self.topic.is_none() {
            self.topic = other.topic.clone();
        }
        if self.attributes.is_empty() {
            self.attributes = other.attributes.clone();
        }
        if self.technical_tags.is_empty() {
            self.technical_tags = other.technical_tags.clone();
        }
        if self.document_purpose.is_none() {
            self.document_purpose = other.document_purpose.clone();
        }
    }

    /// Apply a rule-table field update by schema name.
    ///
    /// Scalars take a JSON string; set fields take a string or an array of
    /// strings; `attributes` takes a JSON object. Unknown field names and
    /// wrong value shapes are errors; rule files are validated with this
    /// at load time, where any failure is fatal.
    pub fn set_field(&mut self, field: &str, value: &JsonValue) -> Result<()> {
        match field {
            schema::VISIBILITY_LEVEL => {
                self.visibility_level = Some(Self::expect_str(field, value)?.parse()?);
            }
            schema::OWNER_ORG_ID => {
                self.owner_org_id = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::ALLOWED_ORG_IDS => self.allowed_org_ids = Self::expect_set(field, value)?,
            schema::SPECIES => self.species = Self::expect_set(field, value)?,
            schema::GENETIC_LINE => {
                self.genetic_line = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::PRODUCTION_STAGE => self.production_stage = Self::expect_set(field, value)?,
            schema::SITE_TYPE => self.site_type = Self::expect_set(field, value)?,
            schema::CLIMATE_ZONE => self.climate_zone = Self::expect_set(field, value)?,
            schema::GEO_REGION => self.geo_region = Self::expect_set(field, value)?,
            schema::SOURCE_TYPE => {
                self.source_type = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::LANGUAGE => {
                self.language = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::CATEGORY => {
                // Validate against the closed set here so a bad rule file
                // fails at load, not at ingestion.
                let raw = Self::expect_str(field, value)?;
                self.category = Some(Category::parse(raw)?.as_str().to_string());
            }
            schema::SUBCATEGORY => {
                self.subcategory = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::TOPIC => {
                self.topic = Some(Self::expect_str(field, value)?.to_string());
            }
            schema::ATTRIBUTES => {
                let obj = value.as_object().ok_or_else(|| {
                    Error::InvalidInput(format!("Field {:?} expects an object", field))
                })?;
                self.attributes = obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            }
            schema::TECHNICAL_TAGS => self.technical_tags = Self::expect_set(field, value)?,
            schema::DOCUMENT_PURPOSE => {
                self.document_purpose = Some(Self::expect_str(field, value)?.to_string());
            }
            other => {
                return Err(Error::InvalidInput(format!(
                    "Unknown metadata field: {:?}",
                    other
                )));
            }
        }
        Ok(())
    }

    fn expect_str<'a>(field: &str, value: &'a JsonValue) -> Result<&'a str> {
        value.as_str().ok_or_else(|| {
            Error::InvalidInput(format!("Field {:?} expects a string value", field))
        })
    }

    fn expect_set(field: &str, value: &JsonValue) -> Result<BTreeSet<String>> {
        match value {
            JsonValue::String(s) => Ok(BTreeSet::from([s.clone()])),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "Field {:?} expects strings in its array",
                            field
                        ))
                    })
                })
                .collect(),
            _ => Err(Error::InvalidInput(format!(
                "Field {:?} expects a string or array of strings",
                field
            ))),
        }
    }
}

// =============================================================================
// METADATA RECORD (immutable output)
// =============================================================================

/// The immutable, versioned classification result attached to one content
/// chunk.
///
/// Constructed only via [`MetadataRecord::from_partial`], which enforces
/// the schema invariants. Re-classification creates a new version through
/// [`MetadataRecord::next_version`] rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    // Security
    pub visibility_level: VisibilityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_org_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_org_ids: BTreeSet<String>,

    // Business context
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub species: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genetic_line: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub production_stage: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub site_type: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub climate_zone: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub geo_region: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    // Taxonomy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub technical_tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_purpose: Option<String>,

    // Provenance
    pub classification_method: ClassificationMethod,
    pub classification_confidence: f32,
    pub source_file: String,
    pub chunk_id: Uuid,
    pub record_version: u32,
}

impl MetadataRecord {
    /// Finalize a fully-merged accumulator into an immutable record,
    /// enforcing the schema invariants:
    ///
    /// - `owner_org_id` must be present unless visibility is `public_global`
    /// - `allowed_org_ids` must be empty unless visibility is
    ///   `org_internal`, and non-empty when it is
    /// - `category`, when present, must belong to the closed taxonomy
    /// - `classification_confidence` must lie in `[0.0, 1.0]`
    ///
    /// A violation is a fatal classification error for this chunk and is
    /// surfaced as [`Error::Invariant`] and never silently patched, since it
    /// indicates a rule-table bug with security implications.
    pub fn from_partial(
        fields: PartialMetadata,
        method: ClassificationMethod,
        confidence: f32,
        source_file: impl Into<String>,
        chunk_id: Uuid,
        record_version: u32,
    ) -> Result<Self> {
        let visibility = fields
            .visibility_level
            .ok_or_else(|| Error::Invariant("visibility_level unresolved".to_string()))?;

        if visibility != VisibilityLevel::PublicGlobal && fields.owner_org_id.is_none() {
            return Err(Error::Invariant(format!(
                "visibility {} requires owner_org_id",
                visibility
            )));
        }
        match visibility {
            VisibilityLevel::OrgInternal => {
                if fields.allowed_org_ids.is_empty() {
                    return Err(Error::Invariant(
                        "org_internal requires non-empty allowed_org_ids".to_string(),
                    ));
                }
            }
            _ => {
                if !fields.allowed_org_ids.is_empty() {
                    return Err(Error::Invariant(format!(
                        "allowed_org_ids must be empty for visibility {}",
                        visibility
                    )));
                }
            }
        }

        let category = fields
            .category
            .as_deref()
            .map(Category::parse)
            .transpose()
            .map_err(|e| Error::Invariant(e.to_string()))?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::Invariant(format!(
                "classification_confidence {} outside [0.0, 1.0]",
                confidence
            )));
        }

        Ok(Self {
            visibility_level: visibility,
            owner_org_id: fields.owner_org_id,
            allowed_org_ids: fields.allowed_org_ids,
            species: fields.species,
            genetic_line: fields.genetic_line,
            production_stage: fields.production_stage,
            site_type: fields.site_type,
            climate_zone: fields.climate_zone,
            geo_region: fields.geo_region,
            source_type: fields.source_type,
            language: fields.language,
            category,
            subcategory: fields.subcategory,
            topic: fields.topic,
            attributes: fields.attributes,
            technical_tags: fields.technical_tags,
            document_purpose: fields.document_purpose,
            classification_method: method,
            classification_confidence: confidence,
            source_file: source_file.into(),
            chunk_id,
            record_version,
        })
    }

    /// Version number for a reclassification of the same chunk.
    pub fn next_version(&self) -> u32 {
        self.record_version + 1
    }

    // -------------------------------------------------------------------------
    // Field access for predicate evaluation
    // -------------------------------------------------------------------------

    /// Text-valued field by schema name, if present.
    pub fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            schema::VISIBILITY_LEVEL => Some(self.visibility_level.as_str()),
            schema::OWNER_ORG_ID => self.owner_org_id.as_deref(),
            schema::GENETIC_LINE => self.genetic_line.as_deref(),
            schema::SOURCE_TYPE => self.source_type.as_deref(),
            schema::LANGUAGE => self.language.as_deref(),
            schema::CATEGORY => self.category.map(|c| c.as_str()),
            schema::SUBCATEGORY => self.subcategory.as_deref(),
            schema::TOPIC => self.topic.as_deref(),
            schema::DOCUMENT_PURPOSE => self.document_purpose.as_deref(),
            schema::CLASSIFICATION_METHOD => Some(self.classification_method.as_str()),
            schema::SOURCE_FILE => Some(&self.source_file),
            _ => None,
        }
    }

    /// Set-valued field by schema name, if that field is set-valued.
    pub fn set_field_values(&self, field: &str) -> Option<&BTreeSet<String>> {
        match field {
            schema::ALLOWED_ORG_IDS => Some(&self.allowed_org_ids),
            schema::SPECIES => Some(&self.species),
            schema::PRODUCTION_STAGE => Some(&self.production_stage),
            schema::SITE_TYPE => Some(&self.site_type),
            schema::CLIMATE_ZONE => Some(&self.climate_zone),
            schema::GEO_REGION => Some(&self.geo_region),
            schema::TECHNICAL_TAGS => Some(&self.technical_tags),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
