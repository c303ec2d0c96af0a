//! Per-tenant classification rule tables.
//!
//! A rule table is a declarative, versioned, human-editable YAML file
//! mapping path-substring patterns to partial metadata updates:
//!
//! ```yaml
//! version: 3
//! org: acme
//! genetic_lines: [redbro]
//! rules:
//!   - pattern: /public/
//!     set:
//!       visibility_level: public_global
//!   - pattern: /health/
//!     set:
//!       category: Animal_Health
//! ```
//!
//! Tables are read-only after load and safe to share across workers
//! without synchronization; there is no module-level singleton. Reload is
//! a swap of the `Arc<RuleTable>` handle: construct a new table from the
//! edited file and hand it to new classifier instances.
//!
//! Loading is strict: an empty pattern, an unknown field name, or a value
//! outside a closed set (visibility, category) fails the load with
//! [`Error::Config`]. A service must not run with a broken or
//! partially-loaded rule table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

use gallus_core::{defaults, Error, PartialMetadata, Result};

/// Built-in genetic lines, lowercased once.
static BUILTIN_GENETIC_LINES: Lazy<BTreeSet<String>> = Lazy::new(|| {
    defaults::GENETIC_LINES
        .iter()
        .map(|l| l.to_string())
        .collect()
});

/// One ordered (pattern → field updates) mapping.
///
/// Patterns are case-insensitive substrings of the normalized file path.
/// When several rules match one path, later rules override earlier ones
/// field-by-field, so specific, deeper rules belong after general ones.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// Lowercased substring pattern.
    pattern: String,
    /// Validated field updates, applied in key order.
    updates: BTreeMap<String, JsonValue>,
}

impl ClassificationRule {
    /// The lowercased pattern this rule matches on.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this rule matches an already-normalized (lowercased,
    /// forward-slash) path.
    pub fn matches(&self, normalized_path: &str) -> bool {
        normalized_path.contains(&self.pattern)
    }

    /// Apply this rule's updates to an accumulator.
    ///
    /// Updates were validated at load time, so application cannot fail on
    /// a table that loaded successfully.
    pub fn apply(&self, fields: &mut PartialMetadata) -> Result<()> {
        for (field, value) in &self.updates {
            fields.set_field(field, value)?;
        }
        Ok(())
    }
}

/// On-disk rule file shape.
#[derive(Debug, Deserialize)]
struct RuleFile {
    version: u32,
    #[serde(default)]
    org: Option<String>,
    /// Additional known genetic lines beyond the built-in list.
    #[serde(default)]
    genetic_lines: Vec<String>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    pattern: String,
    #[serde(default)]
    set: BTreeMap<String, serde_yaml::Value>,
}

/// Immutable, organization-scoped rule table.
#[derive(Debug)]
pub struct RuleTable {
    version: u32,
    org: Option<String>,
    rules: Vec<ClassificationRule>,
    /// Lowercased known genetic lines (built-ins plus file additions).
    genetic_lines: BTreeSet<String>,
}

impl RuleTable {
    /// An empty table with only the built-in genetic lines. Valid: a path
    /// matching zero rules is a common classification result.
    pub fn empty() -> Self {
        Self {
            version: 0,
            org: None,
            rules: Vec::new(),
            genetic_lines: BUILTIN_GENETIC_LINES.clone(),
        }
    }

    /// Parse and validate a rule table from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: RuleFile = serde_yaml::from_str(yaml)?;

        let mut rules = Vec::with_capacity(file.rules.len());
        for (index, raw) in file.rules.into_iter().enumerate() {
            rules.push(validate_rule(index, raw)?);
        }

        let mut genetic_lines = BUILTIN_GENETIC_LINES.clone();
        genetic_lines.extend(file.genetic_lines.iter().map(|l| l.to_lowercase()));

        info!(
            version = file.version,
            org = file.org.as_deref().unwrap_or("-"),
            rule_count = rules.len(),
            "Loaded classification rule table"
        );

        Ok(Self {
            version: file.version,
            org: file.org,
            rules,
            genetic_lines,
        })
    }

    /// Load a rule table from a YAML file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|e| {
            Error::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Table version from the rule file.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Owning organization, if the table is tenant-scoped.
    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a lowercased token is a known genetic line.
    pub fn is_genetic_line(&self, token: &str) -> bool {
        self.genetic_lines.contains(token)
    }
}

/// Validate one raw rule into its immutable form.
///
/// Validation applies every update to a scratch accumulator so field
/// names, value shapes, and closed-set values fail here rather than at
/// ingestion time.
fn validate_rule(index: usize, raw: RawRule) -> Result<ClassificationRule> {
    if raw.pattern.trim().is_empty() {
        return Err(Error::Config(format!("Rule {}: empty pattern", index)));
    }
    if raw.set.is_empty() {
        return Err(Error::Config(format!(
            "Rule {} ({:?}): no field updates",
            index, raw.pattern
        )));
    }

    let mut updates = BTreeMap::new();
    let mut scratch = PartialMetadata::new();
    for (field, value) in raw.set {
        let json = serde_json::to_value(&value)
            .map_err(|e| Error::Config(format!("Rule {} ({:?}): {}", index, raw.pattern, e)))?;
        scratch.set_field(&field, &json).map_err(|e| {
            Error::Config(format!("Rule {} ({:?}): {}", index, raw.pattern, e))
        })?;
        updates.insert(field, json);
    }

    Ok(ClassificationRule {
        pattern: raw.pattern.to_lowercase(),
        updates,
    })
}
