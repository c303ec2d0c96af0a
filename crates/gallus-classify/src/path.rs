//! Deterministic path-based classification (tier 1).
//!
//! Matches a document's file path against the rule table and extracts
//! tenant, visibility, and genetic-line fields structurally. Every field
//! this tier sets is fully trusted (per-field confidence 1.0); fields no
//! rule matched are left absent; defaulting is tier 3's job.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use gallus_core::{defaults, title_case, PartialMetadata, VisibilityLevel};

use crate::rules::RuleTable;

/// Path classifier over an immutable rule table.
///
/// Cheap to clone; safe to share across workers.
#[derive(Clone)]
pub struct PathClassifier {
    table: Arc<RuleTable>,
}

impl PathClassifier {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    /// The rule table this classifier matches against.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Classify a file path into partial metadata.
    ///
    /// The path need not resolve to a real filesystem entry; no I/O is
    /// performed. Zero matches returns an empty accumulator, which is a
    /// valid and common result, never an error.
    pub fn classify_path(&self, file_path: &str) -> PartialMetadata {
        let unified = file_path.replace('\\', "/");
        let normalized = unified.to_lowercase();

        let mut fields = PartialMetadata::new();

        // Rule scan in declaration order; later matches overwrite earlier
        // ones field-by-field.
        let mut match_count = 0usize;
        for rule in self.table.rules() {
            if rule.matches(&normalized) {
                trace!(pattern = rule.pattern(), "Rule matched path");
                match_count += 1;
                if let Err(e) = rule.apply(&mut fields) {
                    // Unreachable on a table that passed load validation.
                    warn!(pattern = rule.pattern(), error = %e, "Skipping unapplicable rule");
                }
            }
        }

        // Structural extractions run last: an explicit tenant segment is
        // strictly more specific than any substring rule, so it overrides
        // rule-supplied security fields.
        self.extract_tenant(&unified, &mut fields);
        self.extract_genetic_line(&unified, &mut fields);

        debug!(
            source_file = file_path,
            rule_matches = match_count,
            field_count = fields.field_count(),
            "Path classification complete"
        );
        fields
    }

    /// `tenant_<ID>` segment ⇒ owner + visibility; a later `site_<SUB>`
    /// segment narrows visibility to that subdivision. IDs keep their
    /// original casing; only the prefixes match case-insensitively.
    fn extract_tenant(&self, unified: &str, fields: &mut PartialMetadata) {
        let segments: Vec<&str> = unified.split('/').filter(|s| !s.is_empty()).collect();

        let tenant_pos = segments.iter().position(|seg| {
            has_prefix_ci(seg, defaults::TENANT_SEGMENT_PREFIX)
        });
        let Some(pos) = tenant_pos else { return };
        let org_id = &segments[pos][defaults::TENANT_SEGMENT_PREFIX.len()..];

        let subdivision = segments[pos + 1..]
            .iter()
            .find(|seg| has_prefix_ci(seg, defaults::SITE_SEGMENT_PREFIX))
            .map(|seg| &seg[defaults::SITE_SEGMENT_PREFIX.len()..]);

        fields.owner_org_id = Some(org_id.to_string());
        match subdivision {
            Some(sub) => {
                fields.visibility_level = Some(VisibilityLevel::OrgInternal);
                fields.allowed_org_ids = [format!("{}_{}", org_id, sub)].into();
            }
            None => {
                fields.visibility_level = Some(VisibilityLevel::OrgShared);
                fields.allowed_org_ids.clear();
            }
        }
    }

    /// A path segment matching a known genetic line sets the open-vocabulary
    /// `genetic_line` field, title-cased. Deeper segments win.
    fn extract_genetic_line(&self, unified: &str, fields: &mut PartialMetadata) {
        for segment in unified.split('/').filter(|s| !s.is_empty()) {
            if self.table.is_genetic_line(&segment.to_lowercase()) {
                fields.genetic_line = Some(title_case(segment));
            }
        }
    }
}

/// Whether `segment` starts with `prefix` (case-insensitive) and carries a
/// non-empty remainder.
fn has_prefix_ci(segment: &str, prefix: &str) -> bool {
    segment.len() > prefix.len()
        && segment
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
