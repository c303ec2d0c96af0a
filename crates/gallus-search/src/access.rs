//! Query-time access filter construction.
//!
//! Translates a caller's organizational identity plus optional taxonomy
//! constraints into the boolean predicate that scopes every retrieval
//! query. The security clause is built unconditionally; the retrieval
//! layer appends it to every query, and callers cannot opt out.
//!
//! The single most important property of this module: an unauthenticated
//! or unknown caller can only ever match `public_global` records, and an
//! organization caller without a subdivision never matches `org_internal`
//! records (subdivision scoping is strict).

use serde::{Deserialize, Serialize};
use tracing::debug;

use gallus_core::{schema, Predicate, VisibilityLevel};

use crate::constraints::TaxonomyConstraints;

/// Organizational identity of a query caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Tenant organization ID.
    pub org_id: String,
    /// Subdivision (site) within the organization, when the caller's
    /// session is site-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl CallerIdentity {
    /// Identity scoped to a whole organization.
    pub fn org(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            site: None,
        }
    }

    /// Narrow the identity to a site subdivision.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// The `<org>_<site>` form matched against `allowed_org_ids`, present
    /// only for site-scoped identities.
    pub fn scoped_id(&self) -> Option<String> {
        self.site
            .as_ref()
            .map(|site| format!("{}_{}", self.org_id, site))
    }
}

/// Build the retrieval predicate for a caller.
///
/// The security clause is the OR of:
/// 1. record is `public_global`;
/// 2. record is `org_shared` and owned by the caller's organization;
/// 3. record is `org_internal`, owned by the caller's organization, and
///    the caller's site-scoped ID is in the record's allowed set.
///
/// Disjuncts 2 and 3 exist only for a known caller, and 3 only for a
/// site-scoped one; with `caller == None` the predicate reduces to the
/// public disjunct alone. An unrecognized org ID needs no special case,
/// it simply owns no records. Taxonomy constraints are ANDed on top.
pub fn build_filter(
    caller: Option<&CallerIdentity>,
    constraints: &TaxonomyConstraints,
) -> Predicate {
    let security = security_clause(caller);

    let mut clauses = vec![security];
    clauses.extend(taxonomy_clauses(constraints));

    let predicate = if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Predicate::and(clauses)
    };

    debug!(
        caller_org = caller.map(|c| c.org_id.as_str()).unwrap_or("-"),
        site_scoped = caller.map(|c| c.site.is_some()).unwrap_or(false),
        leaf_count = predicate.leaf_count(),
        "Built access filter"
    );
    predicate
}

fn security_clause(caller: Option<&CallerIdentity>) -> Predicate {
    let mut disjuncts = vec![Predicate::eq(
        schema::VISIBILITY_LEVEL,
        VisibilityLevel::PublicGlobal.as_str(),
    )];

    if let Some(caller) = caller {
        disjuncts.push(Predicate::and(vec![
            Predicate::eq(schema::VISIBILITY_LEVEL, VisibilityLevel::OrgShared.as_str()),
            Predicate::eq(schema::OWNER_ORG_ID, caller.org_id.as_str()),
        ]));

        if let Some(scoped) = caller.scoped_id() {
            disjuncts.push(Predicate::and(vec![
                Predicate::eq(
                    schema::VISIBILITY_LEVEL,
                    VisibilityLevel::OrgInternal.as_str(),
                ),
                Predicate::eq(schema::OWNER_ORG_ID, caller.org_id.as_str()),
                Predicate::contains_any(schema::ALLOWED_ORG_IDS, [scoped]),
            ]));
        }
    }

    Predicate::or(disjuncts)
}

fn taxonomy_clauses(constraints: &TaxonomyConstraints) -> Vec<Predicate> {
    let mut clauses = Vec::new();

    if let Some(category) = constraints.category {
        clauses.push(Predicate::eq(schema::CATEGORY, category.as_str()));
    }
    if let Some(subcategory) = &constraints.subcategory {
        clauses.push(Predicate::eq(schema::SUBCATEGORY, subcategory.as_str()));
    }
    if let Some(topic) = &constraints.topic {
        clauses.push(Predicate::eq(schema::TOPIC, topic.as_str()));
    }
    if !constraints.species.is_empty() {
        clauses.push(Predicate::contains_any(
            schema::SPECIES,
            constraints.species.iter().cloned(),
        ));
    }
    if let Some(line) = &constraints.genetic_line {
        clauses.push(Predicate::eq(schema::GENETIC_LINE, line.as_str()));
    }
    if !constraints.production_stage.is_empty() {
        clauses.push(Predicate::contains_any(
            schema::PRODUCTION_STAGE,
            constraints.production_stage.iter().cloned(),
        ));
    }
    if !constraints.site_type.is_empty() {
        clauses.push(Predicate::contains_any(
            schema::SITE_TYPE,
            constraints.site_type.iter().cloned(),
        ));
    }
    if !constraints.geo_region.is_empty() {
        clauses.push(Predicate::contains_any(
            schema::GEO_REGION,
            constraints.geo_region.iter().cloned(),
        ));
    }
    if let Some(source_type) = &constraints.source_type {
        clauses.push(Predicate::eq(schema::SOURCE_TYPE, source_type.as_str()));
    }
    if let Some(language) = &constraints.language {
        clauses.push(Predicate::eq(schema::LANGUAGE, language.as_str()));
    }
    if !constraints.technical_tags.is_empty() {
        clauses.push(Predicate::contains_any(
            schema::TECHNICAL_TAGS,
            constraints.technical_tags.iter().cloned(),
        ));
    }

    clauses
}
