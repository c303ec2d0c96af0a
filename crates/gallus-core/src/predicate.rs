//! Abstract boolean filter predicates for metadata-scoped retrieval.
//!
//! A [`Predicate`] is a composable AND/OR/equality/contains-any tree built
//! by the query layer and translated by the vector-store driver into its
//! native filter syntax. It deliberately is *not* a query string: the tree
//! can be inspected, tested, and evaluated in memory.

use serde::{Deserialize, Serialize};

use crate::metadata::MetadataRecord;

/// Abstract boolean filter expression over metadata fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// All children must match. Empty AND matches everything.
    And { operands: Vec<Predicate> },
    /// At least one child must match. Empty OR matches nothing.
    Or { operands: Vec<Predicate> },
    /// Text field equals the value exactly.
    Eq { field: String, value: String },
    /// Set field contains at least one of the values.
    ContainsAny { field: String, values: Vec<String> },
}

impl Predicate {
    /// Conjunction of operands.
    pub fn and(operands: Vec<Predicate>) -> Self {
        Predicate::And { operands }
    }

    /// Disjunction of operands.
    pub fn or(operands: Vec<Predicate>) -> Self {
        Predicate::Or { operands }
    }

    /// Text-field equality.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Set-field membership: matches when the record's set shares at least
    /// one value with `values`.
    pub fn contains_any(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Predicate::ContainsAny {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate this predicate against a record in memory.
    ///
    /// Field names resolve through the record's schema accessors; a field
    /// the record does not carry never matches. This is the reference
    /// semantics the vector-store translation must preserve.
    pub fn matches(&self, record: &MetadataRecord) -> bool {
        match self {
            Predicate::And { operands } => operands.iter().all(|p| p.matches(record)),
            Predicate::Or { operands } => operands.iter().any(|p| p.matches(record)),
            Predicate::Eq { field, value } => record.text_field(field) == Some(value.as_str()),
            Predicate::ContainsAny { field, values } => record
                .set_field_values(field)
                .map(|set| values.iter().any(|v| set.contains(v)))
                .unwrap_or(false),
        }
    }

    /// Number of leaf conditions in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::And { operands } | Predicate::Or { operands } => {
                operands.iter().map(Predicate::leaf_count).sum()
            }
            _ => 1,
        }
    }
}
