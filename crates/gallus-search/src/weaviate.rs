//! Weaviate `where`-filter rendering.
//!
//! The driver seam between the abstract predicate and the vector store:
//! a pure function producing the operator tree Weaviate's GraphQL `where`
//! argument expects. Field names pass through unchanged; the metadata
//! schema constants match the collection's filterable properties.

use serde_json::{json, Value as JsonValue};

use gallus_core::Predicate;

/// Render a predicate as a Weaviate `where` filter object.
pub fn to_where_filter(predicate: &Predicate) -> JsonValue {
    match predicate {
        Predicate::And { operands } => json!({
            "operator": "And",
            "operands": operands.iter().map(to_where_filter).collect::<Vec<_>>(),
        }),
        Predicate::Or { operands } => json!({
            "operator": "Or",
            "operands": operands.iter().map(to_where_filter).collect::<Vec<_>>(),
        }),
        Predicate::Eq { field, value } => json!({
            "operator": "Equal",
            "path": [field],
            "valueText": value,
        }),
        Predicate::ContainsAny { field, values } => json!({
            "operator": "ContainsAny",
            "path": [field],
            "valueTextArray": values,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallus_core::schema;

    #[test]
    fn renders_equality_leaf() {
        let filter = to_where_filter(&Predicate::eq(schema::VISIBILITY_LEVEL, "public_global"));
        assert_eq!(
            filter,
            json!({
                "operator": "Equal",
                "path": ["visibility_level"],
                "valueText": "public_global",
            })
        );
    }

    #[test]
    fn renders_contains_any_leaf() {
        let filter = to_where_filter(&Predicate::contains_any(
            schema::ALLOWED_ORG_IDS,
            ["AcmeFarms_North"],
        ));
        assert_eq!(
            filter,
            json!({
                "operator": "ContainsAny",
                "path": ["allowed_org_ids"],
                "valueTextArray": ["AcmeFarms_North"],
            })
        );
    }

    #[test]
    fn renders_nested_operator_tree() {
        let predicate = Predicate::and(vec![
            Predicate::or(vec![
                Predicate::eq(schema::VISIBILITY_LEVEL, "public_global"),
                Predicate::eq(schema::OWNER_ORG_ID, "AcmeFarms"),
            ]),
            Predicate::contains_any(schema::SPECIES, ["broiler"]),
        ]);

        let filter = to_where_filter(&predicate);
        assert_eq!(filter["operator"], "And");
        assert_eq!(filter["operands"][0]["operator"], "Or");
        assert_eq!(filter["operands"][0]["operands"][1]["valueText"], "AcmeFarms");
        assert_eq!(filter["operands"][1]["operator"], "ContainsAny");
    }
}
