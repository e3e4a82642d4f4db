//! Script update engine
//!
//! Folds a [`ScriptChangeEvent`] into a [`ScenarioDocument`]. The input
//! document is never mutated; callers get a fresh document back together
//! with whether a script matched.

use crate::document::{ScenarioDocument, ScriptChangeEvent};

/// Result of applying a change to a document
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Document after the change (a copy of the input when nothing matched)
    pub document: ScenarioDocument,
    /// Whether a script with the change's identifier exists
    pub found: bool,
    /// Whether any field value was actually added or replaced
    pub changed: bool,
}

/// Apply a script change to a document
///
/// Scans scripts in order and merges the change's fields into the first
/// script whose identifier equals `change.script_id`. Later duplicates are
/// not touched.
///
/// # Arguments
/// * `document` - Current scenario state
/// * `change` - Change to apply
///
/// # Returns
/// The updated document; `found == false` leaves it equal to the input
#[must_use]
pub fn apply_change(document: &ScenarioDocument, change: &ScriptChangeEvent) -> ApplyOutcome {
    let mut updated = document.clone();

    let Some(entry) = updated
        .scripts
        .iter_mut()
        .find(|entry| entry.script_id == change.script_id)
    else {
        return ApplyOutcome {
            document: updated,
            found: false,
            changed: false,
        };
    };

    let changed = entry.merge_fields(&change.fields);

    ApplyOutcome {
        document: updated,
        found: true,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Fields, ScriptEntry};
    use proptest::prelude::*;
    use serde_yaml::Value;

    fn sample_document() -> ScenarioDocument {
        ScenarioDocument::new(vec![
            ScriptEntry::new("s1").with_field("title", "old"),
            ScriptEntry::new("s2")
                .with_field("title", "second")
                .with_field("duration", 12),
        ])
    }

    #[test]
    fn change_without_fields_leaves_document_unchanged() {
        let doc = sample_document();
        let change: ScriptChangeEvent = serde_json::from_str(r#"{"script_id":"s1"}"#).unwrap();

        let outcome = apply_change(&doc, &change);

        assert!(outcome.found);
        assert!(!outcome.changed);
        assert_eq!(outcome.document, doc);
        assert_eq!(
            outcome.document.find("s1").unwrap().field("title"),
            Some(&Value::from("old"))
        );
    }

    #[test]
    fn matching_change_merges_fields() {
        let doc = sample_document();
        let change = ScriptChangeEvent::new("s2")
            .with_field("title", "renamed")
            .with_field("loop", true);

        let outcome = apply_change(&doc, &change);

        assert!(outcome.found);
        assert!(outcome.changed);
        let s2 = outcome.document.find("s2").unwrap();
        assert_eq!(s2.field("title"), Some(&Value::from("renamed")));
        assert_eq!(s2.field("duration"), Some(&Value::from(12)));
        assert_eq!(s2.field("loop"), Some(&Value::from(true)));
        // untouched neighbour
        assert_eq!(outcome.document.scripts[0], doc.scripts[0]);
        // input not mutated
        assert_eq!(doc.find("s2").unwrap().field("title"), Some(&Value::from("second")));
    }

    #[test]
    fn unknown_script_is_not_found() {
        let doc = sample_document();
        let change = ScriptChangeEvent::new("missing").with_field("title", "x");

        let outcome = apply_change(&doc, &change);

        assert!(!outcome.found);
        assert!(!outcome.changed);
        assert_eq!(outcome.document, doc);
    }

    #[test]
    fn only_first_duplicate_is_updated() {
        let doc = ScenarioDocument::new(vec![
            ScriptEntry::new("dup").with_field("n", 1),
            ScriptEntry::new("dup").with_field("n", 2),
        ]);
        let change = ScriptChangeEvent::new("dup").with_field("n", 9);

        let outcome = apply_change(&doc, &change);

        assert_eq!(outcome.document.scripts[0].field("n"), Some(&Value::from(9)));
        assert_eq!(outcome.document.scripts[1].field("n"), Some(&Value::from(2)));
    }

    #[test]
    fn null_value_is_stored_not_removed() {
        let doc = sample_document();
        let change = ScriptChangeEvent::new("s1").with_field("title", Value::Null);

        let outcome = apply_change(&doc, &change);

        assert_eq!(outcome.document.find("s1").unwrap().field("title"), Some(&Value::Null));
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,8}".prop_map(Value::from),
        ]
    }

    fn fields_strategy() -> impl Strategy<Value = Fields> {
        prop::collection::vec(("[a-z]{1,6}", value_strategy()), 0..5)
            .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
    }

    fn document_strategy() -> impl Strategy<Value = ScenarioDocument> {
        prop::collection::vec(fields_strategy(), 1..6).prop_map(|all| {
            ScenarioDocument::new(
                all.into_iter()
                    .enumerate()
                    .map(|(i, fields)| ScriptEntry {
                        script_id: format!("script-{i}"),
                        fields,
                    })
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn matched_entry_gets_union_and_others_stay(
            doc in document_strategy(),
            fields in fields_strategy(),
            pick in any::<prop::sample::Index>(),
        ) {
            let idx = pick.index(doc.len());
            let target = doc.scripts[idx].script_id.clone();
            let change = ScriptChangeEvent { script_id: target, fields: fields.clone() };

            let outcome = apply_change(&doc, &change);

            prop_assert!(outcome.found);
            for (i, entry) in outcome.document.scripts.iter().enumerate() {
                if i == idx {
                    for (k, v) in &fields {
                        prop_assert_eq!(entry.fields.get(k), Some(v));
                    }
                    for (k, v) in &doc.scripts[idx].fields {
                        if !fields.contains_key(k) {
                            prop_assert_eq!(entry.fields.get(k), Some(v));
                        }
                    }
                } else {
                    prop_assert_eq!(entry, &doc.scripts[i]);
                }
            }
        }

        #[test]
        fn unmatched_change_is_identity(doc in document_strategy(), fields in fields_strategy()) {
            let change = ScriptChangeEvent { script_id: "no-such-script".into(), fields };
            let outcome = apply_change(&doc, &change);
            prop_assert!(!outcome.found);
            prop_assert_eq!(outcome.document, doc);
        }

        #[test]
        fn applying_twice_is_idempotent(doc in document_strategy(), fields in fields_strategy()) {
            let change = ScriptChangeEvent { script_id: "script-0".into(), fields };
            let once = apply_change(&doc, &change);
            let twice = apply_change(&once.document, &change);
            prop_assert!(!twice.changed);
            prop_assert_eq!(once.document, twice.document);
        }
    }
}
