//! Property tests over generated templates.
//!
//! Templates are kept small (a handful of placeholders with a few candidates
//! each) so full enumeration stays cheap.

use std::collections::HashSet;

use candidate_templates::{
    bind, count_realizations, realize_template, CandidateSet, Node, Record,
};
use proptest::prelude::*;

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::from),
        (-50i64..50).prop_map(Node::from),
        "[a-z]{1,4}".prop_map(Node::from),
    ]
}

/// Candidate sets with pairwise distinct members.
fn arb_candidates() -> impl Strategy<Value = Node> {
    prop::collection::btree_set(-50i64..50, 1..4).prop_map(|members| {
        Node::from(CandidateSet::new(members).expect("btree_set is non-empty"))
    })
}

fn arb_template() -> impl Strategy<Value = Node> {
    arb_tree().prop_filter("enumeration too large", |template| {
        count_realizations(template).is_ok_and(|count| count <= 512)
    })
}

fn arb_tree() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![3 => arb_leaf(), 1 => arb_candidates()];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::List),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Node::Tuple),
            prop::collection::vec(("[a-z]{1,3}", inner.clone()), 0..4)
                .prop_map(|entries| Node::map(entries)),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4).prop_map(|fields| {
                fields
                    .into_iter()
                    .fold(Record::new("Generated"), |record, (name, value)| {
                        record.with_field(name, value)
                    })
                    .into()
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn count_matches_enumerated_length(template in arb_template()) {
        let count = count_realizations(&template).unwrap();
        let produced = realize_template(&template).count() as u128;
        prop_assert_eq!(count, produced);
    }

    #[test]
    fn every_specification_covers_every_binding(template in arb_template()) {
        let bindings = bind(&template);
        for realization in realize_template(&template) {
            prop_assert_eq!(realization.specification.len(), bindings.len());
            for binding in &bindings {
                let key = binding.path.to_string();
                let chosen = &realization.specification[&key];
                prop_assert!(binding.candidates.iter().any(|c| c == chosen));
                prop_assert_eq!(realization.realization.get(&binding.path), Some(chosen));
            }
        }
    }

    #[test]
    fn specifications_are_pairwise_distinct(template in arb_template()) {
        let mut seen = HashSet::new();
        for realization in realize_template(&template) {
            let key = serde_json::to_string(&realization.specification).unwrap();
            prop_assert!(seen.insert(key), "specification produced twice");
        }
    }

    #[test]
    fn enumeration_is_repeatable(template in arb_template()) {
        let first: Vec<_> = realize_template(&template).collect();
        let second: Vec<_> = realize_template(&template).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn template_survives_enumeration(template in arb_template()) {
        let before = template.clone();
        for mut realization in realize_template(&template) {
            realization.realization = Node::Null;
        }
        prop_assert_eq!(template, before);
    }
}
