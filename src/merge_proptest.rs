//! Property-based tests for ordering and merging.
//!
//! These check the laws the evaluation pipeline relies on for reproducible
//! output: total ordering of sort keys, pure concatenation for plain targets,
//! left-fold structured merging, and stable JSON rendering.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use serde_json::{json, Value as JsonValue};

    use crate::merge::json::JsonCodec;
    use crate::merge::nested::nested_merge;
    use crate::merge::value::{Mapping, Value};
    use crate::merge::{merge, Codec, Format};
    use crate::ordering::{OrderMode, SortKey};
    use crate::resolve::ensure_trailing_newline;

    fn leaf() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            (0i64..4).prop_map(|n| json!(n)),
            "[a-c]{1,2}".prop_map(|s| json!(s)),
            prop::collection::btree_set(0i64..4, 0..4)
                .prop_map(|set| json!(set.into_iter().collect::<Vec<_>>())),
        ]
    }

    fn node() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            3 => leaf(),
            1 => prop::collection::btree_map("[x-z]", leaf(), 0..3)
                .prop_map(|m| serde_json::to_value(m).unwrap_or(JsonValue::Null)),
        ]
    }

    fn document() -> impl Strategy<Value = String> {
        prop::collection::btree_map("[a-d]", node(), 0..4)
            .prop_map(|m: BTreeMap<String, JsonValue>| serde_json::to_string(&m).unwrap())
    }

    fn parse(doc: &str) -> Mapping {
        match JsonCodec::COMPACT.parse(doc).unwrap() {
            Value::Mapping(map) => map,
            other => panic!("expected mapping, got {}", other.type_name()),
        }
    }

    fn render(map: Mapping) -> Vec<u8> {
        JsonCodec::COMPACT
            .serialize(&Value::Mapping(map))
            .unwrap()
            .into_bytes()
    }

    fn sorted(keys: &[(String, String)], mode: OrderMode) -> Vec<SortKey> {
        let mut keys: Vec<SortKey> = keys.iter().map(|(o, n)| SortKey::new(o, n)).collect();
        keys.sort_by(|a, b| a.compare(b, mode));
        keys
    }

    proptest! {
        /// Digit orders sort by integer value in numeric mode.
        #[test]
        fn numeric_mode_orders_by_integer_value(
            keys in prop::collection::vec(("[0-9]{1,3}", "[a-z]{1,4}"), 0..20)
        ) {
            let keys = sorted(&keys, OrderMode::Numeric);
            for pair in keys.windows(2) {
                let a: u64 = pair[0].order.parse().unwrap();
                let b: u64 = pair[1].order.parse().unwrap();
                prop_assert!(a <= b, "{} sorted before {}", pair[0], pair[1]);
                if pair[0].order == pair[1].order {
                    prop_assert!(pair[0].name <= pair[1].name);
                }
            }
        }

        /// Alpha mode is plain lexical order on (order, name).
        #[test]
        fn alpha_mode_is_lexical(
            keys in prop::collection::vec(("[0-9a-c]{1,3}", "[a-z]{1,4}"), 0..20)
        ) {
            let keys = sorted(&keys, OrderMode::Alpha);
            for pair in keys.windows(2) {
                prop_assert!(
                    (&pair[0].order, &pair[0].name) <= (&pair[1].order, &pair[1].name)
                );
            }
        }

        /// Comparison is antisymmetric, so sorting is deterministic.
        #[test]
        fn comparison_is_antisymmetric(
            a in ("[0-9a-b]{0,3}", "[a-z0-9]{1,3}"),
            b in ("[0-9a-b]{0,3}", "[a-z0-9]{1,3}"),
        ) {
            let a = SortKey::new(a.0, a.1);
            let b = SortKey::new(b.0, b.1);
            for mode in [OrderMode::Numeric, OrderMode::Alpha] {
                prop_assert_eq!(a.compare(&b, mode), b.compare(&a, mode).reverse());
            }
        }

        /// Plain merge is byte concatenation.
        #[test]
        fn plain_merge_is_concatenation(
            parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..6)
        ) {
            let docs: Vec<(&str, &[u8])> = parts.iter().map(|p| ("f", p.as_slice())).collect();
            let out = merge(docs, Format::Plain, false).unwrap();
            prop_assert_eq!(out, parts.concat());
        }

        /// Structured merge equals an explicit left fold of nested_merge.
        #[test]
        fn structured_merge_is_left_fold(
            d1 in document(), d2 in document(), d3 in document(), force in any::<bool>()
        ) {
            let docs: Vec<(&str, &[u8])> = vec![
                ("d1", d1.as_bytes()),
                ("d2", d2.as_bytes()),
                ("d3", d3.as_bytes()),
            ];
            let merged = merge(docs, Format::Json, force);
            let folded = nested_merge(parse(&d1), parse(&d2), force)
                .and_then(|acc| nested_merge(acc, parse(&d3), force));

            match (merged, folded) {
                (Ok(out), Ok(map)) => prop_assert_eq!(out, render(map)),
                (Err(_), Err(_)) => {}
                (a, b) => prop_assert!(false, "merge {:?} disagrees with fold {:?}", a.is_ok(), b.is_ok()),
            }
        }

        /// A document with duplicate-free lists, forced onto itself, is unchanged.
        #[test]
        fn forced_self_merge_is_identity(doc in document()) {
            let docs: Vec<(&str, &[u8])> = vec![("a", doc.as_bytes()), ("b", doc.as_bytes())];
            let out = merge(docs, Format::Json, true).unwrap();
            prop_assert_eq!(String::from_utf8(out).unwrap(), doc);
        }

        /// Re-parsing and re-rendering merged JSON is byte-identical.
        #[test]
        fn json_output_round_trips(d1 in document(), d2 in document(), pretty in any::<bool>()) {
            let format = if pretty { Format::JsonPretty } else { Format::Json };
            let docs: Vec<(&str, &[u8])> = vec![("d1", d1.as_bytes()), ("d2", d2.as_bytes())];
            let out = merge(docs, format, true).unwrap();

            let codec = format.codec().unwrap();
            let text = String::from_utf8(out).unwrap();
            let again = codec.serialize(&codec.parse(&text).unwrap()).unwrap();
            prop_assert_eq!(again, text);
        }

        /// Newline normalization adds at most one newline and always ends with one.
        #[test]
        fn ensure_newline_adds_at_most_one(content in prop::collection::vec(any::<u8>(), 0..32)) {
            let mut normalized = content.clone();
            ensure_trailing_newline(&mut normalized);
            prop_assert_eq!(normalized.last(), Some(&b'\n'));
            if content.last() == Some(&b'\n') {
                prop_assert_eq!(normalized, content);
            } else {
                prop_assert_eq!(normalized.len(), content.len() + 1);
            }
        }
    }
}
