//! Property-based tests for canonical JSON and subfeed hash derivation.

use feedlog_crypto::{derive_subfeed_hash, to_canonical_json, ContentHasher};
use feedlog_types::SubfeedName;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Arbitrary JSON without floats, so values compare exactly after parsing.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<String>().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((any::<String>(), inner), 0..6).prop_map(|pairs| {
                let mut map = Map::new();
                for (k, v) in pairs {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_encoding_is_ascii(value in json_strategy()) {
        let text = to_canonical_json(&value);
        prop_assert!(text.is_ascii());
    }

    #[test]
    fn canonical_encoding_parses_back(value in json_strategy()) {
        let text = to_canonical_json(&value);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn canonical_encoding_is_a_fixed_point(value in json_strategy()) {
        let text = to_canonical_json(&value);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(to_canonical_json(&parsed), text);
    }

    #[test]
    fn key_insertion_order_is_irrelevant(
        pairs in prop::collection::btree_map(any::<String>(), any::<i64>(), 0..8)
    ) {
        let mut forward = Map::new();
        for (k, v) in pairs.iter() {
            forward.insert(k.clone(), Value::from(*v));
        }
        let mut reverse = Map::new();
        for (k, v) in pairs.iter().rev() {
            reverse.insert(k.clone(), Value::from(*v));
        }
        prop_assert_eq!(
            ContentHasher::hash_json(&Value::Object(forward)),
            ContentHasher::hash_json(&Value::Object(reverse))
        );
    }

    #[test]
    fn subfeed_hash_is_pure(value in json_strategy()) {
        let name = SubfeedName::from(value);
        prop_assert_eq!(derive_subfeed_hash(&name), derive_subfeed_hash(&name.clone()));
    }

    #[test]
    fn text_subfeed_hash_is_lower_hex(name in "[^~].*") {
        let hash = derive_subfeed_hash(&SubfeedName::from(name.as_str()));
        prop_assert_eq!(hash.as_str().len(), 40);
        prop_assert!(hash.as_str().bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn literal_names_bypass_hashing(suffix in "[0-9a-f]{40}") {
        let name = SubfeedName::from(format!("~{suffix}"));
        let hash = derive_subfeed_hash(&name);
        prop_assert_eq!(hash.as_str(), suffix.as_str());
    }
}
