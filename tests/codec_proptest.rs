//! Property-based tests for the chart payload codec
//!
//! Any JSON value must survive encode/decode unchanged, and decoding arbitrary text must fail
//! cleanly instead of panicking.

use proptest::prelude::*;
use serde_json::{Map, Value};
use streamdoc::codec::{decode, decode_pretty, encode};

/// Arbitrary JSON values, including every finite float
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("JSON has no NaN or infinity", |f| f.is_finite())
            .prop_map(Value::from),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec(("[a-zA-Z_][a-zA-Z0-9_]{0,8}", inner), 0..8).prop_map(
                |pairs| {
                    let mut map = Map::new();
                    for (key, value) in pairs {
                        map.insert(key, value);
                    }
                    Value::Object(map)
                }
            ),
        ]
    })
}

proptest! {
    #[test]
    fn test_round_trip(value in json_strategy()) {
        let carrier = encode(&value);
        prop_assert_eq!(decode(&carrier).unwrap(), value);
    }

    #[test]
    fn test_carrier_is_attribute_safe(value in json_strategy()) {
        let carrier = encode(&value);
        prop_assert!(carrier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
    }

    #[test]
    fn test_encoding_is_deterministic(value in json_strategy()) {
        prop_assert_eq!(encode(&value), encode(&value.clone()));
    }

    #[test]
    fn test_pretty_output_parses_back(value in json_strategy()) {
        let pretty = decode_pretty(&encode(&value)).unwrap();
        let reparsed: Value = serde_json::from_str(&pretty).unwrap();
        prop_assert_eq!(reparsed, value);
    }

    #[test]
    fn test_floats_keep_their_bits(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let decoded = decode(&encode(&Value::from(f))).unwrap();
        prop_assert_eq!(decoded.as_f64().map(f64::to_bits), Some(f.to_bits()));
    }

    #[test]
    fn test_decode_arbitrary_text_never_panics(text in ".*") {
        let _ = decode(&text);
    }
}
