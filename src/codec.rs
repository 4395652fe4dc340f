//! Canonical encoding of keys and values.
//!
//! Keys and values are stored as JSON text. Encoding goes through
//! [`serde_json::Value`] first: its object representation keeps keys
//! sorted, so the same logical value always produces byte-identical
//! output regardless of source map iteration order or process run.
//! Encoded keys double as lookup identifiers in the backing table, which
//! is why determinism matters more here than compactness.
//!
//! The codec attaches no meaning to the content it handles; anything
//! `serde` can represent round-trips through it.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Encodes a value into its canonical storage form.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the value cannot be represented
/// (for example a map with non-stringifiable keys).
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    // Normalizing through Value sorts object keys; serializing the
    // source type directly would leak HashMap iteration order.
    let canonical = serde_json::to_value(value).map_err(Error::Encode)?;
    serde_json::to_string(&canonical).map_err(Error::Encode)
}

/// Decodes a value from its canonical storage form.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the input was not produced by [`encode`]
/// or does not match the target type.
pub fn decode<T: DeserializeOwned>(encoded: &str) -> Result<T> {
    serde_json::from_str(encoded).map_err(Error::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        id: u64,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn round_trip_primitives() {
        assert_eq!(decode::<i64>(&encode(&42i64).unwrap()).unwrap(), 42);
        assert_eq!(
            decode::<String>(&encode(&"hello".to_string()).unwrap()).unwrap(),
            "hello"
        );
        assert!(decode::<bool>(&encode(&true).unwrap()).unwrap());
        assert_eq!(
            decode::<Option<u8>>(&encode(&None::<u8>).unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn round_trip_struct() {
        let record = Record {
            id: 7,
            name: "widget".into(),
            tags: vec!["a".into(), "b".into()],
        };
        let encoded = encode(&record).unwrap();
        assert_eq!(decode::<Record>(&encoded).unwrap(), record);
    }

    #[test]
    fn round_trip_nested_containers() {
        let mut nested: HashMap<String, Vec<i64>> = HashMap::new();
        nested.insert("evens".into(), vec![2, 4, 6]);
        nested.insert("odds".into(), vec![1, 3, 5]);
        let encoded = encode(&nested).unwrap();
        assert_eq!(decode::<HashMap<String, Vec<i64>>>(&encoded).unwrap(), nested);
    }

    #[test]
    fn encoding_is_canonical_for_maps() {
        // Same entries, different insertion order: byte-identical output.
        let mut first = HashMap::new();
        first.insert("alpha".to_string(), 1);
        first.insert("beta".to_string(), 2);
        first.insert("gamma".to_string(), 3);

        let mut second = HashMap::new();
        second.insert("gamma".to_string(), 3);
        second.insert("alpha".to_string(), 1);
        second.insert("beta".to_string(), 2);

        assert_eq!(encode(&first).unwrap(), encode(&second).unwrap());
    }

    #[test]
    fn integer_map_keys_round_trip() {
        let mut map: HashMap<u32, String> = HashMap::new();
        map.insert(1, "one".into());
        map.insert(2, "two".into());
        let encoded = encode(&map).unwrap();
        assert_eq!(decode::<HashMap<u32, String>>(&encoded).unwrap(), map);
    }

    #[test]
    fn decode_garbage_fails() {
        let err = decode::<i64>("not json at all").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn decode_wrong_type_fails() {
        let encoded = encode(&"a string").unwrap();
        let err = decode::<Vec<u8>>(&encoded).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    proptest! {
        #[test]
        fn prop_round_trip_i64(v in any::<i64>()) {
            prop_assert_eq!(decode::<i64>(&encode(&v).unwrap()).unwrap(), v);
        }

        #[test]
        fn prop_round_trip_string(v in ".*") {
            prop_assert_eq!(decode::<String>(&encode(&v).unwrap()).unwrap(), v);
        }

        #[test]
        fn prop_round_trip_vec(v in prop::collection::vec(any::<i32>(), 0..64)) {
            prop_assert_eq!(decode::<Vec<i32>>(&encode(&v).unwrap()).unwrap(), v);
        }

        #[test]
        fn prop_round_trip_map(
            v in prop::collection::hash_map("[a-z]{1,12}", any::<i64>(), 0..16)
        ) {
            prop_assert_eq!(
                decode::<HashMap<String, i64>>(&encode(&v).unwrap()).unwrap(),
                v
            );
        }

        #[test]
        fn prop_encoding_deterministic(
            v in prop::collection::hash_map("[a-z]{1,12}", any::<i64>(), 0..16)
        ) {
            // Rebuilding the map reshuffles iteration order; encoding
            // must not notice.
            let reshuffled: HashMap<String, i64> =
                v.iter().map(|(k, n)| (k.clone(), *n)).collect();
            prop_assert_eq!(encode(&v).unwrap(), encode(&reshuffled).unwrap());
        }
    }
}
