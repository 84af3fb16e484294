//! Canonicalization and `config_hash` computation.
//!
//! Whitespace- and comment-only edits to the YAML source must never change
//! `config_hash`. This is achieved by hashing the *parsed and
//! re-serialized* representation, not the raw bytes: parsing drops comments
//! and insignificant whitespace, and re-serializing through a
//! `BTreeMap`-keyed JSON value pins key order.

use crate::schema::StrategyConfig;
use quant_core::ids::ConfigHash;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Recursively rewrites a `serde_json::Value` so that every object is
/// backed by sorted keys, guaranteeing a deterministic serialization.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Produces the canonical byte representation of a parsed config. Two
/// configs that parse to the same [`StrategyConfig`] always produce the
/// same canonical bytes, regardless of source formatting.
pub fn canonicalize_config(config: &StrategyConfig) -> Vec<u8> {
    let value = serde_json::to_value(config).expect("StrategyConfig always serializes");
    let canonical = canonicalize(value);
    serde_json::to_vec(&canonical).expect("canonical value always serializes")
}

pub fn compute_config_hash(config: &StrategyConfig) -> ConfigHash {
    let bytes = canonicalize_config(config);
    let digest = Sha256::digest(&bytes);
    ConfigHash::new(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_bytes;

    fn sample_yaml() -> &'static str {
        include_str!("../testdata/sample_config.yaml")
    }

    #[test]
    fn whitespace_and_comment_changes_do_not_move_the_hash() {
        let a = sample_yaml().to_string();
        let b = format!("# a leading comment that changes nothing\n{a}\n\n\n");
        let loaded_a = load_config_bytes(a.as_bytes()).unwrap();
        let loaded_b = load_config_bytes(b.as_bytes()).unwrap();
        assert_eq!(
            compute_config_hash(&loaded_a.parsed),
            compute_config_hash(&loaded_b.parsed)
        );
    }

    #[test]
    fn hash_is_64_char_lowercase_hex() {
        let loaded = load_config_bytes(sample_yaml().as_bytes()).unwrap();
        let hash = compute_config_hash(&loaded.parsed);
        assert!(hash.is_well_formed());
    }

    #[test]
    fn reloading_round_trip_is_stable() {
        let loaded = load_config_bytes(sample_yaml().as_bytes()).unwrap();
        let hash_1 = compute_config_hash(&loaded.parsed);
        let reencoded = serde_yaml::to_string(&loaded.parsed).unwrap();
        let reloaded = load_config_bytes(reencoded.as_bytes()).unwrap();
        let hash_2 = compute_config_hash(&reloaded.parsed);
        assert_eq!(hash_1, hash_2);
    }
}
