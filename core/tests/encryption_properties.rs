//! Property-based tests for the encryption service
//!
//! 1. **Round-trip**: decrypt(encrypt(p)) == p, asymmetric and symmetric
//! 2. **Tamper detection**: any flipped bit in ciphertext or mac is rejected
//! 3. **Key mismatch**: another recipient's key never decrypts
//! 4. **Freshness**: repeated encryptions never repeat iv, ephemeral key or ciphertext

use medichain_core::crypto::{
    decrypt_symmetric, decrypt_with_private_key, encrypt_symmetric, encrypt_with_public_key,
    generate_key_pair, generate_symmetric_key, open_symmetric, seal_symmetric,
};
use medichain_core::Error;
use proptest::prelude::*;
use serde_json::{Map, Value};

// Arbitrary JSON: finite floats, full-range integers, Unicode strings,
// nested arrays and objects
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "\\PC{0,24}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("\\PC{1,12}", inner, 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

// A record: always an object, so the payload itself is never a bare string
fn record() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("\\PC{1,12}", json_value(), 0..8)
        .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>()))
}

// Free text that never parses as JSON
fn note() -> impl Strategy<Value = Value> {
    "note: \\PC{0,64}".prop_map(Value::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_envelope_roundtrip(payload in prop_oneof![record(), note()]) {
        let pair = generate_key_pair().unwrap();
        let envelope = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        prop_assert_eq!(decrypt_with_private_key(&envelope, &pair.private_key).unwrap(), payload);
    }

    #[test]
    fn prop_envelope_survives_json(payload in record()) {
        let pair = generate_key_pair().unwrap();
        let envelope = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        let stored = serde_json::to_string(&envelope).unwrap();
        let restored = serde_json::from_str(&stored).unwrap();
        prop_assert_eq!(decrypt_with_private_key(&restored, &pair.private_key).unwrap(), payload);
    }

    #[test]
    fn prop_tampered_ciphertext_rejected(payload in record(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let pair = generate_key_pair().unwrap();
        let mut envelope = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        let i = index.index(envelope.ciphertext.len());
        envelope.ciphertext[i] ^= 1 << bit;

        let result = decrypt_with_private_key(&envelope, &pair.private_key);
        prop_assert!(matches!(result, Err(Error::Decryption { .. })), "expected Error::Decryption, got {:?}", result);
    }

    #[test]
    fn prop_tampered_mac_rejected(payload in record(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let pair = generate_key_pair().unwrap();
        let mut envelope = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        let i = index.index(envelope.mac.len());
        envelope.mac[i] ^= 1 << bit;

        let result = decrypt_with_private_key(&envelope, &pair.private_key);
        prop_assert!(matches!(result, Err(Error::Decryption { .. })), "expected Error::Decryption, got {:?}", result);
    }

    #[test]
    fn prop_other_key_rejected(payload in record()) {
        let alice = generate_key_pair().unwrap();
        let mallory = generate_key_pair().unwrap();
        let envelope = encrypt_with_public_key(&payload, &alice.public_key).unwrap();

        let result = decrypt_with_private_key(&envelope, &mallory.private_key);
        prop_assert!(matches!(result, Err(Error::Decryption { .. })), "expected Error::Decryption, got {:?}", result);
    }

    #[test]
    fn prop_encryptions_are_fresh(payload in record()) {
        let pair = generate_key_pair().unwrap();
        let a = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        let b = encrypt_with_public_key(&payload, &pair.public_key).unwrap();
        prop_assert_ne!(a.iv, b.iv);
        prop_assert_ne!(a.ephem_public_key, b.ephem_public_key);
        prop_assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn prop_symmetric_roundtrip(payload in prop_oneof![record(), note()]) {
        let km = generate_symmetric_key().unwrap();
        let ciphertext = encrypt_symmetric(&payload, &km).unwrap();
        prop_assert_eq!(decrypt_symmetric(&ciphertext, &km).unwrap(), payload.clone());

        let sealed = seal_symmetric(&payload, &km).unwrap();
        prop_assert_eq!(open_symmetric(&sealed, &km).unwrap(), payload);
    }
}
