//! Property-based tests for the transfer primitives
//!
//! These tests verify the invariants the layered transfer relies on:
//!
//! 1. **Sealing**: open(seal(k)) == k, and only for the recipient's key
//! 2. **Combining**: XOR of branch keys cancels pairwise
//! 3. **Masking**: applying a combined key twice is the identity
//! 4. **Binding**: the commitment changes whenever any key byte changes

use proptest::prelude::*;
use xorbit_crypto::{
    BranchKey, CombinedKey, CryptoError, LayerKeyPair, SEAL_OVERHEAD, SealRandomness, commit, open,
    seal,
};

fn randomness(ephemeral: [u8; 32], nonce: [u8; 24]) -> SealRandomness {
    SealRandomness { ephemeral, nonce }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_seal_open_roundtrip(
        recipient_seed in any::<[u8; 32]>(),
        ephemeral in any::<[u8; 32]>(),
        nonce in any::<[u8; 24]>(),
        key in prop::collection::vec(any::<u8>(), 16..=64),
    ) {
        let recipient = LayerKeyPair::from_random(recipient_seed);

        let sealed = seal(recipient.public_key(), &key, &randomness(ephemeral, nonce)).unwrap();

        // PROPERTY: Sealed size is fixed overhead plus key length
        prop_assert_eq!(sealed.len(), key.len() + SEAL_OVERHEAD);

        // PROPERTY: Recipient recovers the exact key
        let opened = open(&recipient, &sealed).unwrap();
        prop_assert_eq!(&opened[..], &key[..]);
    }

    #[test]
    fn prop_other_recipient_cannot_open(
        recipient_seed in any::<[u8; 32]>(),
        other_seed in any::<[u8; 32]>(),
        ephemeral in any::<[u8; 32]>(),
        key in prop::collection::vec(any::<u8>(), 32..=32),
    ) {
        let recipient = LayerKeyPair::from_random(recipient_seed);
        let other = LayerKeyPair::from_random(other_seed);
        prop_assume!(recipient.public_key() != other.public_key());

        let sealed = seal(recipient.public_key(), &key, &randomness(ephemeral, [0u8; 24])).unwrap();

        prop_assert_eq!(open(&other, &sealed).unwrap_err(), CryptoError::AuthenticationFailed);
    }

    #[test]
    fn prop_combining_key_twice_cancels(
        a in prop::collection::vec(any::<u8>(), 32..=32),
        b in prop::collection::vec(any::<u8>(), 32..=32),
    ) {
        let a = BranchKey::from_bytes(a);
        let b = BranchKey::from_bytes(b);

        let combined = CombinedKey::combine([&a, &b, &b]).unwrap();

        // PROPERTY: b XOR b vanishes
        prop_assert_eq!(combined.as_bytes(), a.as_bytes());
    }

    #[test]
    fn prop_mask_is_involution(
        key in prop::collection::vec(any::<u8>(), 16..=64),
        data in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let combined = CombinedKey::combine([&BranchKey::from_bytes(key)]).unwrap();

        let masked = combined.apply(&data).unwrap();

        prop_assert_eq!(masked.len(), data.len());
        prop_assert_eq!(combined.apply(&masked).unwrap(), data);
    }

    #[test]
    fn prop_commitment_detects_any_flip(
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 32..=32), 1..=6),
        key_index in any::<prop::sample::Index>(),
        byte in 0usize..32,
        bit in 0u8..8,
    ) {
        let commitment = commit(&keys);

        let mut tampered = keys.clone();
        let victim = key_index.index(tampered.len());
        tampered[victim][byte] ^= 1 << bit;

        prop_assert!(commitment.verify(commit(&keys).as_bytes()));
        prop_assert!(!commitment.verify(commit(&tampered).as_bytes()));
    }
}
