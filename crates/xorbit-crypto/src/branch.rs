//! Branch keys and their XOR combination.
//!
//! Each layer of a transfer carries two branch keys, one per bit value. The
//! key that masks message `i` is the XOR of the branch keys picked by the
//! bits of `i`, one per layer. Combined keys are stretched to the message
//! length with HKDF-SHA256 and XORed onto the message, so the same call
//! masks and unmasks.
//!
//! Masking with the HKDF expansion rather than the raw combined key is a
//! deliberate departure from a plain XOR: messages may be longer than the
//! key, and no key byte is ever reused across message bytes.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;

/// Longest message a combined key can mask (HKDF-SHA256 output limit)
pub const MAX_MASK_LEN: usize = 255 * 32;

/// Label used for mask expansion
const MASK_LABEL: &[u8] = b"xorbitMaskV1";

/// One branch key of one layer.
///
/// Wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BranchKey {
    key: Vec<u8>,
}

impl BranchKey {
    /// Wrap caller-provided random bytes.
    ///
    /// Caller MUST provide cryptographically secure random bytes in
    /// production.
    pub fn from_bytes(key: Vec<u8>) -> Self {
        Self { key }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// True for a zero-length key.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchKey(<{} bytes>)", self.key.len())
    }
}

impl Drop for BranchKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// XOR of one branch key per layer.
pub struct CombinedKey {
    key: Zeroizing<Vec<u8>>,
}

impl CombinedKey {
    /// XOR the given branch keys together.
    ///
    /// # Errors
    ///
    /// - `EmptyCombination` if no keys are given
    /// - `KeyLengthMismatch` if the keys differ in length
    pub fn combine<'a>(keys: impl IntoIterator<Item = &'a BranchKey>) -> Result<Self, CryptoError> {
        let mut keys = keys.into_iter();
        let first = keys.next().ok_or(CryptoError::EmptyCombination)?;
        let mut combined = Zeroizing::new(first.key.clone());

        for key in keys {
            if key.len() != combined.len() {
                return Err(CryptoError::KeyLengthMismatch {
                    expected: combined.len(),
                    actual: key.len(),
                });
            }
            for (acc, byte) in combined.iter_mut().zip(key.as_bytes()) {
                *acc ^= byte;
            }
        }

        Ok(Self { key: combined })
    }

    /// Raw combined key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// XOR `data` with the mask expanded from this key.
    ///
    /// Masking is an involution: applying the same key twice returns the
    /// original bytes. No integrity is provided.
    ///
    /// # Errors
    ///
    /// - `MaskTooLong` if `data` exceeds [`MAX_MASK_LEN`]
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() > MAX_MASK_LEN {
            return Err(CryptoError::MaskTooLong { len: data.len(), max: MAX_MASK_LEN });
        }
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let hkdf = Hkdf::<Sha256>::new(None, &self.key);
        let mut mask = Zeroizing::new(vec![0u8; data.len()]);
        let Ok(()) = hkdf.expand(MASK_LABEL, &mut mask) else {
            unreachable!("mask length is bounded by MAX_MASK_LEN");
        };

        Ok(data.iter().zip(mask.iter()).map(|(byte, pad)| byte ^ pad).collect())
    }
}

impl fmt::Debug for CombinedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombinedKey(<{} bytes>)", self.key.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fill: u8) -> BranchKey {
        BranchKey::from_bytes(vec![fill; 32])
    }

    #[test]
    fn combine_xors_all_keys() {
        let keys = [key(0b0001), key(0b0010), key(0b0100)];

        let combined = CombinedKey::combine(&keys).unwrap();

        assert_eq!(combined.as_bytes(), &[0b0111; 32]);
    }

    #[test]
    fn combine_single_key_is_identity() {
        let only = key(0xA5);
        let combined = CombinedKey::combine([&only]).unwrap();

        assert_eq!(combined.as_bytes(), only.as_bytes());
    }

    #[test]
    fn combine_is_order_independent() {
        let (a, b, c) = (key(0x13), key(0x57), key(0x9B));

        let abc = CombinedKey::combine([&a, &b, &c]).unwrap();
        let cab = CombinedKey::combine([&c, &a, &b]).unwrap();

        assert_eq!(abc.as_bytes(), cab.as_bytes());
    }

    #[test]
    fn combine_rejects_empty_set() {
        let result = CombinedKey::combine(std::iter::empty());
        assert_eq!(result.unwrap_err(), CryptoError::EmptyCombination);
    }

    #[test]
    fn combine_rejects_length_mismatch() {
        let short = BranchKey::from_bytes(vec![0u8; 16]);
        let result = CombinedKey::combine([&key(1), &short]);

        assert_eq!(
            result.unwrap_err(),
            CryptoError::KeyLengthMismatch { expected: 32, actual: 16 }
        );
    }

    #[test]
    fn apply_twice_restores_data() {
        let combined = CombinedKey::combine([&key(1), &key(2)]).unwrap();
        let data = b"donor registry entry".to_vec();

        let masked = combined.apply(&data).unwrap();
        assert_ne!(masked, data);

        let unmasked = combined.apply(&masked).unwrap();
        assert_eq!(unmasked, data);
    }

    #[test]
    fn apply_preserves_length() {
        let combined = CombinedKey::combine([&key(3)]).unwrap();

        for len in [0, 1, 31, 32, 33, 1000, MAX_MASK_LEN] {
            assert_eq!(combined.apply(&vec![0u8; len]).unwrap().len(), len);
        }
    }

    #[test]
    fn apply_rejects_oversized_data() {
        let combined = CombinedKey::combine([&key(3)]).unwrap();
        let result = combined.apply(&vec![0u8; MAX_MASK_LEN + 1]);

        assert_eq!(
            result.unwrap_err(),
            CryptoError::MaskTooLong { len: MAX_MASK_LEN + 1, max: MAX_MASK_LEN }
        );
    }

    #[test]
    fn different_keys_produce_different_masks() {
        let first = CombinedKey::combine([&key(1)]).unwrap();
        let second = CombinedKey::combine([&key(2)]).unwrap();
        let data = [0u8; 32];

        assert_ne!(first.apply(&data).unwrap(), second.apply(&data).unwrap());
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        assert_eq!(format!("{:?}", key(0xFF)), "BranchKey(<32 bytes>)");
    }
}
