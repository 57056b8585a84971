//! Transfer parameters.
//!
//! Both parties must agree on the parameters out of band. They are plain
//! data: `Default` gives the 1-of-8 transfer, and the struct deserializes
//! with per-field defaults so it can sit inside a larger config file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported number of layers (4096 messages)
pub const MAX_LAYERS: u8 = 12;

/// Shortest accepted branch key length in bytes
pub const MIN_KEY_LEN: usize = 16;

/// Longest accepted branch key length in bytes
pub const MAX_KEY_LEN: usize = 64;

/// How the receiver's public keys map onto layers and branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLayout {
    /// One key pair per layer; both branch keys of a layer are sealed to the
    /// same public key.
    ///
    /// # Security
    ///
    /// The receiver keeps the one secret key that opens BOTH branches of
    /// every layer, so it can recover every combined key and unmask every
    /// message. Kept as the default for compatibility with the analyzed
    /// protocol; see [`KeyLayout::PerBranch`].
    #[default]
    SharedPerLayer,

    /// One key pair per branch per layer (`2k` public keys, branch 0 first).
    ///
    /// The receiver discards the secret key of every non-chosen branch while
    /// building the request, so an honest receiver cannot open any other
    /// branch. Nothing stops a dishonest receiver from keeping both secrets;
    /// the sender cannot tell the difference.
    PerBranch,
}

impl KeyLayout {
    /// Public keys published per layer.
    pub const fn keys_per_layer(self) -> usize {
        match self {
            Self::SharedPerLayer => 1,
            Self::PerBranch => 2,
        }
    }
}

/// Errors in transfer parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// Layer count outside `1..=MAX_LAYERS`
    #[error("layers must be in 1..={max}, got {layers}")]
    LayersOutOfRange {
        /// Configured layer count
        layers: u8,
        /// Largest supported layer count
        max: u8,
    },

    /// Branch key length outside `MIN_KEY_LEN..=MAX_KEY_LEN`
    #[error("key_len must be in {min}..={max}, got {len}")]
    KeyLengthOutOfRange {
        /// Configured key length
        len: usize,
        /// Shortest accepted length
        min: usize,
        /// Longest accepted length
        max: usize,
    },

    /// Choice was built for a different number of layers
    #[error("choice has {choice_layers} bits but parameters have {layers} layers")]
    ChoiceLayerMismatch {
        /// Bit width of the choice
        choice_layers: u8,
        /// Configured layer count
        layers: u8,
    },
}

/// Parameters of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtParams {
    /// Number of 1-of-2 layers `k`; the sender holds `2^k` messages
    pub layers: u8,
    /// Length of every branch key in bytes
    pub key_len: usize,
    /// Mapping of public keys onto layers and branches
    pub key_layout: KeyLayout,
}

impl Default for OtParams {
    fn default() -> Self {
        Self { layers: 3, key_len: 32, key_layout: KeyLayout::SharedPerLayer }
    }
}

impl OtParams {
    /// Default parameters with `layers` layers.
    pub fn with_layers(layers: u8) -> Self {
        Self { layers, ..Self::default() }
    }

    /// Same parameters with a different key layout.
    #[must_use]
    pub fn with_key_layout(self, key_layout: KeyLayout) -> Self {
        Self { key_layout, ..self }
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.layers == 0 || self.layers > MAX_LAYERS {
            return Err(ParamsError::LayersOutOfRange { layers: self.layers, max: MAX_LAYERS });
        }
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&self.key_len) {
            return Err(ParamsError::KeyLengthOutOfRange {
                len: self.key_len,
                min: MIN_KEY_LEN,
                max: MAX_KEY_LEN,
            });
        }
        Ok(())
    }

    /// Number of messages the sender holds (`2^k`).
    pub fn message_count(&self) -> usize {
        1usize << self.layers
    }

    /// Number of public keys in a request.
    pub fn public_key_count(&self) -> usize {
        usize::from(self.layers) * self.key_layout.keys_per_layer()
    }

    /// Position in the request's key list of the key that seals
    /// (`layer`, `bit`).
    pub fn key_index(&self, layer: usize, bit: bool) -> usize {
        match self.key_layout {
            KeyLayout::SharedPerLayer => layer,
            KeyLayout::PerBranch => 2 * layer + usize::from(bit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_of_eight() {
        let params = OtParams::default();

        assert_eq!(params.layers, 3);
        assert_eq!(params.message_count(), 8);
        assert_eq!(params.public_key_count(), 3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn per_branch_doubles_public_keys() {
        let params = OtParams::default().with_key_layout(KeyLayout::PerBranch);

        assert_eq!(params.public_key_count(), 6);
        assert_eq!(params.key_index(0, false), 0);
        assert_eq!(params.key_index(0, true), 1);
        assert_eq!(params.key_index(2, true), 5);
    }

    #[test]
    fn shared_layout_ignores_bit() {
        let params = OtParams::default();

        assert_eq!(params.key_index(1, false), 1);
        assert_eq!(params.key_index(1, true), 1);
    }

    #[test]
    fn rejects_zero_layers() {
        assert_eq!(
            OtParams::with_layers(0).validate(),
            Err(ParamsError::LayersOutOfRange { layers: 0, max: MAX_LAYERS })
        );
    }

    #[test]
    fn rejects_too_many_layers() {
        assert!(OtParams::with_layers(MAX_LAYERS).validate().is_ok());
        assert_eq!(
            OtParams::with_layers(MAX_LAYERS + 1).validate(),
            Err(ParamsError::LayersOutOfRange { layers: MAX_LAYERS + 1, max: MAX_LAYERS })
        );
    }

    #[test]
    fn rejects_bad_key_length() {
        let short = OtParams { key_len: MIN_KEY_LEN - 1, ..OtParams::default() };
        let long = OtParams { key_len: MAX_KEY_LEN + 1, ..OtParams::default() };

        assert!(matches!(short.validate(), Err(ParamsError::KeyLengthOutOfRange { .. })));
        assert!(matches!(long.validate(), Err(ParamsError::KeyLengthOutOfRange { .. })));
    }

    #[test]
    fn deserializes_with_defaults() {
        let value = ciborium::Value::Map(vec![(
            ciborium::Value::Text("key_layout".into()),
            ciborium::Value::Text("per_branch".into()),
        )]);

        let params: OtParams = value.deserialized().unwrap();

        assert_eq!(params, OtParams::default().with_key_layout(KeyLayout::PerBranch));
    }
}
