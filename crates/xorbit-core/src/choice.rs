//! The receiver's secret index and its bit decomposition.
//!
//! Layer `i` of a `k`-layer transfer carries bit `k - 1 - i` of the index,
//! so layer 0 holds the most significant bit. Sender and receiver both go
//! through [`Choice::bits`], which keeps the two decompositions identical.

use ciborium::Value;

use crate::{
    error::OtError,
    params::{MAX_LAYERS, ParamsError},
};

/// An index in `0..2^k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    index: u32,
    layers: u8,
}

impl Choice {
    /// Choice of `index` among `2^layers` messages.
    ///
    /// # Errors
    ///
    /// - `ChoiceOutOfRange` if `index >= 2^layers`
    /// - `InvalidParams` if `layers` is outside `1..=MAX_LAYERS`
    pub fn new(index: u32, layers: u8) -> Result<Self, OtError> {
        Self::from_i128(i128::from(index), layers)
    }

    /// Choice from a signed integer, as produced by untyped callers.
    ///
    /// # Errors
    ///
    /// - `ChoiceOutOfRange` if `value` is negative or `>= 2^layers`
    pub fn from_i64(value: i64, layers: u8) -> Result<Self, OtError> {
        Self::from_i128(i128::from(value), layers)
    }

    /// Choice from a dynamically typed CBOR value.
    ///
    /// Only integers are accepted. `3.5`, `5.0`, `"5"` and every other
    /// non-integer value are type errors, not range errors.
    ///
    /// # Errors
    ///
    /// - `InvalidChoiceType` if `value` is not an integer
    /// - `ChoiceOutOfRange` if the integer is negative or `>= 2^layers`
    pub fn from_value(value: &Value, layers: u8) -> Result<Self, OtError> {
        match value.as_integer() {
            Some(integer) => Self::from_i128(i128::from(integer), layers),
            None => Err(OtError::InvalidChoiceType { found: value_type(value) }),
        }
    }

    fn from_i128(value: i128, layers: u8) -> Result<Self, OtError> {
        if layers == 0 || layers > MAX_LAYERS {
            return Err(ParamsError::LayersOutOfRange { layers, max: MAX_LAYERS }.into());
        }

        let max = (1u32 << layers) - 1;
        match u32::try_from(value) {
            Ok(index) if index <= max => Ok(Self { index, layers }),
            _ => Err(OtError::ChoiceOutOfRange { choice: value, max }),
        }
    }

    /// The selected index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of bits (layers) of this choice.
    pub fn layers(&self) -> u8 {
        self.layers
    }

    /// Bit carried by `layer` (layer 0 is the most significant bit), or
    /// `None` if the choice has no such layer.
    pub fn bit(&self, layer: usize) -> Option<bool> {
        let shift = usize::from(self.layers).checked_sub(layer)?.checked_sub(1)?;
        Some((self.index >> shift) & 1 == 1)
    }

    /// Bits in layer order, most significant first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.layers).rev().map(|shift| (self.index >> shift) & 1 == 1)
    }
}

/// Recombine bits given most significant first into an index.
pub fn index_from_bits(bits: impl IntoIterator<Item = bool>) -> usize {
    bits.into_iter().fold(0, |index, bit| (index << 1) | usize::from(bit))
}

fn value_type(value: &Value) -> &'static str {
    if value.is_float() {
        "float"
    } else if value.is_text() {
        "text"
    } else if value.is_bytes() {
        "bytes"
    } else if value.is_bool() {
        "bool"
    } else if value.is_null() {
        "null"
    } else if value.is_array() {
        "array"
    } else if value.is_map() {
        "map"
    } else if value.is_tag() {
        "tag"
    } else {
        "unknown"
    }
}
