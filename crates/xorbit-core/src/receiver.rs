//! Receiver side of the transfer.
//!
//! [`ot_request`] generates the layer key pairs and returns them inside a
//! [`ReceiverSession`] alongside the request to send. The session is
//! consumed by [`ReceiverSession::receive`], so a session can recover at
//! most one message. Secret keys are wiped when the session drops, whether
//! or not `receive` succeeded.
//!
//! ```text
//! ot_request ──► (ReceiverSession, OtRequest) ──► sender
//!                       │                           │
//!                       ▼                           ▼
//!                 receive(self) ◄──────────── OtResponse
//! ```

use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};
use xorbit_crypto::{
    BranchKey, CombinedKey, CryptoError, LayerKeyPair, SECRET_KEY_SIZE, commit, hybrid,
};
use xorbit_proto::{OtRequest, OtResponse};
use zeroize::Zeroize;

use crate::{
    choice::{Choice, index_from_bits},
    error::OtError,
    params::{KeyLayout, OtParams, ParamsError},
};

/// Secret key material retained for one layer.
enum LayerSecret {
    /// One pair opens both branches
    Shared(LayerKeyPair),
    /// Only the chosen branch's pair was kept
    Branch { bit: bool, pair: LayerKeyPair },
}

impl LayerSecret {
    fn pair_for(&self, bit: bool) -> Option<&LayerKeyPair> {
        match self {
            Self::Shared(pair) => Some(pair),
            Self::Branch { bit: kept, pair } => (*kept == bit).then_some(pair),
        }
    }
}

/// Receiver state between sending the request and reading the response.
///
/// Not `Clone`: copying the session would let the same secret keys open
/// more than one response.
pub struct ReceiverSession {
    params: OtParams,
    choice: Choice,
    secrets: Vec<LayerSecret>,
}

/// Start a transfer for `choice`.
///
/// Returns the session to keep and the request to send to the sender.
///
/// # Errors
///
/// - `InvalidParams` if `params` are invalid or `choice` was built for a
///   different number of layers
pub fn ot_request<R: CryptoRng + RngCore>(
    params: &OtParams,
    choice: Choice,
    rng: &mut R,
) -> Result<(ReceiverSession, OtRequest), OtError> {
    params.validate()?;
    if choice.layers() != params.layers {
        return Err(ParamsError::ChoiceLayerMismatch {
            choice_layers: choice.layers(),
            layers: params.layers,
        }
        .into());
    }

    let mut public_keys = Vec::with_capacity(params.public_key_count());
    let mut secrets = Vec::with_capacity(usize::from(params.layers));

    for bit in choice.bits() {
        match params.key_layout {
            KeyLayout::SharedPerLayer => {
                let pair = generate_key_pair(rng);
                public_keys.push(pair.public_key().to_bytes().to_vec());
                secrets.push(LayerSecret::Shared(pair));
            },
            KeyLayout::PerBranch => {
                let zero = generate_key_pair(rng);
                let one = generate_key_pair(rng);
                public_keys.push(zero.public_key().to_bytes().to_vec());
                public_keys.push(one.public_key().to_bytes().to_vec());

                // The other branch's pair drops here
                let pair = if bit { one } else { zero };
                secrets.push(LayerSecret::Branch { bit, pair });
            },
        }
    }

    let commitment = commit(&public_keys);

    debug!(
        layers = params.layers,
        key_layout = ?params.key_layout,
        public_keys = public_keys.len(),
        commitment = %commitment,
        "built transfer request"
    );

    let session = ReceiverSession { params: *params, choice, secrets };
    let request = OtRequest { public_keys, commitment: commitment.as_bytes().to_vec() };

    Ok((session, request))
}

fn generate_key_pair<R: CryptoRng + RngCore>(rng: &mut R) -> LayerKeyPair {
    let mut random = [0u8; SECRET_KEY_SIZE];
    rng.fill_bytes(&mut random);
    let pair = LayerKeyPair::from_random(random);
    random.zeroize();
    pair
}

impl ReceiverSession {
    /// Recover the chosen message from the sender's response.
    ///
    /// No integrity is checked on the message itself: a corrupted
    /// ciphertext yields corrupted output, not an error.
    ///
    /// # Errors
    ///
    /// - `MalformedResponse` if the response has the wrong number of key
    ///   pairs or ciphertexts, or the chosen ciphertext is too long to unmask
    /// - `DecryptionFailure` if a chosen branch key fails to open or has the
    ///   wrong length
    pub fn receive(self, response: &OtResponse) -> Result<Vec<u8>, OtError> {
        self.check_shape(response)?;

        let mut keys = Vec::with_capacity(self.secrets.len());
        for (layer, bit) in self.choice.bits().enumerate() {
            keys.push(self.open_chosen(response, layer, bit)?);
        }

        let Ok(combined) = CombinedKey::combine(&keys) else {
            unreachable!("at least one layer and every key length was checked");
        };

        let index = index_from_bits(self.choice.bits());
        let plaintext = combined.apply(&response.ciphertexts[index]).map_err(|e| {
            OtError::MalformedResponse { reason: format!("ciphertext cannot be unmasked: {e}") }
        })?;

        trace!(layers = keys.len(), len = plaintext.len(), "recovered message");

        Ok(plaintext)
    }

    /// Try to open the branch key for (`layer`, `bit`) with the secrets this
    /// session retains.
    ///
    /// Used to audit what a receiver could learn beyond its choice: with
    /// [`KeyLayout::SharedPerLayer`] every branch opens, with
    /// [`KeyLayout::PerBranch`] only the chosen ones do.
    ///
    /// # Errors
    ///
    /// - `BranchKeyUnavailable` if no retained secret key seals this branch
    /// - `MalformedResponse` if the response has no pair for `layer`
    /// - `DecryptionFailure` if the box fails to open
    pub fn open_branch(
        &self,
        response: &OtResponse,
        layer: usize,
        bit: bool,
    ) -> Result<BranchKey, OtError> {
        let pair = self
            .secrets
            .get(layer)
            .and_then(|secret| secret.pair_for(bit))
            .ok_or(OtError::BranchKeyUnavailable { layer, branch: u8::from(bit) })?;

        let sealed = response.encrypted_key_pairs.get(layer).ok_or_else(|| {
            OtError::MalformedResponse { reason: format!("no key pair for layer {layer}") }
        })?;

        self.open_with(pair, sealed.branch(bit), layer)
    }

    fn check_shape(&self, response: &OtResponse) -> Result<(), OtError> {
        let layers = usize::from(self.params.layers);
        if response.encrypted_key_pairs.len() != layers {
            return Err(OtError::MalformedResponse {
                reason: format!(
                    "expected {layers} encrypted key pairs, got {}",
                    response.encrypted_key_pairs.len()
                ),
            });
        }

        let messages = self.params.message_count();
        if response.ciphertexts.len() != messages {
            return Err(OtError::MalformedResponse {
                reason: format!(
                    "expected {messages} ciphertexts, got {}",
                    response.ciphertexts.len()
                ),
            });
        }

        Ok(())
    }

    fn open_chosen(
        &self,
        response: &OtResponse,
        layer: usize,
        bit: bool,
    ) -> Result<BranchKey, OtError> {
        let Some(pair) = self.secrets.get(layer).and_then(|secret| secret.pair_for(bit)) else {
            unreachable!("the chosen branch of every layer has a retained secret");
        };

        self.open_with(pair, response.encrypted_key_pairs[layer].branch(bit), layer)
    }

    fn open_with(
        &self,
        pair: &LayerKeyPair,
        sealed: &[u8],
        layer: usize,
    ) -> Result<BranchKey, OtError> {
        let opened = hybrid::open(pair, sealed)
            .map_err(|source| OtError::DecryptionFailure { layer, source })?;

        if opened.len() != self.params.key_len {
            return Err(OtError::DecryptionFailure {
                layer,
                source: CryptoError::KeyLengthMismatch {
                    expected: self.params.key_len,
                    actual: opened.len(),
                },
            });
        }

        Ok(BranchKey::from_bytes(opened.to_vec()))
    }
}

impl std::fmt::Debug for ReceiverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverSession")
            .field("params", &self.params)
            .field("choice", &"<redacted>")
            .field("secrets", &self.secrets.len())
            .finish()
    }
}
