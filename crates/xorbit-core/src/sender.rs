//! Sender side of the transfer.
//!
//! The sender is stateless: [`ot_send`] is a function of the parameters,
//! the messages, the request and fresh randomness.
//!
//! # Ordering
//!
//! Every check runs before any key is generated, so a rejected request
//! leaves nothing behind:
//!
//! 1. commitment matches the request's public keys
//! 2. message count is `2^k`
//! 3. public key count matches the key layout
//! 4. every message fits under the mask limit
//! 5. every public key decodes (reported as an encryption failure)
//!
//! The encoded size of the response depends on the masked bytes, so it is
//! checked last, after masking. A response over [`MAX_MESSAGE_SIZE`] is
//! dropped rather than returned, since no receiver would decode it.

use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};
use xorbit_crypto::{
    BranchKey, CombinedKey, LayerPublicKey, MAX_MASK_LEN, NONCE_SIZE, SECRET_KEY_SIZE,
    SealRandomness, commit, hybrid,
};
use xorbit_proto::{EncryptedBranchPair, MAX_MESSAGE_SIZE, OtRequest, OtResponse};

use crate::{choice::Choice, error::OtError, params::OtParams};

/// Answer a receiver's request with the sealed branch keys and all `2^k`
/// masked messages.
///
/// # Errors
///
/// - `InvalidParams` if `params` are invalid
/// - `CommitmentMismatch` if the commitment does not match the public keys
/// - `InvalidPlaintextCount` if `plaintexts.len() != 2^k`
/// - `InvalidPublicKeyCount` if the request has the wrong number of keys
/// - `PlaintextTooLong` if a message exceeds the mask limit
/// - `EncryptionFailure` if a public key is malformed or low-order
/// - `ResponseTooLarge` if the encoded response exceeds [`MAX_MESSAGE_SIZE`]
pub fn ot_send<P, R>(
    params: &OtParams,
    plaintexts: &[P],
    request: &OtRequest,
    rng: &mut R,
) -> Result<OtResponse, OtError>
where
    P: AsRef<[u8]>,
    R: CryptoRng + RngCore,
{
    params.validate()?;

    if !commit(&request.public_keys).verify(&request.commitment) {
        warn!(public_keys = request.public_keys.len(), "rejecting request: commitment mismatch");
        return Err(OtError::CommitmentMismatch);
    }
    debug!(public_keys = request.public_keys.len(), "commitment verified");

    let expected = params.message_count();
    if plaintexts.len() != expected {
        return Err(OtError::InvalidPlaintextCount { expected, actual: plaintexts.len() });
    }

    let expected = params.public_key_count();
    if request.public_keys.len() != expected {
        return Err(OtError::InvalidPublicKeyCount {
            expected,
            actual: request.public_keys.len(),
        });
    }

    if let Some((index, plaintext)) =
        plaintexts.iter().enumerate().find(|(_, p)| p.as_ref().len() > MAX_MASK_LEN)
    {
        return Err(OtError::PlaintextTooLong {
            index,
            len: plaintext.as_ref().len(),
            max: MAX_MASK_LEN,
        });
    }

    let layers = usize::from(params.layers);
    let recipients = decode_public_keys(params, request)?;

    // branch_keys[layer][bit]
    let branch_keys: Vec<[BranchKey; 2]> = (0..layers)
        .map(|_| [random_branch_key(params, rng), random_branch_key(params, rng)])
        .collect();

    let mut encrypted_key_pairs = Vec::with_capacity(layers);
    for (layer, [zero, one]) in branch_keys.iter().enumerate() {
        let zero_key = &recipients[params.key_index(layer, false)];
        let one_key = &recipients[params.key_index(layer, true)];
        encrypted_key_pairs.push(EncryptedBranchPair {
            zero: seal_branch(zero_key, zero, layer, false, rng)?,
            one: seal_branch(one_key, one, layer, true, rng)?,
        });
    }

    let mut ciphertexts = Vec::with_capacity(plaintexts.len());
    for (index, plaintext) in plaintexts.iter().enumerate() {
        let Ok(choice) = Choice::new(index as u32, params.layers) else {
            unreachable!("message index is below 2^k");
        };

        let selected =
            choice.bits().enumerate().map(|(layer, bit)| &branch_keys[layer][usize::from(bit)]);
        let Ok(combined) = CombinedKey::combine(selected) else {
            unreachable!("at least one layer and all branch keys share key_len");
        };
        let Ok(ciphertext) = combined.apply(plaintext.as_ref()) else {
            unreachable!("message lengths were checked against the mask limit");
        };

        ciphertexts.push(ciphertext);
    }

    let response = OtResponse { encrypted_key_pairs, ciphertexts };

    let Ok(size) = response.encoded_len() else {
        unreachable!("byte vectors always serialize");
    };
    if size > MAX_MESSAGE_SIZE {
        warn!(size, max = MAX_MESSAGE_SIZE, "rejecting request: response too large to send");
        return Err(OtError::ResponseTooLarge { size, max: MAX_MESSAGE_SIZE });
    }

    debug!(
        layers,
        messages = response.ciphertexts.len(),
        size,
        key_layout = ?params.key_layout,
        "produced transfer response"
    );

    Ok(response)
}

fn decode_public_keys(
    params: &OtParams,
    request: &OtRequest,
) -> Result<Vec<LayerPublicKey>, OtError> {
    let per_layer = params.key_layout.keys_per_layer();

    request
        .public_keys
        .iter()
        .enumerate()
        .map(|(position, bytes)| {
            LayerPublicKey::from_bytes(bytes).map_err(|source| OtError::EncryptionFailure {
                layer: position / per_layer,
                branch: u8::from(per_layer == 2 && position % 2 == 1),
                source,
            })
        })
        .collect()
}

fn random_branch_key<R: CryptoRng + RngCore>(params: &OtParams, rng: &mut R) -> BranchKey {
    let mut key = vec![0u8; params.key_len];
    rng.fill_bytes(&mut key);
    BranchKey::from_bytes(key)
}

fn seal_branch<R: CryptoRng + RngCore>(
    recipient: &LayerPublicKey,
    key: &BranchKey,
    layer: usize,
    bit: bool,
    rng: &mut R,
) -> Result<Vec<u8>, OtError> {
    let mut randomness =
        SealRandomness { ephemeral: [0u8; SECRET_KEY_SIZE], nonce: [0u8; NONCE_SIZE] };
    rng.fill_bytes(&mut randomness.ephemeral);
    rng.fill_bytes(&mut randomness.nonce);

    hybrid::seal(recipient, key.as_bytes(), &randomness).map_err(|source| {
        OtError::EncryptionFailure { layer, branch: u8::from(bit), source }
    })
}
