//! Hybrid public-key sealing of branch keys.
//!
//! X25519 key agreement with a fresh ephemeral key, HKDF-SHA256 to derive a
//! one-time AEAD key, `XChaCha20-Poly1305` to seal the payload. All functions
//! are pure - the ephemeral secret and nonce are provided by the caller.
//!
//! Sealed box layout:
//!
//! ```text
//! [ephemeral_pk: 32][nonce: 24][ciphertext: len(plaintext)][tag: 16]
//! ```

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Size of an encoded X25519 public key
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of the random material behind an X25519 secret key
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of the `XChaCha20` nonce
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const TAG_SIZE: usize = 16;

/// Bytes a sealed box adds on top of its plaintext
pub const SEAL_OVERHEAD: usize = PUBLIC_KEY_SIZE + NONCE_SIZE + TAG_SIZE;

/// Label used for seal key derivation
const SEAL_LABEL: &[u8] = b"xorbitSealV1";

/// Public half of a layer key pair.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LayerPublicKey(PublicKey);

impl LayerPublicKey {
    /// Parse the canonical 32-byte encoding.
    ///
    /// # Errors
    ///
    /// - `MalformedPublicKey` if `bytes` is not exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; PUBLIC_KEY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::MalformedPublicKey { len: bytes.len() })?;
        Ok(Self(PublicKey::from(raw)))
    }

    /// Canonical encoding, as carried on the wire and hashed into the
    /// commitment.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Borrowed canonical encoding.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for LayerPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LayerPublicKey({})", hex::encode(self.as_bytes()))
    }
}

/// X25519 key pair owned by one receiver layer (or one branch of a layer).
///
/// The secret half zeroizes itself on drop.
pub struct LayerKeyPair {
    secret: StaticSecret,
    public: LayerPublicKey,
}

impl LayerKeyPair {
    /// Build a key pair from caller-provided random bytes.
    ///
    /// Caller MUST provide cryptographically secure random bytes in
    /// production.
    pub fn from_random(random: [u8; SECRET_KEY_SIZE]) -> Self {
        let random = Zeroizing::new(random);
        let secret = StaticSecret::from(*random);
        let public = LayerPublicKey(PublicKey::from(&secret));
        Self { secret, public }
    }

    /// Public half.
    pub fn public_key(&self) -> &LayerPublicKey {
        &self.public
    }
}

impl std::fmt::Debug for LayerKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerKeyPair")
            .field("public", &self.public)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Caller-provided randomness consumed by one [`seal`] call.
pub struct SealRandomness {
    /// Random bytes for the ephemeral X25519 secret
    pub ephemeral: [u8; SECRET_KEY_SIZE],
    /// Random `XChaCha20` nonce
    pub nonce: [u8; NONCE_SIZE],
}

impl Drop for SealRandomness {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.ephemeral);
    }
}

/// Seal `plaintext` to `recipient`.
///
/// # Security
///
/// - Fresh ephemeral key per box; reusing `randomness` across calls breaks
///   confidentiality
/// - AEAD key is bound to both the ephemeral and the recipient public key
/// - Caller MUST provide cryptographically secure random bytes in production
///
/// # Errors
///
/// - `NonContributory` if `recipient` is a low-order point
pub fn seal(
    recipient: &LayerPublicKey,
    plaintext: &[u8],
    randomness: &SealRandomness,
) -> Result<Vec<u8>, CryptoError> {
    let ephemeral = StaticSecret::from(randomness.ephemeral);
    let ephemeral_public = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&recipient.0);
    if !shared.was_contributory() {
        return Err(CryptoError::NonContributory);
    }

    let key = derive_seal_key(shared.as_bytes(), ephemeral_public.as_bytes(), recipient.as_bytes());
    let cipher = XChaCha20Poly1305::new((&*key).into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&randomness.nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut sealed = Vec::with_capacity(PUBLIC_KEY_SIZE + NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(ephemeral_public.as_bytes());
    sealed.extend_from_slice(&randomness.nonce);
    sealed.extend_from_slice(&ciphertext);

    Ok(sealed)
}

/// Open a sealed box with the recipient's key pair.
///
/// Returns the plaintext in a buffer that is wiped on drop.
///
/// # Errors
///
/// - `MalformedCiphertext` if the box is shorter than [`SEAL_OVERHEAD`]
/// - `NonContributory` if the embedded ephemeral key is a low-order point
/// - `AuthenticationFailed` if the tag does not verify
pub fn open(recipient: &LayerKeyPair, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(CryptoError::MalformedCiphertext { len: sealed.len(), min: SEAL_OVERHEAD });
    }

    let (ephemeral_bytes, rest) = sealed.split_at(PUBLIC_KEY_SIZE);
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    let ephemeral_public = LayerPublicKey::from_bytes(ephemeral_bytes)?;
    let shared = recipient.secret.diffie_hellman(&ephemeral_public.0);
    if !shared.was_contributory() {
        return Err(CryptoError::NonContributory);
    }

    let key = derive_seal_key(
        shared.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.public.as_bytes(),
    );
    let cipher = XChaCha20Poly1305::new((&*key).into());

    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Derive the one-time AEAD key for a sealed box.
///
/// info = label || ephemeral public key || recipient public key
fn derive_seal_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; PUBLIC_KEY_SIZE],
    recipient_public: &[u8; PUBLIC_KEY_SIZE],
) -> Zeroizing<[u8; 32]> {
    let hkdf = Hkdf::<Sha256>::new(None, shared_secret);

    // Capacity: 12 (label) + 32 (ephemeral) + 32 (recipient) = 76
    let mut info = Vec::with_capacity(SEAL_LABEL.len() + 2 * PUBLIC_KEY_SIZE);
    info.extend_from_slice(SEAL_LABEL);
    info.extend_from_slice(ephemeral_public);
    info.extend_from_slice(recipient_public);

    let mut key = Zeroizing::new([0u8; 32]);
    let Ok(()) = hkdf.expand(&info, &mut key[..]) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    key
}
