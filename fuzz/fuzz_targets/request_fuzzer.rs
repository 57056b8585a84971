//! Fuzz target for ot_send on attacker-controlled requests
//!
//! The sender faces requests built by an untrusted receiver: arbitrary key
//! bytes, key counts and commitments. When the fuzzer asks for it, the
//! commitment is recomputed so the input gets past the first check and
//! reaches key decoding and sealing.
//!
//! # Invariants
//!
//! - ot_send NEVER panics
//! - a wrong commitment is always rejected before anything else
//! - a successful response always has k pairs and 2^k ciphertexts

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use xorbit_core::{KeyLayout, OtError, OtParams, ot_send};
use xorbit_crypto::commit;
use xorbit_proto::OtRequest;

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    seed: u64,
    per_branch: bool,
    public_keys: Vec<Vec<u8>>,
    commitment: Vec<u8>,
    fix_commitment: bool,
    message_count: u8,
}

fuzz_target!(|input: Input| {
    let layout = if input.per_branch { KeyLayout::PerBranch } else { KeyLayout::SharedPerLayer };
    let params = OtParams::default().with_key_layout(layout);

    let public_keys: Vec<Vec<u8>> = input.public_keys.into_iter().take(8).collect();
    let commitment = if input.fix_commitment {
        commit(&public_keys).as_bytes().to_vec()
    } else {
        input.commitment
    };
    let commitment_valid = commit(&public_keys).verify(&commitment);

    let request = OtRequest { public_keys, commitment };
    let plaintexts: Vec<Vec<u8>> =
        (0..usize::from(input.message_count % 12)).map(|i| vec![i as u8; i]).collect();

    let mut rng = ChaCha20Rng::seed_from_u64(input.seed);
    match ot_send(&params, &plaintexts, &request, &mut rng) {
        Ok(response) => {
            assert!(commitment_valid);
            assert_eq!(response.encrypted_key_pairs.len(), usize::from(params.layers));
            assert_eq!(response.ciphertexts.len(), params.message_count());
        },
        Err(OtError::CommitmentMismatch) => assert!(!commitment_valid),
        Err(_) => assert!(commitment_valid),
    }
});
