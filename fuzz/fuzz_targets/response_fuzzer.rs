//! Fuzz target for ReceiverSession::receive and open_branch
//!
//! Builds an honest request and response, then lets the fuzzer corrupt the
//! response: flip bytes in sealed keys or ciphertexts, truncate boxes, drop
//! or duplicate layers and ciphertexts.
//!
//! # Invariants
//!
//! - receive and open_branch NEVER panic
//! - an untouched response always yields the chosen message

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use xorbit_core::{Choice, KeyLayout, OtParams, ot_request, ot_send};

#[derive(Debug, Clone, Arbitrary)]
enum Corruption {
    FlipSealed { layer: u8, one: bool, position: u16, mask: u8 },
    TruncateSealed { layer: u8, one: bool, len: u8 },
    FlipCiphertext { index: u8, position: u16, mask: u8 },
    DropLayer,
    DuplicateLayer,
    DropCiphertext,
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    seed: u64,
    layers: u8,
    choice: u16,
    per_branch: bool,
    audit_layer: u8,
    audit_bit: bool,
    corruptions: Vec<Corruption>,
}

fuzz_target!(|input: Input| {
    let layers = input.layers % 4 + 1;
    let layout = if input.per_branch { KeyLayout::PerBranch } else { KeyLayout::SharedPerLayer };
    let params = OtParams::with_layers(layers).with_key_layout(layout);
    let index = u32::from(input.choice) % (1u32 << layers);

    let mut rng = ChaCha20Rng::seed_from_u64(input.seed);
    let plaintexts: Vec<Vec<u8>> =
        (0..params.message_count()).map(|i| format!("msg-{i}").into_bytes()).collect();

    let choice = Choice::new(index, layers).unwrap();
    let (session, request) = ot_request(&params, choice, &mut rng).unwrap();
    let mut response = ot_send(&params, &plaintexts, &request, &mut rng).unwrap();

    let untouched = input.corruptions.is_empty();
    for corruption in input.corruptions.into_iter().take(8) {
        let pairs = response.encrypted_key_pairs.len().max(1);
        match corruption {
            Corruption::FlipSealed { layer, one, position, mask } => {
                let layer = usize::from(layer) % pairs;
                if let Some(pair) = response.encrypted_key_pairs.get_mut(layer) {
                    let sealed = if one { &mut pair.one } else { &mut pair.zero };
                    if !sealed.is_empty() {
                        let len = sealed.len();
                        sealed[usize::from(position) % len] ^= mask;
                    }
                }
            },
            Corruption::TruncateSealed { layer, one, len } => {
                let layer = usize::from(layer) % pairs;
                if let Some(pair) = response.encrypted_key_pairs.get_mut(layer) {
                    let sealed = if one { &mut pair.one } else { &mut pair.zero };
                    sealed.truncate(usize::from(len));
                }
            },
            Corruption::FlipCiphertext { index, position, mask } => {
                let count = response.ciphertexts.len().max(1);
                if let Some(ciphertext) = response.ciphertexts.get_mut(usize::from(index) % count) {
                    if !ciphertext.is_empty() {
                        let len = ciphertext.len();
                        ciphertext[usize::from(position) % len] ^= mask;
                    }
                }
            },
            Corruption::DropLayer => {
                response.encrypted_key_pairs.pop();
            },
            Corruption::DuplicateLayer => {
                if let Some(pair) = response.encrypted_key_pairs.first().cloned() {
                    response.encrypted_key_pairs.push(pair);
                }
            },
            Corruption::DropCiphertext => {
                response.ciphertexts.pop();
            },
        }
    }

    let _ = session.open_branch(&response, usize::from(input.audit_layer), input.audit_bit);

    let result = session.receive(&response);
    if untouched {
        assert_eq!(result.unwrap(), plaintexts[index as usize]);
    }
});
