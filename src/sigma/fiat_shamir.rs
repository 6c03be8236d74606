// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Fiat-Shamir challenge derivation.
//!
//! The root challenge binds, in this order: every leaf commitment in
//! depth-first left-to-right traversal, the proposition bytes, and the
//! message being signed. The hash output is truncated to the challenge
//! width, keeping the high bytes.

use crate::{parameters::SOUNDNESS_BYTES, sigma::challenge::Challenge};
use sha2::{Digest, Sha256};

/// Derive the root challenge from the commitment stream, the proposition
/// encoding, and the message.
pub(crate) fn root_challenge(
    commitments: &[u8],
    prop_bytes: &[u8],
    message: &[u8],
) -> Challenge {
    let mut hasher = Sha256::new();
    hasher.update(commitments);
    hasher.update(prop_bytes);
    hasher.update(message);
    let digest = hasher.finalize();
    let mut bytes = [0u8; SOUNDNESS_BYTES];
    bytes.copy_from_slice(&digest[..SOUNDNESS_BYTES]);
    Challenge::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_deterministic() {
        let a = root_challenge(b"commitments", b"prop", b"message");
        let b = root_challenge(b"commitments", b"prop", b"message");
        assert_eq!(a, b);
    }

    #[test]
    fn every_input_slot_binds() {
        let base = root_challenge(b"commitments", b"prop", b"message");
        assert_ne!(base, root_challenge(b"commitmentsX", b"prop", b"message"));
        assert_ne!(base, root_challenge(b"commitments", b"propX", b"message"));
        assert_ne!(base, root_challenge(b"commitments", b"prop", b"messageX"));
    }

    #[test]
    fn truncation_keeps_the_high_bytes() {
        let challenge = root_challenge(b"", b"", b"abc");
        let full = Sha256::digest(b"abc");
        assert_eq!(challenge.as_bytes()[..], full[..SOUNDNESS_BYTES]);
    }
}
