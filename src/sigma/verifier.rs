// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Signature verification.
//!
//! Verification parses the proof into an unchecked tree (rebuilding every
//! leaf commitment from its challenge and response), recomputes the
//! Fiat-Shamir root challenge over those commitments, and accepts exactly
//! when it matches the root challenge stored in the proof. The final
//! comparison is constant-time; which subtree caused a mismatch is never
//! reported.

use crate::{
    errors::{Result, SigmaError},
    sigma::{
        fiat_shamir,
        sig_serializer::{parse_sig, NoOpObserver, ParseObserver},
        SigmaBoolean,
    },
};
use tracing::error;

/// Check a signature over `message` against `proposition`.
///
/// Returns `Ok(())` on acceptance. A structurally broken proof fails with
/// [`SigmaError::MalformedProof`]; a well-formed proof that does not match
/// fails with [`SigmaError::InvalidSignature`].
pub fn verify_signature(
    proposition: &SigmaBoolean,
    message: &[u8],
    proof: &[u8],
) -> Result<()> {
    verify_signature_with_observer(proposition, message, proof, &mut NoOpObserver)
}

/// As [`verify_signature`], feeding each parsed proof node to `observer`.
pub fn verify_signature_with_observer(
    proposition: &SigmaBoolean,
    message: &[u8],
    proof: &[u8],
    observer: &mut dyn ParseObserver,
) -> Result<()> {
    let (tree, consumed) = parse_sig(proposition, proof, observer)?;
    if consumed != proof.len() {
        error!("proof carries trailing bytes");
        return Err(SigmaError::MalformedProof);
    }
    let root_challenge = match tree.challenge() {
        Some(challenge) => challenge,
        // an empty proof never satisfies a proposition that requires one
        None => return Err(SigmaError::InvalidSignature),
    };

    let mut commitments = Vec::new();
    tree.append_commitments(&mut commitments)?;
    let expected =
        fiat_shamir::root_challenge(&commitments, &proposition.prop_bytes(), message);

    if !expected.ct_eq(&root_challenge) {
        error!("recomputed root challenge does not match the proof");
        return Err(SigmaError::InvalidSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sigma::prover::{DlogProverInput, PrivateInput, Prover},
        utils::testing::init_testing,
    };

    #[test]
    fn empty_proof_is_rejected() {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let prop: SigmaBoolean = secret.public_image().into();
        assert_eq!(
            verify_signature(&prop, b"message", &[]).unwrap_err(),
            SigmaError::InvalidSignature
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() -> Result<()> {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let prop: SigmaBoolean = secret.public_image().into();
        let prover = Prover::new(vec![PrivateInput::Dlog(secret)]);
        let mut proof = prover.sign(&prop, b"message", &mut rng)?;
        verify_signature(&prop, b"message", &proof)?;
        proof.push(0);
        assert_eq!(
            verify_signature(&prop, b"message", &proof).unwrap_err(),
            SigmaError::MalformedProof
        );
        Ok(())
    }

    #[test]
    fn invalid_proposition_is_reported_as_such() {
        let mut rng = init_testing();
        let leaf: SigmaBoolean = DlogProverInput::random(&mut rng).public_image().into();
        let bad = SigmaBoolean::Cand(vec![leaf]);
        assert_eq!(
            verify_signature(&bad, b"message", &[0u8; 56]).unwrap_err(),
            SigmaError::InvalidProposition
        );
    }
}
