// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The fixed-width sigma-protocol challenge.
//!
//! Challenges are 24-byte strings equipped with XOR: an OR node's challenge
//! is the XOR of its children's, and a threshold node's challenges are
//! values of a GF(2^192) polynomial, so challenges convert losslessly to
//! and from field elements.

use crate::{
    errors::{Result, SigmaError},
    gf2_192::Gf192,
    parameters::SOUNDNESS_BYTES,
    serialization::SigmaByteReader,
};
use k256::Scalar;
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A `soundnessBits`-wide challenge (`e` in the protocol descriptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge([u8; SOUNDNESS_BYTES]);

impl Challenge {
    pub fn from_bytes(bytes: [u8; SOUNDNESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SOUNDNESS_BYTES] {
        &self.0
    }

    /// Bitwise XOR with another challenge.
    pub fn xor(&self, other: &Challenge) -> Challenge {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0.iter()) {
            *o ^= b;
        }
        Challenge(out)
    }

    /// Sample a challenge uniformly at random (used when simulating).
    pub(crate) fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SOUNDNESS_BYTES];
        rng.fill(&mut bytes[..]);
        Self(bytes)
    }

    pub(crate) fn read(reader: &mut SigmaByteReader) -> Result<Self> {
        Ok(Self(reader.read_array::<SOUNDNESS_BYTES>()?))
    }

    /// Interpret the challenge as a positive big-endian integer reduced into
    /// the scalar field. Challenges are 192 bits and the group order is 256
    /// bits, so the value is always canonical.
    pub(crate) fn to_scalar(&self) -> Result<Scalar> {
        let mut wide = [0u8; 32];
        wide[32 - SOUNDNESS_BYTES..].copy_from_slice(&self.0);
        crate::utils::scalar_from_bytes(&wide).map_err(|_| SigmaError::InternalInvariantFailed)
    }

    /// Constant-time equality: the comparison consumes every byte no matter
    /// where the first difference sits.
    pub(crate) fn ct_eq(&self, other: &Challenge) -> bool {
        let mut diff = 0u8;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

impl From<Gf192> for Challenge {
    fn from(elem: Gf192) -> Self {
        Self(elem.to_bytes())
    }
}

impl From<&Challenge> for Gf192 {
    fn from(challenge: &Challenge) -> Self {
        // a challenge is exactly one field element wide
        Gf192::from_bytes(&challenge.0).unwrap_or(Gf192::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;

    #[test]
    fn xor_laws() {
        let mut rng = init_testing();
        let a = Challenge::random(&mut rng);
        let b = Challenge::random(&mut rng);
        assert_eq!(a.xor(&b), b.xor(&a));
        assert_eq!(a.xor(&a), Challenge::from_bytes([0u8; SOUNDNESS_BYTES]));
        assert_eq!(a.xor(&b).xor(&b), a);
    }

    #[test]
    fn field_element_round_trip() {
        let mut rng = init_testing();
        let c = Challenge::random(&mut rng);
        let elem = Gf192::from(&c);
        assert_eq!(Challenge::from(elem), c);
    }

    #[test]
    fn scalar_conversion_is_injective_on_samples() -> Result<()> {
        let mut rng = init_testing();
        let a = Challenge::random(&mut rng);
        let b = Challenge::random(&mut rng);
        if a != b {
            assert_ne!(a.to_scalar()?, b.to_scalar()?);
        }
        Ok(())
    }

    #[test]
    fn ct_eq_matches_eq() {
        let mut rng = init_testing();
        let a = Challenge::random(&mut rng);
        let mut b = a;
        assert!(a.ct_eq(&b));
        b = b.xor(&Challenge::from_bytes({
            let mut one = [0u8; SOUNDNESS_BYTES];
            one[SOUNDNESS_BYTES - 1] = 1;
            one
        }));
        assert!(!a.ct_eq(&b));
    }
}
