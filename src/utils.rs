// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Facade over the prime-order group used by the sigma protocols: the
//! [secp256k1](https://en.bitcoin.it/wiki/Secp256k1) curve as implemented by
//! the `k256` crate, plus the fixed-width scalar and point codecs every wire
//! format in this crate shares.

use crate::{
    errors::{Result, SigmaError},
    parameters::{GROUP_ORDER_BYTES, GROUP_POINT_BYTES},
};
use k256::{
    elliptic_curve::{
        group::ff::{Field, PrimeField},
        sec1::{FromEncodedPoint, ToEncodedPoint},
    },
    AffinePoint, EncodedPoint, ProjectivePoint, Scalar,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wrapper around k256::ProjectivePoint so that we can define our own
/// serialization/deserialization for it
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CurvePoint(pub(crate) k256::ProjectivePoint);

impl CurvePoint {
    /// The group generator `g`.
    pub const GENERATOR: Self = CurvePoint(k256::ProjectivePoint::GENERATOR);
    /// The identity point. Encoded as the all-zero byte string.
    pub const IDENTITY: Self = CurvePoint(k256::ProjectivePoint::IDENTITY);

    /// Multiply `self` by a scalar.
    pub fn multiply_by_scalar(&self, scalar: &Scalar) -> Self {
        Self(self.0 * scalar)
    }

    /// Return the inverse of `self` in the group.
    pub fn negate(&self) -> Self {
        Self(-self.0)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == ProjectivePoint::IDENTITY
    }

    /// Encode the point in its normalized affine form: a sign byte followed
    /// by the x-coordinate, or all zeroes for the identity.
    pub fn to_bytes(self) -> [u8; GROUP_POINT_BYTES] {
        let mut bytes = [0u8; GROUP_POINT_BYTES];
        if !self.is_identity() {
            let encoded = self.0.to_affine().to_encoded_point(true);
            bytes.copy_from_slice(encoded.as_bytes());
        }
        bytes
    }

    /// Decode a point from the 33-byte affine encoding produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// Fails with [`SigmaError::InvalidEncoding`] unless the input is the
    /// all-zero identity string or a sign byte in `{0x02, 0x03}` followed by
    /// the x-coordinate of a curve point.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != GROUP_POINT_BYTES {
            return Err(SigmaError::InvalidEncoding);
        }
        if bytes.iter().all(|&b| b == 0) {
            return Ok(Self::IDENTITY);
        }
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(SigmaError::InvalidEncoding);
        }
        let encoded =
            EncodedPoint::from_bytes(bytes).map_err(|_| SigmaError::InvalidEncoding)?;
        let point: Option<AffinePoint> = Option::from(AffinePoint::from_encoded_point(&encoded));
        match point {
            Some(p) => Ok(Self(p.into())),
            None => Err(SigmaError::InvalidEncoding),
        }
    }
}

impl From<k256::ProjectivePoint> for CurvePoint {
    fn from(p: k256::ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for CurvePoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let afp = AffinePoint::from(self.0);
        afp.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let p = AffinePoint::deserialize(deserializer)?;
        Ok(Self(p.into()))
    }
}

/// Sample a scalar uniformly at random from `[0, q)`.
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(rng)
}

/// Encode a scalar in exactly [`GROUP_ORDER_BYTES`] bytes, big-endian.
pub(crate) fn scalar_to_bytes(scalar: &Scalar) -> [u8; GROUP_ORDER_BYTES] {
    let mut bytes = [0u8; GROUP_ORDER_BYTES];
    bytes.copy_from_slice(&scalar.to_bytes());
    bytes
}

/// Decode a scalar from its big-endian fixed-width encoding. Values at or
/// above the group order are rejected so that every scalar has exactly one
/// wire form.
pub(crate) fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() != GROUP_ORDER_BYTES {
        return Err(SigmaError::Serialization);
    }
    let repr = k256::FieldBytes::clone_from_slice(bytes);
    Option::from(Scalar::from_repr(repr)).ok_or(SigmaError::Serialization)
}

////////////////////////////
// Test Utility Functions //
////////////////////////////
#[cfg(test)]
pub(crate) mod testing {
    use rand::{
        rngs::{OsRng, StdRng},
        Rng, SeedableRng,
    };

    /// Returns an rng to be used for testing. This will print the rng seed
    /// to stderr so that if a test fails, the failing seed can be recovered
    /// and used for debugging.
    pub(crate) fn init_testing() -> StdRng {
        let mut seeder = OsRng;
        let seed = seeder.gen();
        eprintln!("seed: {seed:?}");
        StdRng::from_seed(seed)
    }
}
