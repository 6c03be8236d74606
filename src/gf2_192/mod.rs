// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Arithmetic in the binary field GF(2^192), represented modulo the
//! pentanomial `x^192 + x^7 + x^2 + x + 1`. Threshold connectives split
//! their challenge among children by evaluating a polynomial over this
//! field, so field elements are exactly one challenge wide.
//!
//! Elements are held as three 64-bit limbs, least-significant limb first.
//! Multiplication runs a fixed shift-and-mask schedule with no
//! data-dependent branches.

pub(crate) mod poly;

pub use poly::Gf192Poly;

use crate::{
    errors::{Result, SigmaError},
    parameters::SOUNDNESS_BYTES,
};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Reduction constant: the low bits of `x^192 + x^7 + x^2 + x + 1`.
const PENTANOMIAL: u64 = 0x87;

const LIMBS: usize = 3;

/// An element of GF(2^192).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gf192 {
    word: [u64; LIMBS],
}

impl Gf192 {
    pub const ZERO: Self = Self { word: [0; LIMBS] };
    pub const ONE: Self = Self { word: [1, 0, 0] };

    /// Embed a byte as a field element.
    pub fn from_byte(value: u8) -> Self {
        Self {
            word: [u64::from(value), 0, 0],
        }
    }

    /// Decode an element from its fixed-width big-endian form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SOUNDNESS_BYTES {
            return Err(SigmaError::Serialization);
        }
        let mut word = [0u64; LIMBS];
        for (i, limb) in word.iter_mut().enumerate() {
            let start = (LIMBS - 1 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        Ok(Self { word })
    }

    /// Encode the element in exactly [`SOUNDNESS_BYTES`] bytes, big-endian.
    pub fn to_bytes(self) -> [u8; SOUNDNESS_BYTES] {
        let mut bytes = [0u8; SOUNDNESS_BYTES];
        for (i, limb) in self.word.iter().enumerate() {
            let start = (LIMBS - 1 - i) * 8;
            bytes[start..start + 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    pub fn is_zero(&self) -> bool {
        self.word == [0; LIMBS]
    }

    pub fn square(self) -> Self {
        self * self
    }

    /// Multiplicative inverse, computed as `self^(2^192 - 2)`. The inverse
    /// of zero is defined as zero.
    pub fn invert(self) -> Self {
        // The exponent is 191 one-bits followed by a zero-bit, so square-and-
        // multiply reduces to a fixed chain: t = self^(2^191 - 1), then one
        // final squaring.
        let mut t = self;
        for _ in 0..190 {
            t = t.square() * self;
        }
        t.square()
    }
}

impl Add for Gf192 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut word = self.word;
        for (w, r) in word.iter_mut().zip(rhs.word.iter()) {
            *w ^= r;
        }
        Self { word }
    }
}

impl Mul for Gf192 {
    type Output = Self;

    /// Shift-and-mask multiplication: 192 fixed iterations, selection by
    /// mask rather than branch.
    fn mul(self, rhs: Self) -> Self {
        let mut res = [0u64; LIMBS];
        let mut shifted = self.word;
        for &limb in rhs.word.iter() {
            let mut limb = limb;
            for _ in 0..64 {
                let mask = (limb & 1).wrapping_neg();
                res[0] ^= shifted[0] & mask;
                res[1] ^= shifted[1] & mask;
                res[2] ^= shifted[2] & mask;
                limb >>= 1;
                // multiply the running value by x, folding the overflow bit
                // back in through the pentanomial
                let carry = shifted[2] >> 63;
                shifted[2] = (shifted[2] << 1) | (shifted[1] >> 63);
                shifted[1] = (shifted[1] << 1) | (shifted[0] >> 63);
                shifted[0] = (shifted[0] << 1) ^ (carry.wrapping_neg() & PENTANOMIAL);
            }
        }
        Self { word: res }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_elem<R: Rng>(rng: &mut R) -> Gf192 {
        let mut bytes = [0u8; SOUNDNESS_BYTES];
        rng.fill(&mut bytes[..]);
        Gf192::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn byte_codec_round_trip() {
        let mut rng = crate::utils::testing::init_testing();
        for _ in 0..64 {
            let a = random_elem(&mut rng);
            assert_eq!(Gf192::from_bytes(&a.to_bytes()).unwrap(), a);
        }
    }

    #[test]
    fn addition_is_xor_and_self_inverse() {
        let mut rng = crate::utils::testing::init_testing();
        let a = random_elem(&mut rng);
        let b = random_elem(&mut rng);
        assert_eq!(a + b, b + a);
        assert_eq!(a + a, Gf192::ZERO);
        assert_eq!(a + Gf192::ZERO, a);
    }

    #[test]
    fn one_is_the_multiplicative_identity() {
        let mut rng = crate::utils::testing::init_testing();
        let a = random_elem(&mut rng);
        assert_eq!(a * Gf192::ONE, a);
        assert_eq!(Gf192::ONE * a, a);
        assert_eq!(a * Gf192::ZERO, Gf192::ZERO);
    }

    #[test]
    fn multiplication_is_commutative_and_associative() {
        let mut rng = crate::utils::testing::init_testing();
        for _ in 0..16 {
            let a = random_elem(&mut rng);
            let b = random_elem(&mut rng);
            let c = random_elem(&mut rng);
            assert_eq!(a * b, b * a);
            assert_eq!((a * b) * c, a * (b * c));
            // distributivity over addition
            assert_eq!(a * (b + c), a * b + a * c);
        }
    }

    #[test]
    fn x_to_the_192_reduces_to_the_pentanomial() {
        // multiply x^191 by x and expect x^7 + x^2 + x + 1
        let x = Gf192::from_byte(2);
        let mut high = Gf192::ONE;
        for _ in 0..191 {
            high = high * x;
        }
        assert_eq!(high.word, [0, 0, 1 << 63]);
        let reduced = high * x;
        assert_eq!(reduced, Gf192 { word: [0x87, 0, 0] });
    }

    #[test]
    fn inversion() {
        let mut rng = crate::utils::testing::init_testing();
        for _ in 0..8 {
            let a = random_elem(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.invert(), Gf192::ONE);
        }
        assert_eq!(Gf192::ZERO.invert(), Gf192::ZERO);
        assert_eq!(Gf192::ONE.invert(), Gf192::ONE);
    }
}
