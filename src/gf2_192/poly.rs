// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Polynomials over GF(2^192).
//!
//! A threshold node splitting a challenge among `n` children keeps a
//! polynomial of degree exactly `n - k`: the constant term is the node's own
//! challenge and child `i` receives the value at `i + 1`. The constant term
//! is therefore never serialized; the wire form is the `n - k` remaining
//! coefficients in ascending degree order.

use super::Gf192;
use crate::{
    errors::{Result, SigmaError},
    parameters::SOUNDNESS_BYTES,
};
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A polynomial over GF(2^192), coefficients in ascending degree order.
/// The coefficient vector is never empty and its length is significant:
/// high zero coefficients are kept so that the serialized width stays
/// `degree * SOUNDNESS_BYTES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gf192Poly {
    coeffs: Vec<Gf192>,
}

impl Gf192Poly {
    /// The degree-zero polynomial with the given value everywhere.
    pub fn constant(value: Gf192) -> Self {
        Self {
            coeffs: vec![value],
        }
    }

    /// Declared degree (the length of the coefficient vector, not the
    /// index of the highest nonzero coefficient).
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// The constant term, i.e. the value at zero.
    pub fn value_at_zero(&self) -> Gf192 {
        self.coeffs[0]
    }

    /// Evaluate at an integer point via Horner's rule.
    pub fn evaluate(&self, point: u8) -> Gf192 {
        self.evaluate_elem(Gf192::from_byte(point))
    }

    fn evaluate_elem(&self, x: Gf192) -> Gf192 {
        let mut acc = Gf192::ZERO;
        for &c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// The unique polynomial of degree at most `points.len()` passing
    /// through `(points[i], values[i])` for all `i` and through
    /// `(0, value_at_zero)`.
    ///
    /// Points must be nonzero and pairwise distinct; the two slices must
    /// have equal length. The returned coefficient vector always has length
    /// `points.len() + 1`.
    pub fn interpolate(points: &[u8], values: &[Gf192], value_at_zero: Gf192) -> Result<Self> {
        if points.len() != values.len() {
            return Err(SigmaError::InternalInvariantFailed);
        }
        for (i, p) in points.iter().enumerate() {
            if *p == 0 || points[..i].contains(p) {
                return Err(SigmaError::InternalInvariantFailed);
            }
        }
        if points.is_empty() {
            return Ok(Self::constant(value_at_zero));
        }

        // Incremental (Newton-style) interpolation: keep the polynomial
        // through the points seen so far together with the vanishing
        // polynomial of those points, then fold each new point in.
        let x0 = Gf192::from_byte(points[0]);
        let mut result = Self::constant(values[0]);
        let mut vanishing = Self {
            coeffs: vec![x0, Gf192::ONE],
        };
        for j in 1..=points.len() {
            let (x, y) = if j < points.len() {
                (Gf192::from_byte(points[j]), values[j])
            } else {
                (Gf192::ZERO, value_at_zero)
            };
            let missing = y + result.evaluate_elem(x);
            let scale = missing * vanishing.evaluate_elem(x).invert();
            result.add_scaled(&vanishing, scale);
            if j < points.len() {
                vanishing.multiply_by_linear_root(x);
            }
        }
        result.coeffs.resize(points.len() + 1, Gf192::ZERO);
        Ok(result)
    }

    /// Uniformly random polynomial of the given degree with a fixed
    /// constant term.
    pub fn random<R: RngCore + CryptoRng>(
        constant: Gf192,
        degree: usize,
        rng: &mut R,
    ) -> Self {
        let mut coeffs = Vec::with_capacity(degree + 1);
        coeffs.push(constant);
        for _ in 0..degree {
            let mut bytes = [0u8; SOUNDNESS_BYTES];
            rng.fill(&mut bytes[..]);
            // 24 random bytes are exactly one field element, so this
            // decode cannot fail
            coeffs.push(Gf192::from_bytes(&bytes).unwrap_or(Gf192::ZERO));
        }
        Self { coeffs }
    }

    /// Serialize every coefficient except the constant term, ascending
    /// degree, each in [`SOUNDNESS_BYTES`] bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.degree() * SOUNDNESS_BYTES);
        for c in &self.coeffs[1..] {
            out.extend_from_slice(&c.to_bytes());
        }
        out
    }

    /// Rebuild a polynomial from its non-constant coefficients and the
    /// externally known constant term.
    pub fn from_bytes(constant: Gf192, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % SOUNDNESS_BYTES != 0 {
            return Err(SigmaError::Serialization);
        }
        let mut coeffs = Vec::with_capacity(bytes.len() / SOUNDNESS_BYTES + 1);
        coeffs.push(constant);
        for chunk in bytes.chunks(SOUNDNESS_BYTES) {
            coeffs.push(Gf192::from_bytes(chunk)?);
        }
        Ok(Self { coeffs })
    }

    /// `self += other * scale`, extending the coefficient vector as needed.
    fn add_scaled(&mut self, other: &Self, scale: Gf192) {
        if self.coeffs.len() < other.coeffs.len() {
            self.coeffs.resize(other.coeffs.len(), Gf192::ZERO);
        }
        for (dst, src) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *dst = *dst + *src * scale;
        }
    }

    /// `self *= (x + root)`.
    fn multiply_by_linear_root(&mut self, root: Gf192) {
        self.coeffs.push(Gf192::ZERO);
        for i in (1..self.coeffs.len()).rev() {
            self.coeffs[i] = self.coeffs[i] * root + self.coeffs[i - 1];
        }
        self.coeffs[0] = self.coeffs[0] * root;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;
    use rand::rngs::StdRng;

    fn random_elem(rng: &mut StdRng) -> Gf192 {
        let mut bytes = [0u8; SOUNDNESS_BYTES];
        rng.fill(&mut bytes[..]);
        Gf192::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn interpolation_passes_through_all_points() -> Result<()> {
        let mut rng = init_testing();
        for n in 1usize..=6 {
            let points: Vec<u8> = (1..=n as u8).collect();
            let values: Vec<Gf192> = points.iter().map(|_| random_elem(&mut rng)).collect();
            let at_zero = random_elem(&mut rng);
            let poly = Gf192Poly::interpolate(&points, &values, at_zero)?;
            assert_eq!(poly.degree(), n);
            assert_eq!(poly.value_at_zero(), at_zero);
            assert_eq!(poly.evaluate(0), at_zero);
            for (p, v) in points.iter().zip(values.iter()) {
                assert_eq!(poly.evaluate(*p), *v);
            }
        }
        Ok(())
    }

    #[test]
    fn interpolation_with_no_points_is_constant() -> Result<()> {
        let mut rng = init_testing();
        let at_zero = random_elem(&mut rng);
        let poly = Gf192Poly::interpolate(&[], &[], at_zero)?;
        assert_eq!(poly.degree(), 0);
        assert_eq!(poly.evaluate(17), at_zero);
        assert!(poly.to_bytes().is_empty());
        Ok(())
    }

    #[test]
    fn interpolation_rejects_bad_point_sets() {
        let v = Gf192::ONE;
        assert!(Gf192Poly::interpolate(&[1, 1], &[v, v], v).is_err());
        assert!(Gf192Poly::interpolate(&[0], &[v], v).is_err());
        assert!(Gf192Poly::interpolate(&[1, 2], &[v], v).is_err());
    }

    #[test]
    fn byte_codec_round_trip_preserves_declared_degree() -> Result<()> {
        let mut rng = init_testing();
        let constant = random_elem(&mut rng);
        let poly = Gf192Poly::random(constant, 4, &mut rng);
        let bytes = poly.to_bytes();
        assert_eq!(bytes.len(), 4 * SOUNDNESS_BYTES);
        let back = Gf192Poly::from_bytes(constant, &bytes)?;
        assert_eq!(back, poly);
        // a trailing zero coefficient must survive the round trip
        let mut coeffs_zero_top = Gf192Poly::random(constant, 2, &mut rng);
        coeffs_zero_top.coeffs[2] = Gf192::ZERO;
        let bytes = coeffs_zero_top.to_bytes();
        assert_eq!(bytes.len(), 2 * SOUNDNESS_BYTES);
        assert_eq!(Gf192Poly::from_bytes(constant, &bytes)?, coeffs_zero_top);
        Ok(())
    }

    #[test]
    fn from_bytes_rejects_ragged_input() {
        let r = Gf192Poly::from_bytes(Gf192::ONE, &[0u8; SOUNDNESS_BYTES + 1]);
        assert_eq!(r.unwrap_err(), SigmaError::Serialization);
    }

    #[test]
    fn evaluation_matches_horner_by_hand() {
        // q(x) = 3 + 2x + x^2 over GF(2^192), evaluated at 2:
        // 3 + (2 * 2) + (2 * 2 * 2)  with field (carry-less) products
        let poly = Gf192Poly {
            coeffs: vec![
                Gf192::from_byte(3),
                Gf192::from_byte(2),
                Gf192::from_byte(1),
            ],
        };
        let x = Gf192::from_byte(2);
        let expected = Gf192::from_byte(3) + x * Gf192::from_byte(2) + x * x;
        assert_eq!(poly.evaluate(2), expected);
    }
}
