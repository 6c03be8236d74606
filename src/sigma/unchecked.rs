// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The unchecked tree: a sigma proposition annotated with per-node
//! challenges and per-leaf responses.
//!
//! The prover produces one (with commitments it generated), and the proof
//! parser reconstructs one (with commitments recomputed from challenge and
//! response). "Unchecked" means the root challenge has not yet been compared
//! against the Fiat-Shamir recomputation.

use crate::{
    errors::{Result, SigmaError},
    gf2_192::Gf192Poly,
    sigma::{challenge::Challenge, ProveDhTuple, ProveDlog, SigmaLeaf},
    utils::CurvePoint,
};
use k256::Scalar;

/// Commitment (first prover message) of a single leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstProverMessage {
    /// `a = g^r` for a discrete-log leaf.
    Dlog(CurvePoint),
    /// `(a, b) = (g^r, h^r)` for a Diffie-Hellman tuple leaf.
    DhTuple(CurvePoint, CurvePoint),
}

impl FirstProverMessage {
    /// Append the commitment's point encoding(s) to the Fiat-Shamir stream.
    pub(crate) fn append_bytes(&self, out: &mut Vec<u8>) {
        match self {
            FirstProverMessage::Dlog(a) => out.extend_from_slice(&a.to_bytes()),
            FirstProverMessage::DhTuple(a, b) => {
                out.extend_from_slice(&a.to_bytes());
                out.extend_from_slice(&b.to_bytes());
            }
        }
    }
}

/// A proven (or simulated) discrete-log leaf.
#[derive(Debug, Clone)]
pub struct UncheckedSchnorr {
    pub proposition: ProveDlog,
    pub commitment: Option<CurvePoint>,
    pub challenge: Challenge,
    pub response: Scalar,
}

/// A proven (or simulated) Diffie-Hellman tuple leaf.
#[derive(Debug, Clone)]
pub struct UncheckedDhTuple {
    pub proposition: ProveDhTuple,
    pub commitment: Option<(CurvePoint, CurvePoint)>,
    pub challenge: Challenge,
    pub response: Scalar,
}

/// A leaf of the unchecked tree.
#[derive(Debug, Clone)]
pub enum UncheckedLeaf {
    Schnorr(UncheckedSchnorr),
    DhTuple(UncheckedDhTuple),
}

impl UncheckedLeaf {
    pub fn challenge(&self) -> Challenge {
        match self {
            UncheckedLeaf::Schnorr(s) => s.challenge,
            UncheckedLeaf::DhTuple(d) => d.challenge,
        }
    }

    pub fn response(&self) -> Scalar {
        match self {
            UncheckedLeaf::Schnorr(s) => s.response,
            UncheckedLeaf::DhTuple(d) => d.response,
        }
    }

    /// The proposition this leaf proves.
    pub fn proposition(&self) -> SigmaLeaf {
        match self {
            UncheckedLeaf::Schnorr(s) => s.proposition.into(),
            UncheckedLeaf::DhTuple(d) => d.proposition.into(),
        }
    }

    pub(crate) fn commitment(&self) -> Option<FirstProverMessage> {
        match self {
            UncheckedLeaf::Schnorr(s) => s.commitment.map(FirstProverMessage::Dlog),
            UncheckedLeaf::DhTuple(d) => d
                .commitment
                .map(|(a, b)| FirstProverMessage::DhTuple(a, b)),
        }
    }
}

/// Conjunction node: every child carries the parent's challenge.
#[derive(Debug, Clone)]
pub struct CandUnchecked {
    pub challenge: Challenge,
    pub children: Vec<UncheckedTree>,
}

/// Disjunction node: the XOR of the children's challenges equals the
/// parent's.
#[derive(Debug, Clone)]
pub struct CorUnchecked {
    pub challenge: Challenge,
    pub children: Vec<UncheckedTree>,
}

/// k-of-n threshold node: child `i` carries `polynomial(i + 1)` and the
/// polynomial's constant term is the parent's challenge.
#[derive(Debug, Clone)]
pub struct CthresholdUnchecked {
    pub k: u8,
    pub challenge: Challenge,
    pub polynomial: Gf192Poly,
    pub children: Vec<UncheckedTree>,
}

/// A sigma proof before (or during) verification.
#[derive(Debug, Clone)]
pub enum UncheckedTree {
    /// The sentinel produced by an empty proof.
    NoProof,
    Leaf(UncheckedLeaf),
    Cand(CandUnchecked),
    Cor(CorUnchecked),
    Cthreshold(CthresholdUnchecked),
}

impl UncheckedTree {
    /// The node's challenge; `None` only for [`UncheckedTree::NoProof`].
    pub fn challenge(&self) -> Option<Challenge> {
        match self {
            UncheckedTree::NoProof => None,
            UncheckedTree::Leaf(leaf) => Some(leaf.challenge()),
            UncheckedTree::Cand(cand) => Some(cand.challenge),
            UncheckedTree::Cor(cor) => Some(cor.challenge),
            UncheckedTree::Cthreshold(ct) => Some(ct.challenge),
        }
    }

    /// Append every leaf commitment, depth-first left-to-right, to the
    /// Fiat-Shamir byte stream. Fails if any leaf is missing its
    /// commitment, which cannot happen for parser- or prover-built trees.
    pub(crate) fn append_commitments(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            UncheckedTree::NoProof => Err(SigmaError::InternalInvariantFailed),
            UncheckedTree::Leaf(leaf) => match leaf.commitment() {
                Some(commitment) => {
                    commitment.append_bytes(out);
                    Ok(())
                }
                None => Err(SigmaError::InternalInvariantFailed),
            },
            UncheckedTree::Cand(CandUnchecked { children, .. })
            | UncheckedTree::Cor(CorUnchecked { children, .. })
            | UncheckedTree::Cthreshold(CthresholdUnchecked { children, .. }) => {
                for child in children {
                    child.append_commitments(out)?;
                }
                Ok(())
            }
        }
    }
}
