// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The compact proof wire format.
//!
//! A proof stores only what the verifier cannot recompute: the root
//! challenge, each leaf's response, the challenges of all OR children but
//! the last (the last is the XOR of the parent with the others), and the
//! non-constant coefficients of each threshold node's polynomial. Parsing is
//! a single top-down pass that interleaves reads with challenge derivation
//! and rebuilds each leaf's commitment from its challenge and response.

use crate::{
    errors::{Result, SigmaError},
    gf2_192::{Gf192, Gf192Poly},
    parameters::{GROUP_ORDER_BYTES, SOUNDNESS_BYTES},
    serialization::SigmaByteReader,
    sigma::{
        challenge::Challenge,
        unchecked::{
            CandUnchecked, CorUnchecked, CthresholdUnchecked, UncheckedDhTuple, UncheckedLeaf,
            UncheckedSchnorr, UncheckedTree,
        },
        ProveDhTuple, ProveDlog, SigmaBoolean, SigmaLeaf,
    },
    utils::{scalar_from_bytes, scalar_to_bytes, CurvePoint},
};
use k256::Scalar;
use tracing::error;

/// The kind of proof node handed to a [`ParseObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Dlog,
    DhTuple,
    And,
    Or,
    Threshold,
}

/// Callback invoked once per proof node as it is parsed, letting an
/// embedding account for work done without coupling this crate to its cost
/// model. Not on the correctness path.
pub trait ParseObserver {
    fn node_parsed(&mut self, _kind: NodeKind) {}
}

/// The default observer: does nothing.
pub struct NoOpObserver;

impl ParseObserver for NoOpObserver {}

/// Reconstruct a discrete-log leaf commitment from its challenge and
/// response: `a = g^z * h^(-e)`.
pub(crate) fn compute_dlog_commitment(
    proposition: &ProveDlog,
    challenge: &Challenge,
    response: &Scalar,
) -> Result<CurvePoint> {
    let minus_e = -challenge.to_scalar()?;
    Ok(CurvePoint(
        CurvePoint::GENERATOR.0 * response + proposition.h.0 * minus_e,
    ))
}

/// Reconstruct a Diffie-Hellman tuple leaf's commitment pair from its
/// challenge and response: `(g^z * u^(-e), h^z * v^(-e))`.
pub(crate) fn compute_dh_commitment(
    proposition: &ProveDhTuple,
    challenge: &Challenge,
    response: &Scalar,
) -> Result<(CurvePoint, CurvePoint)> {
    let minus_e = -challenge.to_scalar()?;
    let a = CurvePoint(proposition.g.0 * response + proposition.u.0 * minus_e);
    let b = CurvePoint(proposition.h.0 * response + proposition.v.0 * minus_e);
    Ok((a, b))
}

/// Serialize a completed unchecked tree into proof bytes.
///
/// [`UncheckedTree::NoProof`] serializes to the empty string. Fails only if
/// the tree is structurally incomplete, which prover- and parser-built
/// trees never are.
pub fn serialize_sig(tree: &UncheckedTree) -> Result<Vec<u8>> {
    match tree.challenge() {
        None => Ok(Vec::new()),
        Some(root_challenge) => {
            let mut out = Vec::new();
            out.extend_from_slice(root_challenge.as_bytes());
            sig_write_body(tree, &mut out)?;
            Ok(out)
        }
    }
}

fn sig_write_body(tree: &UncheckedTree, out: &mut Vec<u8>) -> Result<()> {
    match tree {
        UncheckedTree::NoProof => Err(SigmaError::InternalInvariantFailed),
        UncheckedTree::Leaf(leaf) => {
            out.extend_from_slice(&scalar_to_bytes(&leaf.response()));
            Ok(())
        }
        UncheckedTree::Cand(CandUnchecked { children, .. }) => {
            // every child shares the parent challenge, so none is written
            for child in children {
                sig_write_body(child, out)?;
            }
            Ok(())
        }
        UncheckedTree::Cor(CorUnchecked { children, .. }) => {
            // all children but the last write their challenge; the verifier
            // recovers the last one by XOR
            let (last, rest) = children
                .split_last()
                .ok_or(SigmaError::InternalInvariantFailed)?;
            for child in rest {
                let challenge = child
                    .challenge()
                    .ok_or(SigmaError::InternalInvariantFailed)?;
                out.extend_from_slice(challenge.as_bytes());
                sig_write_body(child, out)?;
            }
            sig_write_body(last, out)
        }
        UncheckedTree::Cthreshold(CthresholdUnchecked {
            polynomial,
            children,
            ..
        }) => {
            out.extend_from_slice(&polynomial.to_bytes());
            for child in children {
                sig_write_body(child, out)?;
            }
            Ok(())
        }
    }
}

/// Parse proof bytes against a proposition, deriving every node's challenge
/// and rebuilding every leaf's commitment in one top-down pass.
///
/// Empty input produces [`UncheckedTree::NoProof`]. Any truncation or
/// decoding failure is reported as [`SigmaError::MalformedProof`] with no
/// partial result.
pub fn parse_sig_compute_challenges(
    proposition: &SigmaBoolean,
    proof: &[u8],
) -> Result<UncheckedTree> {
    let (tree, _) = parse_sig(proposition, proof, &mut NoOpObserver)?;
    Ok(tree)
}

/// As [`parse_sig_compute_challenges`], also reporting how many proof bytes
/// were consumed and feeding each parsed node to `observer`.
pub(crate) fn parse_sig(
    proposition: &SigmaBoolean,
    proof: &[u8],
    observer: &mut dyn ParseObserver,
) -> Result<(UncheckedTree, usize)> {
    proposition.validate()?;
    if proof.is_empty() {
        return Ok((UncheckedTree::NoProof, 0));
    }
    let mut reader = SigmaByteReader::new(proof);
    match parse_tree(proposition, None, &mut reader, observer) {
        Ok(tree) => Ok((tree, reader.consumed())),
        Err(SigmaError::InvalidProposition) => Err(SigmaError::InvalidProposition),
        Err(_) => {
            error!("proof bytes failed to parse");
            Err(SigmaError::MalformedProof)
        }
    }
}

/// One node of the top-down pass. The incoming challenge is `Some` when the
/// parent already determines it and `None` when it must be read from the
/// stream (at the root, and at every OR child except the last).
fn parse_tree(
    proposition: &SigmaBoolean,
    challenge: Option<Challenge>,
    reader: &mut SigmaByteReader,
    observer: &mut dyn ParseObserver,
) -> Result<UncheckedTree> {
    let challenge = match challenge {
        Some(c) => c,
        None => Challenge::read(reader)?,
    };
    match proposition {
        SigmaBoolean::Leaf(SigmaLeaf::ProveDlog(dlog)) => {
            observer.node_parsed(NodeKind::Dlog);
            let response = read_response(reader)?;
            let commitment = compute_dlog_commitment(dlog, &challenge, &response)?;
            Ok(UncheckedTree::Leaf(UncheckedLeaf::Schnorr(
                UncheckedSchnorr {
                    proposition: *dlog,
                    commitment: Some(commitment),
                    challenge,
                    response,
                },
            )))
        }
        SigmaBoolean::Leaf(SigmaLeaf::ProveDhTuple(dht)) => {
            observer.node_parsed(NodeKind::DhTuple);
            let response = read_response(reader)?;
            let commitment = compute_dh_commitment(dht, &challenge, &response)?;
            Ok(UncheckedTree::Leaf(UncheckedLeaf::DhTuple(
                UncheckedDhTuple {
                    proposition: *dht,
                    commitment: Some(commitment),
                    challenge,
                    response,
                },
            )))
        }
        SigmaBoolean::Cand(children) => {
            observer.node_parsed(NodeKind::And);
            let mut parsed = Vec::with_capacity(children.len());
            for child in children {
                parsed.push(parse_tree(child, Some(challenge), reader, observer)?);
            }
            Ok(UncheckedTree::Cand(CandUnchecked {
                challenge,
                children: parsed,
            }))
        }
        SigmaBoolean::Cor(children) => {
            observer.node_parsed(NodeKind::Or);
            let (last, rest) = children
                .split_last()
                .ok_or(SigmaError::InvalidProposition)?;
            let mut parsed = Vec::with_capacity(children.len());
            let mut xor = challenge;
            for child in rest {
                let parsed_child = parse_tree(child, None, reader, observer)?;
                let child_challenge = parsed_child
                    .challenge()
                    .ok_or(SigmaError::InternalInvariantFailed)?;
                xor = xor.xor(&child_challenge);
                parsed.push(parsed_child);
            }
            parsed.push(parse_tree(last, Some(xor), reader, observer)?);
            Ok(UncheckedTree::Cor(CorUnchecked {
                challenge,
                children: parsed,
            }))
        }
        SigmaBoolean::Cthreshold(k, children) => {
            observer.node_parsed(NodeKind::Threshold);
            let n = children.len();
            let coeff_bytes = reader.read_bytes((n - usize::from(*k)) * SOUNDNESS_BYTES)?;
            let polynomial = Gf192Poly::from_bytes(Gf192::from(&challenge), coeff_bytes)?;
            let mut parsed = Vec::with_capacity(n);
            for (i, child) in children.iter().enumerate() {
                let child_challenge = Challenge::from(polynomial.evaluate(i as u8 + 1));
                parsed.push(parse_tree(child, Some(child_challenge), reader, observer)?);
            }
            Ok(UncheckedTree::Cthreshold(CthresholdUnchecked {
                k: *k,
                challenge,
                polynomial,
                children: parsed,
            }))
        }
    }
}

fn read_response(reader: &mut SigmaByteReader) -> Result<Scalar> {
    scalar_from_bytes(reader.read_bytes(GROUP_ORDER_BYTES)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sigma::prover::{DlogProverInput, HintsBag, PrivateInput, Prover},
        utils::testing::init_testing,
    };

    #[test]
    fn empty_proof_parses_to_no_proof() -> Result<()> {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let prop: SigmaBoolean = secret.public_image().into();
        let tree = parse_sig_compute_challenges(&prop, &[])?;
        assert!(matches!(tree, UncheckedTree::NoProof));
        Ok(())
    }

    #[test]
    fn proof_round_trip_through_bytes() -> Result<()> {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let prop: SigmaBoolean = secret.public_image().into();
        let prover = Prover::new(vec![PrivateInput::Dlog(secret)]);
        let tree = prover.prove(&prop, b"round trip", &HintsBag::empty(), &mut rng)?;
        let bytes = serialize_sig(&tree)?;
        let reparsed = parse_sig_compute_challenges(&prop, &bytes)?;
        let rebytes = serialize_sig(&reparsed)?;
        assert_eq!(bytes, rebytes);
        Ok(())
    }

    #[test]
    fn every_truncation_is_malformed() -> Result<()> {
        let mut rng = init_testing();
        let secrets: Vec<DlogProverInput> =
            (0..3).map(|_| DlogProverInput::random(&mut rng)).collect();
        let prop = SigmaBoolean::cthreshold(
            2,
            secrets
                .iter()
                .map(|s| s.public_image().into())
                .collect(),
        )?;
        let prover = Prover::new(
            secrets.into_iter().map(PrivateInput::Dlog).collect(),
        );
        let tree = prover.prove(&prop, b"truncate me", &HintsBag::empty(), &mut rng)?;
        let bytes = serialize_sig(&tree)?;
        for cut in 1..bytes.len() {
            let result = parse_sig_compute_challenges(&prop, &bytes[..cut]);
            assert_eq!(result.unwrap_err(), SigmaError::MalformedProof);
        }
        Ok(())
    }

    #[test]
    fn parse_reports_exact_consumption() -> Result<()> {
        let mut rng = init_testing();
        let a = DlogProverInput::random(&mut rng);
        let b = DlogProverInput::random(&mut rng);
        let prop = SigmaBoolean::cor(vec![
            a.public_image().into(),
            b.public_image().into(),
        ])?;
        let prover = Prover::new(vec![PrivateInput::Dlog(a)]);
        let tree = prover.prove(&prop, b"consumption", &HintsBag::empty(), &mut rng)?;
        let mut bytes = serialize_sig(&tree)?;
        let expected_len = bytes.len();
        // trailing garbage is not consumed
        bytes.extend_from_slice(&[0xaa; 7]);
        let (_, consumed) = parse_sig(&prop, &bytes, &mut NoOpObserver)?;
        assert_eq!(consumed, expected_len);
        Ok(())
    }

    #[test]
    fn observer_sees_every_node() -> Result<()> {
        struct Counter(Vec<NodeKind>);
        impl ParseObserver for Counter {
            fn node_parsed(&mut self, kind: NodeKind) {
                self.0.push(kind);
            }
        }

        let mut rng = init_testing();
        let a = DlogProverInput::random(&mut rng);
        let b = DlogProverInput::random(&mut rng);
        let prop = SigmaBoolean::cand(vec![
            a.public_image().into(),
            b.public_image().into(),
        ])?;
        let prover = Prover::new(vec![PrivateInput::Dlog(a), PrivateInput::Dlog(b)]);
        let tree = prover.prove(&prop, b"observed", &HintsBag::empty(), &mut rng)?;
        let bytes = serialize_sig(&tree)?;
        let mut counter = Counter(Vec::new());
        parse_sig(&prop, &bytes, &mut counter)?;
        assert_eq!(
            counter.0,
            vec![NodeKind::And, NodeKind::Dlog, NodeKind::Dlog]
        );
        Ok(())
    }
}
