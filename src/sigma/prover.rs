// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Proof generation.
//!
//! Signing walks the proposition in five phases: mark each node real or
//! simulated, simulate the leaves and connectives that have no witness,
//! commit at the real leaves, derive the root challenge by Fiat-Shamir,
//! and finally propagate challenges down the real nodes and compute the
//! leaf responses. Nothing observable is produced until the whole proof is
//! complete; a missing witness aborts the attempt with
//! [`SigmaError::ProverMissingSecret`].
//!
//! The hints bag supports assembling one proof from several signers: a
//! signer can pin its own commitment (`OwnCommitment`), absorb another
//! signer's commitment (`RealCommitment`), and substitute another signer's
//! finished leaf proof (`RealSecretProof`).

use crate::{
    errors::{Result, SigmaError},
    gf2_192::{Gf192, Gf192Poly},
    sigma::{
        challenge::Challenge,
        fiat_shamir,
        sig_serializer::{
            compute_dh_commitment, compute_dlog_commitment, parse_sig_compute_challenges,
            serialize_sig,
        },
        unchecked::{
            CandUnchecked, CorUnchecked, CthresholdUnchecked, FirstProverMessage,
            UncheckedDhTuple, UncheckedLeaf, UncheckedSchnorr, UncheckedTree,
        },
        ProveDhTuple, ProveDlog, SigmaBoolean, SigmaLeaf,
    },
    utils::{random_scalar, scalar_from_bytes, CurvePoint},
};
use k256::Scalar;
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;
use tracing::error;
use zeroize::Zeroize;

/// Witness for a [`ProveDlog`] statement: the exponent `w` with
/// `g^w = h`.
#[derive(Clone)]
pub struct DlogProverInput {
    w: Scalar,
}

impl DlogProverInput {
    pub fn new(w: Scalar) -> Self {
        Self { w }
    }

    /// Sample a fresh secret.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            w: random_scalar(rng),
        }
    }

    /// Decode a secret from its fixed-width big-endian encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            w: scalar_from_bytes(bytes)?,
        })
    }

    /// The public statement this secret proves.
    pub fn public_image(&self) -> ProveDlog {
        ProveDlog::new(CurvePoint::GENERATOR.multiply_by_scalar(&self.w))
    }
}

impl Debug for DlogProverInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlogProverInput")
            .field("w", &"[redacted]")
            .finish()
    }
}

impl Drop for DlogProverInput {
    fn drop(&mut self) {
        self.w.zeroize();
    }
}

/// Witness for a [`ProveDhTuple`] statement: the exponent `w` with
/// `u = g^w` and `v = h^w`.
#[derive(Clone)]
pub struct DhTupleProverInput {
    w: Scalar,
    g: CurvePoint,
    h: CurvePoint,
}

impl DhTupleProverInput {
    pub fn new(w: Scalar, g: CurvePoint, h: CurvePoint) -> Self {
        Self { w, g, h }
    }

    /// Sample a fresh secret over the generator and a random second base.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let g = CurvePoint::GENERATOR;
        let h = CurvePoint::GENERATOR.multiply_by_scalar(&random_scalar(rng));
        Self {
            w: random_scalar(rng),
            g,
            h,
        }
    }

    /// The public statement this secret proves.
    pub fn public_image(&self) -> ProveDhTuple {
        ProveDhTuple::new(
            self.g,
            self.h,
            self.g.multiply_by_scalar(&self.w),
            self.h.multiply_by_scalar(&self.w),
        )
    }
}

impl Debug for DhTupleProverInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhTupleProverInput")
            .field("w", &"[redacted]")
            .field("g", &self.g)
            .field("h", &self.h)
            .finish()
    }
}

impl Drop for DhTupleProverInput {
    fn drop(&mut self) {
        self.w.zeroize();
    }
}

/// A witness for a single leaf statement.
#[derive(Debug, Clone)]
pub enum PrivateInput {
    Dlog(DlogProverInput),
    DhTuple(DhTupleProverInput),
}

impl PrivateInput {
    pub fn public_image(&self) -> SigmaLeaf {
        match self {
            PrivateInput::Dlog(input) => input.public_image().into(),
            PrivateInput::DhTuple(input) => input.public_image().into(),
        }
    }

    fn secret_scalar(&self) -> &Scalar {
        match self {
            PrivateInput::Dlog(input) => &input.w,
            PrivateInput::DhTuple(input) => &input.w,
        }
    }
}

/// A piece of out-of-band knowledge usable while proving.
///
/// Simulated-branch hint exchange is not modeled; hints only concern leaves
/// that end up real.
#[derive(Debug, Clone)]
pub enum Hint {
    /// A commitment this prover generated earlier together with its
    /// randomness; proving will reuse it instead of sampling a fresh one.
    OwnCommitment {
        image: SigmaLeaf,
        randomness: Scalar,
        commitment: FirstProverMessage,
    },
    /// Another signer's commitment for a leaf that signer will prove. The
    /// leaf is treated as real, and the proof produced here is a partial
    /// one: its response for that leaf is filler until replaced through a
    /// [`Hint::RealSecretProof`].
    RealCommitment {
        image: SigmaLeaf,
        commitment: FirstProverMessage,
    },
    /// Another signer's finished leaf proof, substituted verbatim.
    RealSecretProof {
        image: SigmaLeaf,
        proof: UncheckedLeaf,
    },
}

/// An unordered collection of [`Hint`]s.
#[derive(Debug, Clone, Default)]
pub struct HintsBag {
    hints: Vec<Hint>,
}

impl HintsBag {
    pub fn empty() -> Self {
        Self { hints: Vec::new() }
    }

    pub fn add(&mut self, hint: Hint) {
        self.hints.push(hint);
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    fn own_commitment_for(&self, image: &SigmaLeaf) -> Option<(&Scalar, &FirstProverMessage)> {
        self.hints.iter().find_map(|hint| match hint {
            Hint::OwnCommitment {
                image: i,
                randomness,
                commitment,
            } if i == image => Some((randomness, commitment)),
            _ => None,
        })
    }

    fn real_commitment_for(&self, image: &SigmaLeaf) -> Option<&FirstProverMessage> {
        self.hints.iter().find_map(|hint| match hint {
            Hint::RealCommitment {
                image: i,
                commitment,
            } if i == image => Some(commitment),
            _ => None,
        })
    }

    fn real_proof_for(&self, image: &SigmaLeaf) -> Option<&UncheckedLeaf> {
        self.hints.iter().find_map(|hint| match hint {
            Hint::RealSecretProof { image: i, proof } if i == image => Some(proof),
            _ => None,
        })
    }

    /// Whether some hint promises this leaf will be really proven.
    fn covers_image(&self, image: &SigmaLeaf) -> bool {
        self.real_proof_for(image).is_some() || self.real_commitment_for(image).is_some()
    }
}

/// Run the commitment phase for one leaf ahead of proving. Returns the
/// private [`Hint::OwnCommitment`] to keep and the public
/// [`Hint::RealCommitment`] to share with co-signers.
pub fn generate_commitment_for<R: RngCore + CryptoRng>(
    image: &SigmaLeaf,
    rng: &mut R,
) -> (Hint, Hint) {
    let randomness = random_scalar(rng);
    let commitment = match image {
        SigmaLeaf::ProveDlog(_) => {
            FirstProverMessage::Dlog(CurvePoint::GENERATOR.multiply_by_scalar(&randomness))
        }
        SigmaLeaf::ProveDhTuple(dht) => FirstProverMessage::DhTuple(
            dht.g.multiply_by_scalar(&randomness),
            dht.h.multiply_by_scalar(&randomness),
        ),
    };
    (
        Hint::OwnCommitment {
            image: *image,
            randomness,
            commitment,
        },
        Hint::RealCommitment {
            image: *image,
            commitment,
        },
    )
}

/// Pull finished leaf proofs for the given images out of a (possibly
/// partial) signature, for use as [`Hint::RealSecretProof`] by a co-signer.
pub fn extract_hints(
    proposition: &SigmaBoolean,
    proof: &[u8],
    real_images: &[SigmaLeaf],
) -> Result<HintsBag> {
    let tree = parse_sig_compute_challenges(proposition, proof)?;
    let mut bag = HintsBag::empty();
    collect_leaf_proofs(&tree, real_images, &mut bag);
    Ok(bag)
}

fn collect_leaf_proofs(tree: &UncheckedTree, real_images: &[SigmaLeaf], bag: &mut HintsBag) {
    match tree {
        UncheckedTree::NoProof => {}
        UncheckedTree::Leaf(leaf) => {
            let image = leaf.proposition();
            if real_images.contains(&image) {
                bag.add(Hint::RealSecretProof {
                    image,
                    proof: leaf.clone(),
                });
            }
        }
        UncheckedTree::Cand(CandUnchecked { children, .. })
        | UncheckedTree::Cor(CorUnchecked { children, .. })
        | UncheckedTree::Cthreshold(CthresholdUnchecked { children, .. }) => {
            for child in children {
                collect_leaf_proofs(child, real_images, bag);
            }
        }
    }
}

//////////////////////////
// Prover-internal tree //
//////////////////////////

enum UnprovenTree {
    Leaf(UnprovenLeaf),
    Conj(UnprovenConj),
}

struct UnprovenLeaf {
    proposition: SigmaLeaf,
    /// Index of the matching witness in the prover's secret list.
    secret: Option<usize>,
    simulated: bool,
    challenge: Option<Challenge>,
    randomness: Option<Scalar>,
    commitment: Option<FirstProverMessage>,
    response: Option<Scalar>,
}

impl Drop for UnprovenLeaf {
    fn drop(&mut self) {
        if let Some(mut r) = self.randomness.take() {
            r.zeroize();
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ConjKind {
    And,
    Or,
    Threshold(u8),
}

struct UnprovenConj {
    kind: ConjKind,
    simulated: bool,
    challenge: Option<Challenge>,
    polynomial: Option<Gf192Poly>,
    children: Vec<UnprovenTree>,
}

impl UnprovenTree {
    fn is_simulated(&self) -> bool {
        match self {
            UnprovenTree::Leaf(leaf) => leaf.simulated,
            UnprovenTree::Conj(conj) => conj.simulated,
        }
    }

    fn challenge(&self) -> Option<Challenge> {
        match self {
            UnprovenTree::Leaf(leaf) => leaf.challenge,
            UnprovenTree::Conj(conj) => conj.challenge,
        }
    }

    fn set_challenge(&mut self, challenge: Challenge) {
        match self {
            UnprovenTree::Leaf(leaf) => leaf.challenge = Some(challenge),
            UnprovenTree::Conj(conj) => conj.challenge = Some(challenge),
        }
    }
}

/// Holds the witnesses and produces signatures over sigma propositions.
pub struct Prover {
    secrets: Vec<PrivateInput>,
}

impl Prover {
    pub fn new(secrets: Vec<PrivateInput>) -> Self {
        Self { secrets }
    }

    pub fn secrets(&self) -> &[PrivateInput] {
        &self.secrets
    }

    /// Sign a message under the given proposition.
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        self.sign_with_hints(proposition, message, &HintsBag::empty(), rng)
    }

    /// Sign a message, drawing on a bag of hints from co-signers.
    pub fn sign_with_hints<R: RngCore + CryptoRng>(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        hints: &HintsBag,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let tree = self.prove(proposition, message, hints, rng)?;
        serialize_sig(&tree)
    }

    /// Produce the unchecked tree for a proposition and message without
    /// serializing it.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        hints: &HintsBag,
        rng: &mut R,
    ) -> Result<UncheckedTree> {
        proposition.validate()?;
        let mut tree = self.convert_to_unproven(proposition);
        if !self.is_provable(&tree, hints) {
            error!("no witness covers the root of the proposition");
            return Err(SigmaError::ProverMissingSecret);
        }
        self.mark(&mut tree, false, hints);
        self.simulate_and_commit(&mut tree, hints, rng)?;

        let mut commitments = Vec::new();
        collect_commitments(&tree, &mut commitments)?;
        let root_challenge =
            fiat_shamir::root_challenge(&commitments, &proposition.prop_bytes(), message);

        self.respond(&mut tree, root_challenge, hints, rng)?;
        convert_to_unchecked(&tree)
    }

    fn convert_to_unproven(&self, proposition: &SigmaBoolean) -> UnprovenTree {
        match proposition {
            SigmaBoolean::Leaf(leaf) => UnprovenTree::Leaf(UnprovenLeaf {
                proposition: *leaf,
                secret: self
                    .secrets
                    .iter()
                    .position(|secret| secret.public_image() == *leaf),
                simulated: false,
                challenge: None,
                randomness: None,
                commitment: None,
                response: None,
            }),
            SigmaBoolean::Cand(children) => self.convert_conj(ConjKind::And, children),
            SigmaBoolean::Cor(children) => self.convert_conj(ConjKind::Or, children),
            SigmaBoolean::Cthreshold(k, children) => {
                self.convert_conj(ConjKind::Threshold(*k), children)
            }
        }
    }

    fn convert_conj(&self, kind: ConjKind, children: &[SigmaBoolean]) -> UnprovenTree {
        UnprovenTree::Conj(UnprovenConj {
            kind,
            simulated: false,
            challenge: None,
            polynomial: None,
            children: children
                .iter()
                .map(|child| self.convert_to_unproven(child))
                .collect(),
        })
    }

    /// Whether this prover (with its hints) can really prove the node.
    fn is_provable(&self, node: &UnprovenTree, hints: &HintsBag) -> bool {
        match node {
            UnprovenTree::Leaf(leaf) => {
                leaf.secret.is_some() || hints.covers_image(&leaf.proposition)
            }
            UnprovenTree::Conj(conj) => {
                let provable = conj
                    .children
                    .iter()
                    .filter(|child| self.is_provable(child, hints))
                    .count();
                match conj.kind {
                    ConjKind::And => provable == conj.children.len(),
                    ConjKind::Or => provable >= 1,
                    ConjKind::Threshold(k) => provable >= usize::from(k),
                }
            }
        }
    }

    /// Mark every node real or simulated, top-down. A real AND needs all
    /// children real; a real OR keeps exactly one provable child real; a
    /// real k-of-n THRESHOLD keeps exactly k provable children real.
    fn mark(&self, node: &mut UnprovenTree, simulated: bool, hints: &HintsBag) {
        match node {
            UnprovenTree::Leaf(leaf) => leaf.simulated = simulated,
            UnprovenTree::Conj(conj) => {
                conj.simulated = simulated;
                match (simulated, conj.kind) {
                    (true, _) => {
                        for child in &mut conj.children {
                            self.mark(child, true, hints);
                        }
                    }
                    (false, ConjKind::And) => {
                        for child in &mut conj.children {
                            self.mark(child, false, hints);
                        }
                    }
                    (false, ConjKind::Or) => {
                        let mut real_left = 1usize;
                        let provable: Vec<bool> = conj
                            .children
                            .iter()
                            .map(|child| self.is_provable(child, hints))
                            .collect();
                        for (child, provable) in conj.children.iter_mut().zip(provable) {
                            let real = provable && real_left > 0;
                            if real {
                                real_left -= 1;
                            }
                            self.mark(child, !real, hints);
                        }
                    }
                    (false, ConjKind::Threshold(k)) => {
                        let mut real_left = usize::from(k);
                        let provable: Vec<bool> = conj
                            .children
                            .iter()
                            .map(|child| self.is_provable(child, hints))
                            .collect();
                        for (child, provable) in conj.children.iter_mut().zip(provable) {
                            let real = provable && real_left > 0;
                            if real {
                                real_left -= 1;
                            }
                            self.mark(child, !real, hints);
                        }
                    }
                }
            }
        }
    }

    /// Fix the challenges of every simulated subtree, compute simulated
    /// leaf transcripts, and commit at the real leaves.
    fn simulate_and_commit<R: RngCore + CryptoRng>(
        &self,
        node: &mut UnprovenTree,
        hints: &HintsBag,
        rng: &mut R,
    ) -> Result<()> {
        match node {
            UnprovenTree::Leaf(leaf) => {
                if leaf.simulated {
                    // simulated transcript: random response, commitment
                    // recomputed from (challenge, response)
                    let challenge = leaf
                        .challenge
                        .ok_or(SigmaError::InternalInvariantFailed)?;
                    let response = random_scalar(rng);
                    leaf.commitment = Some(leaf_commitment_from(
                        &leaf.proposition,
                        &challenge,
                        &response,
                    )?);
                    leaf.response = Some(response);
                } else if let Some((randomness, commitment)) =
                    hints.own_commitment_for(&leaf.proposition)
                {
                    leaf.randomness = Some(*randomness);
                    leaf.commitment = Some(*commitment);
                } else if let Some(proof) = hints.real_proof_for(&leaf.proposition) {
                    leaf.commitment =
                        Some(proof.commitment().ok_or(SigmaError::InternalInvariantFailed)?);
                } else if let Some(commitment) = hints.real_commitment_for(&leaf.proposition) {
                    leaf.commitment = Some(*commitment);
                } else {
                    let randomness = random_scalar(rng);
                    leaf.commitment = Some(match &leaf.proposition {
                        SigmaLeaf::ProveDlog(_) => FirstProverMessage::Dlog(
                            CurvePoint::GENERATOR.multiply_by_scalar(&randomness),
                        ),
                        SigmaLeaf::ProveDhTuple(dht) => FirstProverMessage::DhTuple(
                            dht.g.multiply_by_scalar(&randomness),
                            dht.h.multiply_by_scalar(&randomness),
                        ),
                    });
                    leaf.randomness = Some(randomness);
                }
                Ok(())
            }
            UnprovenTree::Conj(conj) => {
                if conj.simulated {
                    // distribute this node's fixed challenge to its
                    // children exactly the way the verifier will
                    let challenge = conj
                        .challenge
                        .ok_or(SigmaError::InternalInvariantFailed)?;
                    match conj.kind {
                        ConjKind::And => {
                            for child in &mut conj.children {
                                child.set_challenge(challenge);
                            }
                        }
                        ConjKind::Or => {
                            let mut xor = challenge;
                            let count = conj.children.len();
                            for child in conj.children.iter_mut().take(count - 1) {
                                let child_challenge = Challenge::random(rng);
                                xor = xor.xor(&child_challenge);
                                child.set_challenge(child_challenge);
                            }
                            if let Some(last) = conj.children.last_mut() {
                                last.set_challenge(xor);
                            }
                        }
                        ConjKind::Threshold(k) => {
                            let degree = conj.children.len() - usize::from(k);
                            let polynomial =
                                Gf192Poly::random(Gf192::from(&challenge), degree, rng);
                            for (i, child) in conj.children.iter_mut().enumerate() {
                                child.set_challenge(Challenge::from(
                                    polynomial.evaluate(i as u8 + 1),
                                ));
                            }
                            conj.polynomial = Some(polynomial);
                        }
                    }
                } else if conj.kind != ConjKind::And {
                    // simulated children of a real OR / THRESHOLD get
                    // uniformly random challenges now; the real children's
                    // challenges are derived after Fiat-Shamir
                    for child in &mut conj.children {
                        if child.is_simulated() {
                            child.set_challenge(Challenge::random(rng));
                        }
                    }
                }
                for child in &mut conj.children {
                    self.simulate_and_commit(child, hints, rng)?;
                }
                Ok(())
            }
        }
    }

    /// Propagate challenges top-down through the real nodes and compute
    /// the real leaves' responses.
    fn respond<R: RngCore + CryptoRng>(
        &self,
        node: &mut UnprovenTree,
        challenge: Challenge,
        hints: &HintsBag,
        rng: &mut R,
    ) -> Result<()> {
        match node {
            UnprovenTree::Leaf(leaf) => {
                leaf.challenge = Some(challenge);
                if let (Some(index), Some(randomness)) = (leaf.secret, leaf.randomness) {
                    let w = self.secrets[index].secret_scalar();
                    let e = challenge.to_scalar()?;
                    leaf.response = Some(randomness + e * w);
                } else if let Some(proof) = hints.real_proof_for(&leaf.proposition) {
                    if proof.challenge() != challenge {
                        error!("hinted leaf proof was produced under a different challenge");
                        return Err(SigmaError::InternalInvariantFailed);
                    }
                    leaf.response = Some(proof.response());
                } else if hints.real_commitment_for(&leaf.proposition).is_some() {
                    // partial proof: the co-signer holding this witness
                    // will supply the real response later
                    leaf.response = Some(random_scalar(rng));
                } else {
                    error!("real leaf has neither a witness nor a usable hint");
                    return Err(SigmaError::ProverMissingSecret);
                }
                Ok(())
            }
            UnprovenTree::Conj(conj) => {
                conj.challenge = Some(challenge);
                match conj.kind {
                    ConjKind::And => {
                        for child in &mut conj.children {
                            self.respond(child, challenge, hints, rng)?;
                        }
                        Ok(())
                    }
                    ConjKind::Or => {
                        // the one real child absorbs the parent challenge
                        // XOR-ed with every simulated sibling's
                        let mut xor = challenge;
                        for child in conj.children.iter().filter(|c| c.is_simulated()) {
                            let child_challenge = child
                                .challenge()
                                .ok_or(SigmaError::InternalInvariantFailed)?;
                            xor = xor.xor(&child_challenge);
                        }
                        let real_child = conj
                            .children
                            .iter_mut()
                            .find(|c| !c.is_simulated())
                            .ok_or(SigmaError::InternalInvariantFailed)?;
                        self.respond(real_child, xor, hints, rng)
                    }
                    ConjKind::Threshold(_) => {
                        // interpolate through the simulated children's
                        // fixed challenges with the parent challenge at 0,
                        // then hand each real child its polynomial value
                        let mut points = Vec::new();
                        let mut values = Vec::new();
                        for (i, child) in conj.children.iter().enumerate() {
                            if child.is_simulated() {
                                let child_challenge = child
                                    .challenge()
                                    .ok_or(SigmaError::InternalInvariantFailed)?;
                                points.push(i as u8 + 1);
                                values.push(Gf192::from(&child_challenge));
                            }
                        }
                        let polynomial =
                            Gf192Poly::interpolate(&points, &values, Gf192::from(&challenge))?;
                        for (i, child) in conj.children.iter_mut().enumerate() {
                            if !child.is_simulated() {
                                let child_challenge =
                                    Challenge::from(polynomial.evaluate(i as u8 + 1));
                                self.respond(child, child_challenge, hints, rng)?;
                            }
                        }
                        conj.polynomial = Some(polynomial);
                        Ok(())
                    }
                }
            }
        }
    }
}

fn leaf_commitment_from(
    proposition: &SigmaLeaf,
    challenge: &Challenge,
    response: &Scalar,
) -> Result<FirstProverMessage> {
    match proposition {
        SigmaLeaf::ProveDlog(dlog) => Ok(FirstProverMessage::Dlog(compute_dlog_commitment(
            dlog, challenge, response,
        )?)),
        SigmaLeaf::ProveDhTuple(dht) => {
            let (a, b) = compute_dh_commitment(dht, challenge, response)?;
            Ok(FirstProverMessage::DhTuple(a, b))
        }
    }
}

fn collect_commitments(node: &UnprovenTree, out: &mut Vec<u8>) -> Result<()> {
    match node {
        UnprovenTree::Leaf(leaf) => {
            let commitment = leaf
                .commitment
                .ok_or(SigmaError::InternalInvariantFailed)?;
            commitment.append_bytes(out);
            Ok(())
        }
        UnprovenTree::Conj(conj) => {
            for child in &conj.children {
                collect_commitments(child, out)?;
            }
            Ok(())
        }
    }
}

fn convert_to_unchecked(node: &UnprovenTree) -> Result<UncheckedTree> {
    match node {
        UnprovenTree::Leaf(leaf) => {
            let challenge = leaf
                .challenge
                .ok_or(SigmaError::InternalInvariantFailed)?;
            let response = leaf
                .response
                .ok_or(SigmaError::InternalInvariantFailed)?;
            Ok(UncheckedTree::Leaf(match leaf.proposition {
                SigmaLeaf::ProveDlog(dlog) => UncheckedLeaf::Schnorr(UncheckedSchnorr {
                    proposition: dlog,
                    commitment: leaf.commitment.and_then(|c| match c {
                        FirstProverMessage::Dlog(a) => Some(a),
                        FirstProverMessage::DhTuple(..) => None,
                    }),
                    challenge,
                    response,
                }),
                SigmaLeaf::ProveDhTuple(dht) => UncheckedLeaf::DhTuple(UncheckedDhTuple {
                    proposition: dht,
                    commitment: leaf.commitment.and_then(|c| match c {
                        FirstProverMessage::DhTuple(a, b) => Some((a, b)),
                        FirstProverMessage::Dlog(_) => None,
                    }),
                    challenge,
                    response,
                }),
            }))
        }
        UnprovenTree::Conj(conj) => {
            let challenge = conj
                .challenge
                .ok_or(SigmaError::InternalInvariantFailed)?;
            let children = conj
                .children
                .iter()
                .map(convert_to_unchecked)
                .collect::<Result<Vec<_>>>()?;
            Ok(match conj.kind {
                ConjKind::And => UncheckedTree::Cand(CandUnchecked {
                    challenge,
                    children,
                }),
                ConjKind::Or => UncheckedTree::Cor(CorUnchecked {
                    challenge,
                    children,
                }),
                ConjKind::Threshold(k) => UncheckedTree::Cthreshold(CthresholdUnchecked {
                    k,
                    challenge,
                    polynomial: conj
                        .polynomial
                        .clone()
                        .ok_or(SigmaError::InternalInvariantFailed)?,
                    children,
                }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;

    #[test]
    fn prover_without_any_witness_fails_atomically() {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let prop: SigmaBoolean = secret.public_image().into();
        let prover = Prover::new(vec![]);
        let result = prover.sign(&prop, b"message", &mut rng);
        assert_eq!(result.unwrap_err(), SigmaError::ProverMissingSecret);
    }

    #[test]
    fn and_needs_every_witness() -> Result<()> {
        let mut rng = init_testing();
        let a = DlogProverInput::random(&mut rng);
        let b = DlogProverInput::random(&mut rng);
        let prop = SigmaBoolean::cand(vec![
            a.public_image().into(),
            b.public_image().into(),
        ])?;
        let prover = Prover::new(vec![PrivateInput::Dlog(a)]);
        assert_eq!(
            prover.sign(&prop, b"message", &mut rng).unwrap_err(),
            SigmaError::ProverMissingSecret
        );
        Ok(())
    }

    #[test]
    fn threshold_needs_k_witnesses() -> Result<()> {
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
        let prover = Prover::new(vec![PrivateInput::Dlog(secrets[0].clone())]);
        assert_eq!(
            prover.sign(&prop, b"message", &mut rng).unwrap_err(),
            SigmaError::ProverMissingSecret
        );
        Ok(())
    }

    #[test]
    fn secret_debug_output_is_redacted() {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let rendered = format!("{secret:?}");
        assert!(rendered.contains("[redacted]"));
        let dht = DhTupleProverInput::random(&mut rng);
        assert!(format!("{dht:?}").contains("[redacted]"));
    }

    #[test]
    fn dlog_secret_round_trips_through_bytes() -> Result<()> {
        let mut rng = init_testing();
        let secret = DlogProverInput::random(&mut rng);
        let bytes = crate::utils::scalar_to_bytes(&secret.w);
        let back = DlogProverInput::from_bytes(&bytes)?;
        assert_eq!(back.public_image(), secret.public_image());
        Ok(())
    }
}
