// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A list of error types which are produced while producing and checking
//! proofs and while encoding and decoding the containers they sign
use core::fmt::Debug;
use thiserror::Error;

/// The default Result type used in this crate
pub type Result<T> = std::result::Result<T, SigmaError>;

/// Represents an error in the manipulation of proofs, propositions, and
/// boxes.
///
/// Input-shape errors (`MalformedProof`, `Serialization`, the box packing
/// errors) are surfaced without partial results. Cryptographic failures
/// (`InvalidSignature`, `InvalidEncoding`) deliberately carry no detail about
/// which subtree failed. Programmer errors (`ProverMissingSecret`,
/// `InternalInvariantFailed`) fail fast.
#[derive(Clone, Eq, PartialEq, Error, Debug)]
pub enum SigmaError {
    #[error("Proof bytes are malformed or truncated")]
    MalformedProof,
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("Invalid encoding of a group element")]
    InvalidEncoding,
    #[error("Sigma proposition violates a shape invariant")]
    InvalidProposition,
    #[error("Serialized box exceeds the size cap")]
    OversizeBox,
    #[error("Non-mandatory registers are not densely packed starting from R4")]
    PackingViolation,
    #[error("A box cannot carry more than 255 tokens")]
    TooManyTokens,
    #[error("Non-mandatory register index is out of range")]
    RegisterOverflow,
    #[error("Prover does not have a secret for a node that must be proven")]
    ProverMissingSecret,
    #[error("Serialization Error")]
    Serialization,
    #[error("Represents some code assumption that was checked at runtime but failed to be true")]
    InternalInvariantFailed,
}
