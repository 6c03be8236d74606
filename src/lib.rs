// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Sigma-protocol proof engine for a UTXO ledger.
//!
//! This crate implements non-interactive zero-knowledge signatures over
//! trees of statements: knowledge of a discrete logarithm
//! ([`sigma::ProveDlog`]), knowledge of a Diffie-Hellman tuple exponent
//! ([`sigma::ProveDhTuple`]), and their composition under AND, OR, and
//! k-of-n THRESHOLD connectives. Challenges are derived by the Fiat-Shamir
//! transformation; OR nodes split challenges by XOR and THRESHOLD nodes
//! split them through GF(2^192) polynomials, which is what makes a proof
//! reveal nothing about *which* branches the prover could really take.
//!
//! The [`ergo_box`] module provides the deterministic container these
//! signatures are produced over: a UTXO record with a value, a guarding
//! script, tokens, and typed registers, identified by the hash of its byte
//! image.
//!
//! Proofs use a compact wire format with no length prefixes: the parser
//! derives each node's challenge while it reads, so the proposition tree
//! shape fully determines the proof size. See [`sigma::sig_serializer`].

pub mod ergo_box;
pub mod errors;
pub mod gf2_192;
pub mod parameters;
pub mod sigma;

mod serialization;
mod utils;


pub use errors::{Result, SigmaError};
pub use utils::{random_scalar, CurvePoint};
