// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

///////////////
// Constants //
// ========= //
///////////////

/// Soundness parameter of the sigma protocols, in bits. Challenges and the
/// coefficients of threshold polynomials are this wide.
pub const SOUNDNESS_BITS: usize = 192;

/// Width of a challenge (and of a GF(2^192) element) in bytes.
pub const SOUNDNESS_BYTES: usize = SOUNDNESS_BITS / 8;

/// Width of an encoded scalar: the byte length of the group order.
pub const GROUP_ORDER_BYTES: usize = 32;

/// Width of an encoded group element: one sign byte plus the x-coordinate.
/// The all-zero string of this length encodes the identity.
pub const GROUP_POINT_BYTES: usize = 33;

/// Hard cap on the serialized size of a box, in bytes.
pub const MAX_BOX_SIZE_BYTES: usize = 4096;

/// Hard cap on the number of tokens colocated with a box.
pub const MAX_TOKENS: usize = 255;

/// Number of optional register slots in a box (R4 through R9).
pub const MAX_OPTIONAL_REGISTERS: usize = 6;

/// Cap on the nesting depth accepted when decoding proposition trees and
/// proofs. Deeper inputs are rejected rather than recursed into.
pub(crate) const MAX_TREE_DEPTH: usize = 64;
