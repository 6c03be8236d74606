// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The sigma boolean tree: statements about discrete logarithms combined
//! with AND / OR / k-of-n THRESHOLD connectives, together with their
//! deterministic byte encoding.
//!
//! Two parallel tree shapes live in this module tree: the proposition form
//! defined here (what a prover claims) and the unchecked form in
//! [`unchecked`] (a proposition annotated with challenges and responses).

pub mod challenge;
pub mod fiat_shamir;
pub mod prover;
pub mod sig_serializer;
pub mod unchecked;
pub mod verifier;

use crate::{
    errors::{Result, SigmaError},
    parameters::MAX_TREE_DEPTH,
    serialization::{SigmaByteReader, SigmaByteWriter},
    utils::CurvePoint,
};
use serde::{Deserialize, Serialize};

// Proposition wire tags. Leaves carry their points inline; connectives
// carry a child count (and `k` for thresholds) followed by the children.
const TAG_PROVE_DLOG: u8 = 0xcd;
const TAG_PROVE_DH_TUPLE: u8 = 0xce;
const TAG_AND: u8 = 0x96;
const TAG_OR: u8 = 0x97;
const TAG_THRESHOLD: u8 = 0x98;

/// Statement "I know `w` such that `g^w = h`", identified by its public
/// image `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveDlog {
    pub h: CurvePoint,
}

impl ProveDlog {
    pub fn new(h: CurvePoint) -> Self {
        Self { h }
    }
}

/// Statement "I know `w` such that `u = g^w` and `v = h^w`" for the given
/// tuple of group elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveDhTuple {
    pub g: CurvePoint,
    pub h: CurvePoint,
    pub u: CurvePoint,
    pub v: CurvePoint,
}

impl ProveDhTuple {
    pub fn new(g: CurvePoint, h: CurvePoint, u: CurvePoint, v: CurvePoint) -> Self {
        Self { g, h, u, v }
    }
}

/// A leaf statement of a sigma proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigmaLeaf {
    ProveDlog(ProveDlog),
    ProveDhTuple(ProveDhTuple),
}

impl From<ProveDlog> for SigmaLeaf {
    fn from(leaf: ProveDlog) -> Self {
        SigmaLeaf::ProveDlog(leaf)
    }
}

impl From<ProveDhTuple> for SigmaLeaf {
    fn from(leaf: ProveDhTuple) -> Self {
        SigmaLeaf::ProveDhTuple(leaf)
    }
}

/// A sigma proposition: leaves combined with logical connectives.
///
/// Shape invariants: `Cand` and `Cor` have at least two children,
/// `Cthreshold` satisfies `1 <= k <= children.len() <= 255`. The
/// constructors and the parser both enforce them; hand-assembled trees can
/// be re-checked with [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigmaBoolean {
    Leaf(SigmaLeaf),
    Cand(Vec<SigmaBoolean>),
    Cor(Vec<SigmaBoolean>),
    Cthreshold(u8, Vec<SigmaBoolean>),
}

impl From<ProveDlog> for SigmaBoolean {
    fn from(leaf: ProveDlog) -> Self {
        SigmaBoolean::Leaf(leaf.into())
    }
}

impl From<SigmaLeaf> for SigmaBoolean {
    fn from(leaf: SigmaLeaf) -> Self {
        SigmaBoolean::Leaf(leaf)
    }
}

impl From<ProveDhTuple> for SigmaBoolean {
    fn from(leaf: ProveDhTuple) -> Self {
        SigmaBoolean::Leaf(leaf.into())
    }
}

impl SigmaBoolean {
    /// Conjunction of two or more propositions.
    pub fn cand(children: Vec<SigmaBoolean>) -> Result<Self> {
        if children.len() < 2 || children.len() > 255 {
            return Err(SigmaError::InvalidProposition);
        }
        Ok(SigmaBoolean::Cand(children))
    }

    /// Disjunction of two or more propositions.
    pub fn cor(children: Vec<SigmaBoolean>) -> Result<Self> {
        if children.len() < 2 || children.len() > 255 {
            return Err(SigmaError::InvalidProposition);
        }
        Ok(SigmaBoolean::Cor(children))
    }

    /// k-of-n threshold over the given propositions.
    pub fn cthreshold(k: u8, children: Vec<SigmaBoolean>) -> Result<Self> {
        if children.is_empty() || children.len() > 255 {
            return Err(SigmaError::InvalidProposition);
        }
        if k == 0 || usize::from(k) > children.len() {
            return Err(SigmaError::InvalidProposition);
        }
        Ok(SigmaBoolean::Cthreshold(k, children))
    }

    /// Re-check the shape invariants over the whole tree.
    pub fn validate(&self) -> Result<()> {
        self.validate_at_depth(0)
    }

    fn validate_at_depth(&self, depth: usize) -> Result<()> {
        if depth > MAX_TREE_DEPTH {
            return Err(SigmaError::InvalidProposition);
        }
        match self {
            SigmaBoolean::Leaf(_) => Ok(()),
            SigmaBoolean::Cand(children) | SigmaBoolean::Cor(children) => {
                if children.len() < 2 || children.len() > 255 {
                    return Err(SigmaError::InvalidProposition);
                }
                for child in children {
                    child.validate_at_depth(depth + 1)?;
                }
                Ok(())
            }
            SigmaBoolean::Cthreshold(k, children) => {
                if children.is_empty() || children.len() > 255 {
                    return Err(SigmaError::InvalidProposition);
                }
                if *k == 0 || usize::from(*k) > children.len() {
                    return Err(SigmaError::InvalidProposition);
                }
                for child in children {
                    child.validate_at_depth(depth + 1)?;
                }
                Ok(())
            }
        }
    }

    /// The deterministic byte encoding of this proposition. These bytes are
    /// part of the Fiat-Shamir hash input.
    pub fn prop_bytes(&self) -> Vec<u8> {
        let mut writer = SigmaByteWriter::new();
        self.sigma_serialize(&mut writer);
        writer.into_bytes()
    }

    pub(crate) fn sigma_serialize(&self, writer: &mut SigmaByteWriter) {
        match self {
            SigmaBoolean::Leaf(SigmaLeaf::ProveDlog(dlog)) => {
                writer.put_u8(TAG_PROVE_DLOG);
                writer.put_bytes(&dlog.h.to_bytes());
            }
            SigmaBoolean::Leaf(SigmaLeaf::ProveDhTuple(dht)) => {
                writer.put_u8(TAG_PROVE_DH_TUPLE);
                writer.put_bytes(&dht.g.to_bytes());
                writer.put_bytes(&dht.h.to_bytes());
                writer.put_bytes(&dht.u.to_bytes());
                writer.put_bytes(&dht.v.to_bytes());
            }
            SigmaBoolean::Cand(children) => {
                writer.put_u8(TAG_AND);
                writer.put_u8(children.len() as u8);
                for child in children {
                    child.sigma_serialize(writer);
                }
            }
            SigmaBoolean::Cor(children) => {
                writer.put_u8(TAG_OR);
                writer.put_u8(children.len() as u8);
                for child in children {
                    child.sigma_serialize(writer);
                }
            }
            SigmaBoolean::Cthreshold(k, children) => {
                writer.put_u8(TAG_THRESHOLD);
                writer.put_u8(*k);
                writer.put_u8(children.len() as u8);
                for child in children {
                    child.sigma_serialize(writer);
                }
            }
        }
    }

    /// Decode a proposition from the encoding produced by
    /// [`prop_bytes`](Self::prop_bytes). The whole input must be consumed.
    pub fn sigma_parse_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = SigmaByteReader::new(bytes);
        let prop = Self::sigma_parse(&mut reader, 0)?;
        if reader.remaining() != 0 {
            return Err(SigmaError::InvalidProposition);
        }
        Ok(prop)
    }

    pub(crate) fn sigma_parse(reader: &mut SigmaByteReader, depth: usize) -> Result<Self> {
        if depth > MAX_TREE_DEPTH {
            return Err(SigmaError::InvalidProposition);
        }
        let tag = reader.read_u8().map_err(|_| SigmaError::InvalidProposition)?;
        match tag {
            TAG_PROVE_DLOG => {
                let h = read_point(reader)?;
                Ok(ProveDlog::new(h).into())
            }
            TAG_PROVE_DH_TUPLE => {
                let g = read_point(reader)?;
                let h = read_point(reader)?;
                let u = read_point(reader)?;
                let v = read_point(reader)?;
                Ok(ProveDhTuple::new(g, h, u, v).into())
            }
            TAG_AND => {
                let children = Self::parse_children(reader, depth)?;
                Self::cand(children)
            }
            TAG_OR => {
                let children = Self::parse_children(reader, depth)?;
                Self::cor(children)
            }
            TAG_THRESHOLD => {
                let k = reader
                    .read_u8()
                    .map_err(|_| SigmaError::InvalidProposition)?;
                let children = Self::parse_children(reader, depth)?;
                Self::cthreshold(k, children)
            }
            _ => Err(SigmaError::InvalidProposition),
        }
    }

    fn parse_children(reader: &mut SigmaByteReader, depth: usize) -> Result<Vec<SigmaBoolean>> {
        let count = reader
            .read_u8()
            .map_err(|_| SigmaError::InvalidProposition)?;
        let mut children = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            children.push(Self::sigma_parse(reader, depth + 1)?);
        }
        Ok(children)
    }

    /// Leaves of the tree in depth-first left-to-right order.
    pub fn leaves(&self) -> Vec<&SigmaLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SigmaLeaf>) {
        match self {
            SigmaBoolean::Leaf(leaf) => out.push(leaf),
            SigmaBoolean::Cand(children)
            | SigmaBoolean::Cor(children)
            | SigmaBoolean::Cthreshold(_, children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

fn read_point(reader: &mut SigmaByteReader) -> Result<CurvePoint> {
    let bytes = reader
        .read_bytes(crate::parameters::GROUP_POINT_BYTES)
        .map_err(|_| SigmaError::InvalidEncoding)?;
    CurvePoint::try_from_bytes(bytes)
}
