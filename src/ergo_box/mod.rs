// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The box: the immutable UTXO record whose byte image is the message that
//! signatures are produced over.
//!
//! A box carries a monetary value, the guarding script's bytes, a creation
//! height, up to 255 tokens, and up to six typed constants in the optional
//! registers R4..R9. Registers R0..R3 are views derived from the other
//! fields. A box's identity is the hash of its full serialized form, so
//! equality compares ids.

pub mod serializer;

use crate::{
    errors::{Result, SigmaError},
    parameters::{MAX_OPTIONAL_REGISTERS, MAX_TOKENS},
    serialization::{SigmaByteReader, SigmaByteWriter},
    utils::CurvePoint,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A 32-byte token identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId(pub [u8; 32]);

/// A token identifier together with an amount, colocated with a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_id: TokenId,
    pub amount: u64,
}

/// The identifier of the transaction that created a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

/// A box identifier: the digest of the box's full byte image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxId([u8; 32]);

impl BoxId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for BoxId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Any register slot of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegisterId {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
}

/// The user-definable register slots R4..R9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NonMandatoryRegisterId {
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
}

impl NonMandatoryRegisterId {
    const ALL: [NonMandatoryRegisterId; MAX_OPTIONAL_REGISTERS] = [
        NonMandatoryRegisterId::R4,
        NonMandatoryRegisterId::R5,
        NonMandatoryRegisterId::R6,
        NonMandatoryRegisterId::R7,
        NonMandatoryRegisterId::R8,
        NonMandatoryRegisterId::R9,
    ];

    /// The slot number (4 through 9).
    pub fn index(&self) -> u8 {
        match self {
            NonMandatoryRegisterId::R4 => 4,
            NonMandatoryRegisterId::R5 => 5,
            NonMandatoryRegisterId::R6 => 6,
            NonMandatoryRegisterId::R7 => 7,
            NonMandatoryRegisterId::R8 => 8,
            NonMandatoryRegisterId::R9 => 9,
        }
    }
}

// Constant wire tags.
const TAG_BOOLEAN: u8 = 1;
const TAG_BYTE: u8 = 2;
const TAG_SHORT: u8 = 3;
const TAG_INT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_BYTE_ARRAY: u8 = 6;
const TAG_GROUP_ELEMENT: u8 = 7;

/// A typed constant storable in a non-mandatory register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constant {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    ByteArray(Vec<u8>),
    GroupElement(CurvePoint),
}

impl Constant {
    pub(crate) fn sigma_serialize(&self, writer: &mut SigmaByteWriter) {
        match self {
            Constant::Boolean(value) => {
                writer.put_u8(TAG_BOOLEAN);
                writer.put_u8(u8::from(*value));
            }
            Constant::Byte(value) => {
                writer.put_u8(TAG_BYTE);
                writer.put_u8(*value as u8);
            }
            Constant::Short(value) => {
                writer.put_u8(TAG_SHORT);
                writer.put_i16_varint(*value);
            }
            Constant::Int(value) => {
                writer.put_u8(TAG_INT);
                writer.put_i32_varint(*value);
            }
            Constant::Long(value) => {
                writer.put_u8(TAG_LONG);
                writer.put_i64_varint(*value);
            }
            Constant::ByteArray(bytes) => {
                writer.put_u8(TAG_BYTE_ARRAY);
                writer.put_u32_varint(bytes.len() as u32);
                writer.put_bytes(bytes);
            }
            Constant::GroupElement(point) => {
                writer.put_u8(TAG_GROUP_ELEMENT);
                writer.put_bytes(&point.to_bytes());
            }
        }
    }

    pub(crate) fn sigma_parse(reader: &mut SigmaByteReader) -> Result<Self> {
        let tag = reader.read_u8()?;
        match tag {
            TAG_BOOLEAN => match reader.read_u8()? {
                0 => Ok(Constant::Boolean(false)),
                1 => Ok(Constant::Boolean(true)),
                _ => Err(SigmaError::Serialization),
            },
            TAG_BYTE => Ok(Constant::Byte(reader.read_u8()? as i8)),
            TAG_SHORT => Ok(Constant::Short(reader.read_i16_varint()?)),
            TAG_INT => Ok(Constant::Int(reader.read_i32_varint()?)),
            TAG_LONG => Ok(Constant::Long(reader.read_i64_varint()?)),
            TAG_BYTE_ARRAY => {
                let len = reader.read_u32_varint()? as usize;
                Ok(Constant::ByteArray(reader.read_bytes(len)?.to_vec()))
            }
            TAG_GROUP_ELEMENT => {
                let bytes = reader.read_bytes(crate::parameters::GROUP_POINT_BYTES)?;
                Ok(Constant::GroupElement(CurvePoint::try_from_bytes(bytes)?))
            }
            _ => Err(SigmaError::Serialization),
        }
    }
}

/// What a register read yields: the mandatory slots R0..R3 are views of the
/// box's other fields, R4..R9 are the stored constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterValue<'a> {
    /// R0: the monetary value.
    Value(u64),
    /// R1: the guarding script's bytes.
    ScriptBytes(&'a [u8]),
    /// R2: the token list.
    Tokens(&'a [Token]),
    /// R3: the creation info.
    CreationInfo {
        height: u32,
        transaction_id: &'a TxId,
        index: u16,
    },
    /// R4..R9: a stored constant.
    Constant(&'a Constant),
}

/// An immutable UTXO record.
///
/// Construction validates every shape invariant (register density, token
/// count, serialized size), so an existing box always serializes cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErgoBox {
    value: u64,
    script_bytes: Vec<u8>,
    creation_height: u32,
    tokens: Vec<Token>,
    /// Constants for R4, R5, ... in slot order, densely packed.
    additional_registers: Vec<Constant>,
    transaction_id: TxId,
    index: u16,
}

impl ErgoBox {
    /// Build and validate a box.
    ///
    /// Fails with [`SigmaError::TooManyTokens`] past 255 tokens,
    /// [`SigmaError::PackingViolation`] if the register map skips a slot,
    /// and [`SigmaError::OversizeBox`] if the serialized form would exceed
    /// the size cap.
    pub fn new(
        value: u64,
        script_bytes: Vec<u8>,
        creation_height: u32,
        tokens: Vec<Token>,
        registers: BTreeMap<NonMandatoryRegisterId, Constant>,
        transaction_id: TxId,
        index: u16,
    ) -> Result<Self> {
        if tokens.len() > MAX_TOKENS {
            return Err(SigmaError::TooManyTokens);
        }
        // densely packed means the occupied slots are exactly R4..R(4+n-1)
        for (slot, id) in NonMandatoryRegisterId::ALL
            .iter()
            .take(registers.len())
            .zip(registers.keys())
        {
            if slot != id {
                return Err(SigmaError::PackingViolation);
            }
        }
        let additional_registers = registers.into_values().collect();
        let ergo_box = Self {
            value,
            script_bytes,
            creation_height,
            tokens,
            additional_registers,
            transaction_id,
            index,
        };
        if ergo_box.to_bytes().len() > crate::parameters::MAX_BOX_SIZE_BYTES {
            return Err(SigmaError::OversizeBox);
        }
        Ok(ergo_box)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn script_bytes(&self) -> &[u8] {
        &self.script_bytes
    }

    pub fn creation_height(&self) -> u32 {
        self.creation_height
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn transaction_id(&self) -> &TxId {
        &self.transaction_id
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    /// Constants stored in R4, R5, ... in slot order.
    pub fn additional_registers(&self) -> &[Constant] {
        &self.additional_registers
    }

    /// Read any register. R0..R3 are derived views; R4..R9 yield the stored
    /// constant or `None` when the slot is empty.
    pub fn get(&self, id: RegisterId) -> Option<RegisterValue<'_>> {
        match id {
            RegisterId::R0 => Some(RegisterValue::Value(self.value)),
            RegisterId::R1 => Some(RegisterValue::ScriptBytes(&self.script_bytes)),
            RegisterId::R2 => Some(RegisterValue::Tokens(&self.tokens)),
            RegisterId::R3 => Some(RegisterValue::CreationInfo {
                height: self.creation_height,
                transaction_id: &self.transaction_id,
                index: self.index,
            }),
            RegisterId::R4 => self.constant_at(0),
            RegisterId::R5 => self.constant_at(1),
            RegisterId::R6 => self.constant_at(2),
            RegisterId::R7 => self.constant_at(3),
            RegisterId::R8 => self.constant_at(4),
            RegisterId::R9 => self.constant_at(5),
        }
    }

    fn constant_at(&self, slot: usize) -> Option<RegisterValue<'_>> {
        self.additional_registers
            .get(slot)
            .map(RegisterValue::Constant)
    }
}

/// Box equality is identity equality: two boxes are the same box exactly
/// when their byte images hash to the same id.
impl PartialEq for ErgoBox {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ErgoBox {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box(registers: BTreeMap<NonMandatoryRegisterId, Constant>) -> Result<ErgoBox> {
        ErgoBox::new(
            1_000_000,
            vec![0xca, 0xfe],
            42,
            vec![Token {
                token_id: TokenId([7u8; 32]),
                amount: 13,
            }],
            registers,
            TxId([9u8; 32]),
            3,
        )
    }

    #[test]
    fn mandatory_registers_are_views() -> Result<()> {
        let b = sample_box(BTreeMap::new())?;
        assert_eq!(b.get(RegisterId::R0), Some(RegisterValue::Value(1_000_000)));
        assert_eq!(
            b.get(RegisterId::R1),
            Some(RegisterValue::ScriptBytes(&[0xca, 0xfe]))
        );
        assert_eq!(b.get(RegisterId::R2), Some(RegisterValue::Tokens(b.tokens())));
        assert_eq!(
            b.get(RegisterId::R3),
            Some(RegisterValue::CreationInfo {
                height: 42,
                transaction_id: &TxId([9u8; 32]),
                index: 3,
            })
        );
        assert_eq!(b.get(RegisterId::R4), None);
        Ok(())
    }

    #[test]
    fn dense_registers_are_accepted_in_any_map_order() -> Result<()> {
        let mut registers = BTreeMap::new();
        registers.insert(NonMandatoryRegisterId::R5, Constant::Int(1));
        registers.insert(NonMandatoryRegisterId::R4, Constant::Int(0));
        let b = sample_box(registers)?;
        assert_eq!(
            b.get(RegisterId::R4),
            Some(RegisterValue::Constant(&Constant::Int(0)))
        );
        assert_eq!(
            b.get(RegisterId::R5),
            Some(RegisterValue::Constant(&Constant::Int(1)))
        );
        Ok(())
    }

    #[test]
    fn skipped_register_slot_is_a_packing_violation() {
        let mut registers = BTreeMap::new();
        registers.insert(NonMandatoryRegisterId::R5, Constant::Int(7));
        assert_eq!(
            sample_box(registers).unwrap_err(),
            SigmaError::PackingViolation
        );
        let mut registers = BTreeMap::new();
        registers.insert(NonMandatoryRegisterId::R4, Constant::Int(7));
        registers.insert(NonMandatoryRegisterId::R6, Constant::Int(8));
        assert_eq!(
            sample_box(registers).unwrap_err(),
            SigmaError::PackingViolation
        );
    }

    #[test]
    fn too_many_tokens_are_rejected() {
        let tokens = vec![
            Token {
                token_id: TokenId([1u8; 32]),
                amount: 1,
            };
            256
        ];
        let result = ErgoBox::new(
            1,
            vec![],
            0,
            tokens,
            BTreeMap::new(),
            TxId([0u8; 32]),
            0,
        );
        assert_eq!(result.unwrap_err(), SigmaError::TooManyTokens);
    }

    #[test]
    fn oversize_box_is_rejected() {
        let result = ErgoBox::new(
            1,
            vec![0u8; crate::parameters::MAX_BOX_SIZE_BYTES],
            0,
            vec![],
            BTreeMap::new(),
            TxId([0u8; 32]),
            0,
        );
        assert_eq!(result.unwrap_err(), SigmaError::OversizeBox);
    }

    #[test]
    fn equality_is_id_equality() -> Result<()> {
        let a = sample_box(BTreeMap::new())?;
        let b = sample_box(BTreeMap::new())?;
        assert_eq!(a, b);
        let c = ErgoBox::new(
            a.value() + 1,
            a.script_bytes().to_vec(),
            a.creation_height(),
            a.tokens().to_vec(),
            BTreeMap::new(),
            *a.transaction_id(),
            a.index(),
        )?;
        assert_ne!(a, c);
        Ok(())
    }
}
