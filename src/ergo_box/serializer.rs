// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The deterministic box wire format.
//!
//! Body layout: value (varint), script blob (varint length + bytes),
//! creation height (varint), one token-count byte, the tokens, one
//! register-count byte, the R4.. constants in slot order. The full image
//! appends the creating transaction's id and the box index; its hash is the
//! box id.
//!
//! Token ids are written either as full 32-byte digests or, when a digest
//! table is supplied, as varint indexes into that table. The choice is a
//! serializer argument and leaves no trace in the bytes, so both sides must
//! agree on it.

use super::{BoxId, Constant, ErgoBox, NonMandatoryRegisterId, Token, TokenId, TxId};
use crate::{
    errors::{Result, SigmaError},
    parameters::{MAX_BOX_SIZE_BYTES, MAX_OPTIONAL_REGISTERS},
    serialization::{SigmaByteReader, SigmaByteWriter},
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

impl ErgoBox {
    /// The box id: the digest of the full byte image.
    pub fn id(&self) -> BoxId {
        let digest = Sha256::digest(self.to_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        BoxId::from(bytes)
    }

    /// Serialize the full byte image with inline 32-byte token ids.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = SigmaByteWriter::new();
        // a validated box always finds its token ids when no table is used
        let _ = self.serialize_into(&mut writer, None);
        writer.into_bytes()
    }

    /// Serialize the full byte image writing token ids as indexes into the
    /// supplied digest table. Fails if a token id is absent from the table.
    pub fn to_bytes_with_indexes(&self, token_table: &[TokenId]) -> Result<Vec<u8>> {
        let mut writer = SigmaByteWriter::new();
        self.serialize_into(&mut writer, Some(token_table))?;
        Ok(writer.into_bytes())
    }

    fn serialize_into(
        &self,
        writer: &mut SigmaByteWriter,
        token_table: Option<&[TokenId]>,
    ) -> Result<()> {
        writer.put_u64_varint(self.value);
        writer.put_u32_varint(self.script_bytes.len() as u32);
        writer.put_bytes(&self.script_bytes);
        writer.put_u32_varint(self.creation_height);
        writer.put_u8(self.tokens.len() as u8);
        for token in &self.tokens {
            match token_table {
                None => writer.put_bytes(&token.token_id.0),
                Some(table) => {
                    let index = table
                        .iter()
                        .position(|id| *id == token.token_id)
                        .ok_or(SigmaError::Serialization)?;
                    writer.put_u64_varint(index as u64);
                }
            }
            writer.put_u64_varint(token.amount);
        }
        writer.put_u8(self.additional_registers.len() as u8);
        for constant in &self.additional_registers {
            constant.sigma_serialize(writer);
        }
        writer.put_bytes(&self.transaction_id.0);
        writer.put_u16_varint(self.index);
        Ok(())
    }

    /// Parse a box serialized with inline token ids. The whole input must
    /// be consumed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::parse(bytes, None)
    }

    /// Parse a box serialized against the supplied token digest table.
    pub fn from_slice_with_indexes(bytes: &[u8], token_table: &[TokenId]) -> Result<Self> {
        Self::parse(bytes, Some(token_table))
    }

    fn parse(bytes: &[u8], token_table: Option<&[TokenId]>) -> Result<Self> {
        if bytes.len() > MAX_BOX_SIZE_BYTES {
            return Err(SigmaError::OversizeBox);
        }
        let mut reader = SigmaByteReader::new(bytes);
        let value = reader.read_u64_varint()?;
        let script_len = reader.read_u32_varint()? as usize;
        let script_bytes = reader.read_bytes(script_len)?.to_vec();
        let creation_height = reader.read_u32_varint()?;

        let token_count = reader.read_u8()?;
        let mut tokens = Vec::with_capacity(usize::from(token_count));
        for _ in 0..token_count {
            let token_id = match token_table {
                None => TokenId(reader.read_array::<32>()?),
                Some(table) => {
                    let index = reader.read_u64_varint()? as usize;
                    *table.get(index).ok_or(SigmaError::Serialization)?
                }
            };
            let amount = reader.read_u64_varint()?;
            tokens.push(Token { token_id, amount });
        }

        let register_count = reader.read_u8()?;
        if usize::from(register_count) > MAX_OPTIONAL_REGISTERS {
            return Err(SigmaError::RegisterOverflow);
        }
        let mut registers = BTreeMap::new();
        for slot in NonMandatoryRegisterId::ALL
            .iter()
            .take(usize::from(register_count))
        {
            registers.insert(*slot, Constant::sigma_parse(&mut reader)?);
        }

        let transaction_id = TxId(reader.read_array::<32>()?);
        let index = reader.read_u16_varint()?;
        if reader.remaining() != 0 {
            return Err(SigmaError::Serialization);
        }
        Self::new(
            value,
            script_bytes,
            creation_height,
            tokens,
            registers,
            transaction_id,
            index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ergo_box::RegisterId,
        utils::{random_scalar, testing::init_testing, CurvePoint},
    };

    fn registers(constants: Vec<Constant>) -> BTreeMap<NonMandatoryRegisterId, Constant> {
        NonMandatoryRegisterId::ALL
            .iter()
            .copied()
            .zip(constants)
            .collect()
    }

    fn rich_box() -> Result<ErgoBox> {
        let mut rng = init_testing();
        ErgoBox::new(
            9_999_999_999,
            vec![1, 2, 3, 4, 5],
            812_345,
            vec![
                Token {
                    token_id: TokenId([0xaa; 32]),
                    amount: 1,
                },
                Token {
                    token_id: TokenId([0xbb; 32]),
                    amount: u64::MAX,
                },
            ],
            registers(vec![
                Constant::Boolean(true),
                Constant::Byte(-3),
                Constant::Short(-12345),
                Constant::Int(7),
                Constant::Long(i64::MIN),
                Constant::GroupElement(
                    CurvePoint::GENERATOR.multiply_by_scalar(&random_scalar(&mut rng)),
                ),
            ]),
            TxId([0x11; 32]),
            65535,
        )
    }

    #[test]
    fn round_trip_with_inline_token_ids() -> Result<()> {
        let b = rich_box()?;
        let bytes = b.to_bytes();
        let parsed = ErgoBox::from_slice(&bytes)?;
        assert_eq!(parsed, b);
        assert_eq!(parsed.to_bytes(), bytes);
        Ok(())
    }

    #[test]
    fn round_trip_with_indexed_token_ids() -> Result<()> {
        let b = rich_box()?;
        let table = [TokenId([0xbb; 32]), TokenId([0xaa; 32])];
        let bytes = b.to_bytes_with_indexes(&table)?;
        // indexed ids are shorter than inline digests
        assert!(bytes.len() < b.to_bytes().len());
        let parsed = ErgoBox::from_slice_with_indexes(&bytes, &table)?;
        assert_eq!(parsed, b);
        Ok(())
    }

    #[test]
    fn missing_table_entry_fails() -> Result<()> {
        let b = rich_box()?;
        let table = [TokenId([0xaa; 32])];
        assert_eq!(
            b.to_bytes_with_indexes(&table).unwrap_err(),
            SigmaError::Serialization
        );
        Ok(())
    }

    #[test]
    fn out_of_range_table_index_fails() -> Result<()> {
        let b = rich_box()?;
        let full = [TokenId([0xaa; 32]), TokenId([0xbb; 32])];
        let bytes = b.to_bytes_with_indexes(&full)?;
        let short = [TokenId([0xaa; 32])];
        assert!(ErgoBox::from_slice_with_indexes(&bytes, &short).is_err());
        Ok(())
    }

    #[test]
    fn id_depends_on_every_byte() -> Result<()> {
        let b = rich_box()?;
        let bytes = b.to_bytes();
        let id = b.id();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 1;
            // either the tampered bytes no longer parse, or they parse to a
            // box with a different id
            if let Ok(parsed) = ErgoBox::from_slice(&tampered) {
                assert_ne!(parsed.id(), id, "byte {i} did not affect the id");
            }
        }
        Ok(())
    }

    #[test]
    fn truncations_fail() -> Result<()> {
        let b = rich_box()?;
        let bytes = b.to_bytes();
        for cut in 0..bytes.len() {
            assert!(ErgoBox::from_slice(&bytes[..cut]).is_err());
        }
        Ok(())
    }

    #[test]
    fn trailing_bytes_fail() -> Result<()> {
        let b = rich_box()?;
        let mut bytes = b.to_bytes();
        bytes.push(0);
        assert!(ErgoBox::from_slice(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn register_count_over_six_is_register_overflow() -> Result<()> {
        let b = ErgoBox::new(
            5,
            vec![],
            0,
            vec![],
            BTreeMap::new(),
            TxId([0u8; 32]),
            0,
        )?;
        let mut bytes = b.to_bytes();
        // body for an empty box: value, script len 0, height, token count,
        // register count, txid, index -- the register count byte sits right
        // before the 32-byte txid and the final index byte
        let reg_count_at = bytes.len() - 34;
        assert_eq!(bytes[reg_count_at], 0);
        bytes[reg_count_at] = 7;
        assert_eq!(
            ErgoBox::from_slice(&bytes).unwrap_err(),
            SigmaError::RegisterOverflow
        );
        Ok(())
    }

    #[test]
    fn constant_codec_round_trip() -> Result<()> {
        let mut rng = init_testing();
        let constants = vec![
            Constant::Boolean(false),
            Constant::Byte(i8::MIN),
            Constant::Short(i16::MAX),
            Constant::Int(-1),
            Constant::Long(1),
            Constant::ByteArray(vec![0, 1, 2, 255]),
            Constant::ByteArray(vec![]),
            Constant::GroupElement(
                CurvePoint::GENERATOR.multiply_by_scalar(&random_scalar(&mut rng)),
            ),
            Constant::GroupElement(CurvePoint::IDENTITY),
        ];
        for constant in constants {
            let mut writer = SigmaByteWriter::new();
            constant.sigma_serialize(&mut writer);
            let bytes = writer.into_bytes();
            let mut reader = SigmaByteReader::new(&bytes);
            assert_eq!(Constant::sigma_parse(&mut reader)?, constant);
            assert_eq!(reader.remaining(), 0);
        }
        Ok(())
    }

    #[test]
    fn registers_survive_the_round_trip() -> Result<()> {
        let b = rich_box()?;
        let parsed = ErgoBox::from_slice(&b.to_bytes())?;
        assert_eq!(parsed.get(RegisterId::R4), b.get(RegisterId::R4));
        assert_eq!(parsed.get(RegisterId::R9), b.get(RegisterId::R9));
        assert_eq!(
            parsed.additional_registers(),
            b.additional_registers()
        );
        Ok(())
    }
}
