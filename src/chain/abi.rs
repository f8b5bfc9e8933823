// Copyright (c) Story Indexer Team
// SPDX-License-Identifier: Apache-2.0

//! Minimal ABI encoding and decoding for the read-only contract surface
//! this service touches. Arguments are all static types (addresses and
//! unsigned integers); results additionally include dynamic strings, bytes
//! and the two tuple-shaped structs returned by the metadata-view and
//! license-template contracts. Anything outside the expected shape is
//! rejected at this boundary.

use sha3::{Digest, Keccak256};
use thiserror::Error;

use crate::address::Address;

const WORD: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("return data truncated")]
    Truncated,
    #[error("integer value does not fit the expected width")]
    Overflow,
    #[error("expected boolean word, found other bits set")]
    NotABool,
    #[error("dynamic offset or length out of bounds")]
    BadOffset,
    #[error("string payload is not valid UTF-8")]
    BadUtf8,
}

pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// First four bytes of the Keccak-256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Call-data builder: selector followed by 32-byte head words. Only static
/// argument types are supported, which covers every read this service
/// performs.
pub struct CallBuilder {
    data: Vec<u8>,
}

impl CallBuilder {
    pub fn new(signature: &str) -> Self {
        let mut data = Vec::with_capacity(4 + 3 * WORD);
        data.extend_from_slice(&selector(signature));
        Self { data }
    }

    pub fn address(mut self, value: Address) -> Self {
        self.data.extend_from_slice(&enc::word_address(value));
        self
    }

    pub fn uint(mut self, value: u128) -> Self {
        self.data.extend_from_slice(&enc::word_uint(value));
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Cursor over ABI return data. A `Decoder` walks the head words of one
/// tuple frame; dynamic members are followed through their offsets, which
/// are relative to the frame base.
pub struct Decoder<'a> {
    data: &'a [u8],
    base: usize,
    cursor: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, base: 0, cursor: 0 }
    }

    fn head_word(&mut self) -> Result<&'a [u8], AbiError> {
        let start = self.base.checked_add(self.cursor).ok_or(AbiError::Truncated)?;
        let end = start.checked_add(WORD).ok_or(AbiError::Truncated)?;
        if end > self.data.len() {
            return Err(AbiError::Truncated);
        }
        self.cursor += WORD;
        Ok(&self.data[start..end])
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8], AbiError> {
        let end = offset.checked_add(WORD).ok_or(AbiError::BadOffset)?;
        if end > self.data.len() {
            return Err(AbiError::BadOffset);
        }
        Ok(&self.data[offset..end])
    }

    pub fn uint_u128(&mut self) -> Result<u128, AbiError> {
        let word = self.head_word()?;
        if word[..16].iter().any(|b| *b != 0) {
            return Err(AbiError::Overflow);
        }
        Ok(u128::from_be_bytes(word[16..].try_into().expect("16-byte slice")))
    }

    pub fn uint_u64(&mut self) -> Result<u64, AbiError> {
        let value = self.uint_u128()?;
        u64::try_from(value).map_err(|_| AbiError::Overflow)
    }

    pub fn uint_u32(&mut self) -> Result<u32, AbiError> {
        let value = self.uint_u128()?;
        u32::try_from(value).map_err(|_| AbiError::Overflow)
    }

    pub fn boolean(&mut self) -> Result<bool, AbiError> {
        let word = self.head_word()?;
        if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
            return Err(AbiError::NotABool);
        }
        Ok(word[31] == 1)
    }

    pub fn address(&mut self) -> Result<Address, AbiError> {
        let word = self.head_word()?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&word[12..]);
        Ok(Address::new(out))
    }

    pub fn fixed_bytes32(&mut self) -> Result<[u8; 32], AbiError> {
        let word = self.head_word()?;
        let mut out = [0u8; 32];
        out.copy_from_slice(word);
        Ok(out)
    }

    /// Follow the offset in the next head slot into a nested tuple frame.
    pub fn tuple(&mut self) -> Result<Decoder<'a>, AbiError> {
        let offset = self.offset_word()?;
        let base = self.base.checked_add(offset).ok_or(AbiError::BadOffset)?;
        Ok(Decoder { data: self.data, base, cursor: 0 })
    }

    pub fn string(&mut self) -> Result<String, AbiError> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes).map_err(|_| AbiError::BadUtf8)
    }

    pub fn bytes(&mut self) -> Result<Vec<u8>, AbiError> {
        let offset = self.offset_word()?;
        let tail = self.base.checked_add(offset).ok_or(AbiError::BadOffset)?;
        let len_word = self.word_at(tail)?;
        if len_word[..16].iter().any(|b| *b != 0) {
            return Err(AbiError::BadOffset);
        }
        let len = u128::from_be_bytes(len_word[16..].try_into().expect("16-byte slice"))
            as usize;
        let start = tail + WORD;
        let end = start.checked_add(len).ok_or(AbiError::BadOffset)?;
        if end > self.data.len() {
            return Err(AbiError::BadOffset);
        }
        Ok(self.data[start..end].to_vec())
    }

    fn offset_word(&mut self) -> Result<usize, AbiError> {
        let word = self.head_word()?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(AbiError::BadOffset);
        }
        Ok(u64::from_be_bytes(word[24..].try_into().expect("8-byte slice")) as usize)
    }
}

/// Word-level encoding helpers, shared by `CallBuilder` and by the canned
/// return data that contract-read doubles hand out in tests.
pub mod enc {
    use super::WORD;
    use crate::address::Address;

    pub fn word_uint(value: u128) -> [u8; WORD] {
        let mut word = [0u8; WORD];
        word[16..].copy_from_slice(&value.to_be_bytes());
        word
    }

    pub fn word_bool(value: bool) -> [u8; WORD] {
        word_uint(u128::from(value))
    }

    pub fn word_address(value: Address) -> [u8; WORD] {
        let mut word = [0u8; WORD];
        word[12..].copy_from_slice(value.as_bytes());
        word
    }

    /// Length-prefixed, zero-padded dynamic payload.
    pub fn dynamic(payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&word_uint(payload.len() as u128));
        out.extend_from_slice(payload);
        let pad = (WORD - payload.len() % WORD) % WORD;
        out.extend(std::iter::repeat(0u8).take(pad));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_known_values() {
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("totalSupply()"), [0x18, 0x16, 0x0d, 0xdd]);
    }

    #[test]
    fn encodes_static_arguments() {
        let owner: Address =
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        let data = CallBuilder::new("balanceOf(address)").address(owner).build();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], owner.as_bytes());
    }

    #[test]
    fn decodes_uint_and_rejects_overflow() {
        let mut data = Vec::new();
        data.extend_from_slice(&enc::word_uint(42));
        assert_eq!(Decoder::new(&data).uint_u64().unwrap(), 42);

        let mut wide = [0u8; 32];
        wide[0] = 1; // bit above u128
        assert_eq!(Decoder::new(&wide).uint_u128(), Err(AbiError::Overflow));

        let too_big_for_u64 = enc::word_uint(u128::from(u64::MAX) + 1);
        assert_eq!(Decoder::new(&too_big_for_u64).uint_u64(), Err(AbiError::Overflow));
    }

    #[test]
    fn decodes_dynamic_string() {
        // Single string return: offset word, then length + payload.
        let mut data = Vec::new();
        data.extend_from_slice(&enc::word_uint(0x20));
        data.extend_from_slice(&enc::dynamic(b"ipfs://QmExample"));
        assert_eq!(Decoder::new(&data).string().unwrap(), "ipfs://QmExample");
    }

    #[test]
    fn decodes_static_pair() {
        // (address, uint256) multi-return is laid out in place.
        let template: Address =
            "0x58E2c909D557Cd23EF90D14f8fd21667A5Ae7a93".parse().unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(&enc::word_address(template));
        data.extend_from_slice(&enc::word_uint(7));
        let mut dec = Decoder::new(&data);
        assert_eq!(dec.address().unwrap(), template);
        assert_eq!(dec.uint_u64().unwrap(), 7);
    }

    #[test]
    fn decodes_nested_tuple_with_dynamic_members() {
        // Outer frame: one offset word pointing at a (string, uint256) tuple.
        let mut tuple = Vec::new();
        tuple.extend_from_slice(&enc::word_uint(0x40)); // string offset within tuple
        tuple.extend_from_slice(&enc::word_uint(99));
        tuple.extend_from_slice(&enc::dynamic(b"hello"));

        let mut data = Vec::new();
        data.extend_from_slice(&enc::word_uint(0x20));
        data.extend_from_slice(&tuple);

        let mut outer = Decoder::new(&data);
        let mut inner = outer.tuple().unwrap();
        assert_eq!(inner.string().unwrap(), "hello");
        assert_eq!(inner.uint_u64().unwrap(), 99);
    }

    #[test]
    fn truncated_data_is_rejected() {
        let data = [0u8; 16];
        assert_eq!(Decoder::new(&data).uint_u64(), Err(AbiError::Truncated));
    }
}
