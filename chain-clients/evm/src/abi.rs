//! Solidity ABI encoding helpers
//!
//! Covers the subset of the ABI the bond contract needs: `uint256`, `address`,
//! `bool` and `string` arguments, plus decoding of dynamic tuples, strings and
//! `address[]` return values. Every value occupies one or more 32-byte words.

use anyhow::{Context, Result};
use ethereum_types::U256;
use sha3::{Digest, Keccak256};

use crate::address::checksum_encode;

/// Size of one ABI word in bytes
pub const WORD: usize = 32;

/// A single ABI-encodable argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address([u8; 20]),
    Bool(bool),
    String(String),
}

/// Computes the 4-byte function selector: keccak256(signature)[0..4].
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Computes the event topic hash for an event signature string.
///
/// Returns a lowercase `0x`-prefixed hex string, the format used in log topics.
pub fn event_topic(signature: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Encodes a full function call: selector followed by the encoded arguments.
///
/// Arguments are written in the order given; the order must match the
/// parameter order of `signature`.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&encode_args(args));
    data
}

/// Encodes an argument list (equivalently, a tuple) with head/tail layout.
///
/// Static values sit in the head. Dynamic values put an offset in the head,
/// measured from the start of the encoding, and their contents in the tail.
pub fn encode_args(args: &[AbiValue]) -> Vec<u8> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            AbiValue::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            AbiValue::Address(a) => head.extend_from_slice(&address_word(a)),
            AbiValue::Bool(b) => head.extend_from_slice(&uint_word(U256::from(u8::from(*b)))),
            AbiValue::String(s) => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                tail.extend_from_slice(&encode_bytes(s.as_bytes()));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encodes a `uint256` as a big-endian 32-byte word.
pub fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Encodes an `address` left-padded to 32 bytes.
pub fn address_word(address: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Length word followed by the bytes, right-padded to a word boundary.
fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD + bytes.len() + WORD);
    out.extend_from_slice(&uint_word(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    let padding = (WORD - (bytes.len() % WORD)) % WORD;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

// ============================================================================
// DECODING
// ============================================================================

/// Returns the 32-byte word starting at `offset`.
pub fn word(data: &[u8], offset: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(WORD)
        .ok_or_else(|| anyhow::anyhow!("ABI offset overflow"))?;
    data.get(offset..end).ok_or_else(|| {
        anyhow::anyhow!(
            "ABI data too short: need {} bytes, have {}",
            end,
            data.len()
        )
    })
}

/// Decodes a `uint256` at `offset`.
pub fn decode_uint(data: &[u8], offset: usize) -> Result<U256> {
    Ok(U256::from_big_endian(word(data, offset)?))
}

/// Decodes a `bool` at `offset`. Only 0 and 1 are accepted.
pub fn decode_bool(data: &[u8], offset: usize) -> Result<bool> {
    match decode_uint(data, offset)? {
        v if v.is_zero() => Ok(false),
        v if v == U256::one() => Ok(true),
        v => anyhow::bail!("Invalid ABI bool value: {}", v),
    }
}

/// Decodes an `address` at `offset` and returns it in checksum form.
pub fn decode_address(data: &[u8], offset: usize) -> Result<String> {
    let w = word(data, offset)?;
    if w[..12].iter().any(|b| *b != 0) {
        anyhow::bail!("Invalid ABI address: upper 12 bytes are not zero");
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&w[12..]);
    Ok(checksum_encode(&bytes))
}

/// Reads a head word holding an offset and resolves it against `base`.
fn decode_offset(data: &[u8], base: usize, head_offset: usize) -> Result<usize> {
    let relative = decode_uint(data, base + head_offset)?;
    if relative > U256::from(data.len()) {
        anyhow::bail!("ABI offset {} points past end of data", relative);
    }
    Ok(base + relative.as_usize())
}

/// Decodes a dynamic `string` whose offset is stored at `base + head_offset`.
///
/// `base` is the start of the enclosing tuple (0 for top-level return values).
pub fn decode_string(data: &[u8], base: usize, head_offset: usize) -> Result<String> {
    let start = decode_offset(data, base, head_offset)?;
    let len = decode_uint(data, start)?;
    if len > U256::from(data.len()) {
        anyhow::bail!("ABI string length {} exceeds data size", len);
    }
    let len = len.as_usize();
    let bytes = data
        .get(start + WORD..start + WORD + len)
        .ok_or_else(|| anyhow::anyhow!("ABI string runs past end of data"))?;
    String::from_utf8(bytes.to_vec()).context("ABI string is not valid UTF-8")
}

/// Decodes a dynamic `address[]` whose offset is stored at `base + head_offset`.
pub fn decode_address_array(data: &[u8], base: usize, head_offset: usize) -> Result<Vec<String>> {
    let start = decode_offset(data, base, head_offset)?;
    let len = decode_uint(data, start)?;
    if len > U256::from(data.len() / WORD) {
        anyhow::bail!("ABI array length {} exceeds data size", len);
    }
    (0..len.as_usize())
        .map(|i| decode_address(data, start + WORD + i * WORD))
        .collect()
}

/// Decodes a `0x`-prefixed hex blob (eth_call results, log data).
pub fn decode_hex(data: &str) -> Result<Vec<u8>> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(stripped).with_context(|| format!("Invalid hex data: {}", data))
}
