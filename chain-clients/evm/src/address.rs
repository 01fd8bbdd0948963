//! EVM address helpers
//!
//! Parsing of `0x`-prefixed 20-byte addresses and EIP-55 mixed-case checksum
//! encoding.

use anyhow::{Context, Result};
use sha3::{Digest, Keccak256};

/// Parses a 20-byte EVM address.
///
/// Accepts 40 hex characters with or without a `0x` prefix, in any letter case.
/// The checksum of mixed-case input is not enforced.
///
/// # Arguments
///
/// * `address` - Address string (e.g., "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
///
/// # Returns
///
/// * `Ok([u8; 20])` - Raw address bytes
/// * `Err(anyhow::Error)` - Wrong length or non-hex characters
pub fn parse_address(address: &str) -> Result<[u8; 20]> {
    let trimmed = address.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if stripped.len() != 40 {
        anyhow::bail!(
            "Invalid address length: expected 40 hex characters, got {}",
            stripped.len()
        );
    }

    let bytes = hex::decode(stripped).with_context(|| format!("Invalid hex address: {}", address))?;
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Encodes raw address bytes in EIP-55 checksum form.
///
/// Each hex letter is upper-cased when the matching nibble of
/// keccak256(lowercase hex address) is 8 or greater.
pub fn checksum_encode(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts an address string to its canonical checksum form.
///
/// # Returns
///
/// * `Ok(String)` - `0x`-prefixed EIP-55 address
/// * `Err(anyhow::Error)` - Input is not a valid 20-byte address
pub fn to_checksum_address(address: &str) -> Result<String> {
    parse_address(address).map(|bytes| checksum_encode(&bytes))
}
