//! EIP-712 Value Encoding Helpers
//!
//! Parsing of JSON values into the 32-byte words used by the standard field
//! types. Integers go through `BigInt` so the full `uint256`/`int256` range
//! is covered.

use crate::error::{Eip712Error, Eip712Result};
use num_bigint::{BigInt, Sign};
use serde_json::Value;

/// A single 32-byte ABI word
pub type Word = [u8; 32];

/// Parse an Ethereum address
pub fn parse_address(addr: &str) -> Eip712Result<[u8; 20]> {
    let addr = addr.strip_prefix("0x").unwrap_or(addr);

    if addr.len() != 40 {
        return Err(Eip712Error::InvalidAddress(format!(
            "invalid length: expected 40 hex chars, got {}",
            addr.len()
        )));
    }

    let bytes = hex::decode(addr).map_err(|e| {
        Eip712Error::InvalidAddress(format!("invalid hex: {}", e))
    })?;

    let mut result = [0u8; 20];
    result.copy_from_slice(&bytes);
    Ok(result)
}

/// Parse a hex string (with or without 0x prefix)
pub fn parse_hex(s: &str) -> Eip712Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = s.strip_prefix("0X").unwrap_or(s);

    hex::decode(s).map_err(|e| {
        Eip712Error::EncodingError(format!("invalid hex: {}", e))
    })
}

/// Parse an integer value (number, decimal string or 0x-prefixed hex string)
///
/// Strings may carry a leading `-`. Floats are rejected.
pub fn parse_integer(type_name: &str, value: &Value) -> Eip712Result<BigInt> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Ok(BigInt::from(u));
            }
            if let Some(i) = n.as_i64() {
                return Ok(BigInt::from(i));
            }
            Err(Eip712Error::invalid_value(type_name, value))
        }
        Value::String(s) => parse_integer_str(type_name, s),
        _ => Err(Eip712Error::invalid_value(type_name, value)),
    }
}

fn parse_integer_str(type_name: &str, s: &str) -> Eip712Result<BigInt> {
    let trimmed = s.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if digits.is_empty() || digits.starts_with(['-', '+']) {
        return Err(Eip712Error::invalid_value(type_name, s));
    }

    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex_digits) => BigInt::parse_bytes(hex_digits.as_bytes(), 16),
        None => BigInt::parse_bytes(digits.as_bytes(), 10),
    }
    .ok_or_else(|| Eip712Error::invalid_value(type_name, s))?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Encode an unsigned integer into a big-endian word, checking it fits `bits`
pub fn encode_uint_word(type_name: &str, n: &BigInt, bits: u16) -> Eip712Result<Word> {
    if n.sign() == Sign::Minus || n.bits() > u64::from(bits) {
        return Err(Eip712Error::invalid_value(
            type_name,
            format!("{} out of range", n),
        ));
    }

    let (_, bytes) = n.to_bytes_be();
    let mut word = [0u8; 32];
    if n.sign() != Sign::NoSign {
        word[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    Ok(word)
}

/// Encode a signed integer as a sign-extended two's complement word
pub fn encode_int_word(type_name: &str, n: &BigInt, bits: u16) -> Eip712Result<Word> {
    let magnitude_bits = u64::from(bits) - 1;
    let fits = if n.sign() == Sign::Minus {
        // -2^(bits-1) is the smallest value, so compare |n| - 1
        (-n - BigInt::from(1u8)).bits() <= magnitude_bits
    } else {
        n.bits() <= magnitude_bits
    };
    if !fits {
        return Err(Eip712Error::invalid_value(
            type_name,
            format!("{} out of range", n),
        ));
    }

    let bytes = n.to_signed_bytes_be();
    let mut word = if n.sign() == Sign::Minus { [0xff; 32] } else { [0u8; 32] };
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Left-pad a 20-byte address into a word
pub fn address_word(address: &[u8; 20]) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}
