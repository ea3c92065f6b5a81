//! ERC-20 metadata ABI codec
//!
//! Encodes the four parameterless metadata calls and decodes their return
//! data. Decoding works on byte buffers; hex only appears at the edges.
//!
//! String returns come in two layouts:
//! - legacy `bytes32`: exactly 32 bytes, right-padded with zeros
//! - standard dynamic: offset word, length word, then `length` bytes of UTF-8
//!   padded to a 32-byte boundary

use alloy_primitives::U256;
use std::fmt;

use crate::utils::constants::{
    ABI_STRING_MAX_LEN, ABI_STRING_MIN_LEN, SELECTOR_DECIMALS, SELECTOR_NAME, SELECTOR_SYMBOL,
    SELECTOR_TOTAL_SUPPLY,
};

const WORD: usize = 32;

/// Read-only ERC-20 metadata calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erc20Call {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
}

impl Erc20Call {
    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::Name => SELECTOR_NAME,
            Self::Symbol => SELECTOR_SYMBOL,
            Self::Decimals => SELECTOR_DECIMALS,
            Self::TotalSupply => SELECTOR_TOTAL_SUPPLY,
        }
    }

    /// Call data as `0x`-prefixed hex (selector only, no arguments)
    pub fn calldata(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }

    pub fn signature(&self) -> &'static str {
        match self {
            Self::Name => "name()",
            Self::Symbol => "symbol()",
            Self::Decimals => "decimals()",
            Self::TotalSupply => "totalSupply()",
        }
    }
}

/// Decoding failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    InvalidHex(String),
    /// Length word outside the accepted range, or an unexpected layout
    Malformed(String),
    /// Declared payload runs past the end of the buffer
    Truncated { needed: usize, available: usize },
    InvalidUtf8,
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex(e) => write!(f, "invalid hex: {}", e),
            Self::Malformed(e) => write!(f, "malformed ABI data: {}", e),
            Self::Truncated { needed, available } => {
                write!(f, "truncated ABI data: need {} bytes, have {}", needed, available)
            }
            Self::InvalidUtf8 => write!(f, "string payload is not valid UTF-8"),
        }
    }
}

impl std::error::Error for AbiError {}

pub struct AbiCodec;

impl AbiCodec {
    /// Hex result of an `eth_call` into bytes. `""` and `"0x"` yield an empty buffer.
    pub fn decode_hex(result: &str) -> Result<Vec<u8>, AbiError> {
        let trimmed = result.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
    }

    /// Big-endian unsigned integer from the first return word.
    /// `None` for empty return data.
    pub fn decode_uint(data: &[u8]) -> Option<U256> {
        if data.is_empty() {
            return None;
        }
        let word = &data[..data.len().min(WORD)];
        Some(U256::from_be_slice(word))
    }

    /// String return value. Empty data decodes to `""`.
    pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
        if data.is_empty() {
            return Ok(String::new());
        }
        if data.len() == WORD {
            return Self::decode_fixed_string(data);
        }
        if data.len() < 2 * WORD {
            return Err(AbiError::Malformed(format!(
                "{} bytes is neither bytes32 nor a dynamic string",
                data.len()
            )));
        }
        Self::decode_dynamic_string(data)
    }

    /// Convenience wrapper: hex straight to string
    pub fn decode_string_hex(result: &str) -> Result<String, AbiError> {
        Self::decode_string(&Self::decode_hex(result)?)
    }

    fn decode_fixed_string(word: &[u8]) -> Result<String, AbiError> {
        let end = word.iter().position(|&b| b == 0).unwrap_or(word.len());
        let text = std::str::from_utf8(&word[..end]).map_err(|_| AbiError::InvalidUtf8)?;
        Ok(text.trim().to_string())
    }

    fn decode_dynamic_string(data: &[u8]) -> Result<String, AbiError> {
        // First word is the offset; always 0x20 for a single return value
        let length_word = U256::from_be_slice(&data[WORD..2 * WORD]);
        let length = u64::try_from(length_word)
            .ok()
            .map(|len| len as usize)
            .filter(|len| (ABI_STRING_MIN_LEN..=ABI_STRING_MAX_LEN).contains(len))
            .ok_or_else(|| AbiError::Malformed(format!("string length {} out of range", length_word)))?;

        let start = 2 * WORD;
        let end = start + length;
        if data.len() < end {
            return Err(AbiError::Truncated {
                needed: end,
                available: data.len(),
            });
        }

        let text = std::str::from_utf8(&data[start..end]).map_err(|_| AbiError::InvalidUtf8)?;
        Ok(text.trim_end_matches('\0').trim().to_string())
    }
}
