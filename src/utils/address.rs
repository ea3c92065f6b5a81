//! Address format checks
//!
//! Pure structural validation, no I/O. Runs before any network dispatch.

use lazy_static::lazy_static;

use crate::models::types::{NetworkFamily, NetworkId};

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const SOLANA_ADDRESS_MIN_LEN: usize = 32;
const SOLANA_ADDRESS_MAX_LEN: usize = 44;

lazy_static! {
    static ref BASE58_LOOKUP: [bool; 128] = {
        let mut table = [false; 128];
        for &c in BASE58_ALPHABET {
            table[c as usize] = true;
        }
        table
    };
}

pub struct AddressFormatValidator;

impl AddressFormatValidator {
    /// Check an address against its network family's format
    pub fn is_valid(address: &str, network: NetworkId) -> bool {
        match network.family() {
            NetworkFamily::Evm => Self::is_evm_address(address),
            NetworkFamily::Solana => Self::is_solana_address(address),
        }
    }

    /// `0x` followed by exactly 40 hex digits, any case
    pub fn is_evm_address(address: &str) -> bool {
        match address.strip_prefix("0x") {
            Some(hex_part) => hex_part.len() == 40 && hex_part.bytes().all(|b| b.is_ascii_hexdigit()),
            None => false,
        }
    }

    /// 32 to 44 characters from the base58 alphabet (no `0`, `O`, `I`, `l`)
    pub fn is_solana_address(address: &str) -> bool {
        (SOLANA_ADDRESS_MIN_LEN..=SOLANA_ADDRESS_MAX_LEN).contains(&address.len())
            && address
                .bytes()
                .all(|b| b.is_ascii() && BASE58_LOOKUP[b as usize])
    }
}
