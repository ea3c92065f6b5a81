//! Constants Module - Single Source of Truth
//!
//! Selectors, program ids, endpoint URLs and tuning defaults live here and
//! nowhere else.

use crate::models::types::NetworkId;

// ============================================
// APPLICATION CONSTANTS
// ============================================

pub const APP_NAME: &str = "TokenValidator";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = concat!("TokenValidator/", env!("CARGO_PKG_VERSION"));

// ============================================
// TIMEOUTS & RETRIES
// ============================================

/// Per-provider RPC attempt timeout
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;

/// Full roster sweeps before giving up
pub const DEFAULT_MAX_ROSTER_RETRIES: u32 = 3;

/// Base delay between sweeps (delay = base * (attempt + 1))
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Per-source enrichment timeout
pub const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 5_000;

/// Token list download timeout
pub const DEFAULT_TOKEN_LIST_TIMEOUT_MS: u64 = 10_000;

/// How long a fetched token-list document is reused
pub const DEFAULT_TOKEN_LIST_TTL_SECS: u64 = 300;

/// Transport-level ceiling; callers apply tighter timeouts on top
pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;

// ============================================
// BATCH PACING
// ============================================

pub const EVM_BATCH_SIZE: usize = 5;
pub const EVM_BATCH_DELAY_MS: u64 = 500;

/// Public Solana RPCs rate-limit harder than EVM ones
pub const SOLANA_BATCH_SIZE: usize = 3;
pub const SOLANA_BATCH_DELAY_MS: u64 = 1_000;

/// Maximum requests accepted by one batch call at the HTTP surface
pub const MAX_BATCH_REQUESTS: usize = 100;

// ============================================
// TOKEN RULES
// ============================================

pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Bounds for the length word of a dynamic ABI string
pub const ABI_STRING_MIN_LEN: usize = 1;
pub const ABI_STRING_MAX_LEN: usize = 100;

pub const PLACEHOLDER_TOKEN_NAME: &str = "Unknown Token";
pub const PLACEHOLDER_TOKEN_SYMBOL: &str = "UNKNOWN";

// ============================================
// ERC-20 SELECTORS
// ============================================

/// `name()`
pub const SELECTOR_NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
/// `symbol()`
pub const SELECTOR_SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
/// `decimals()`
pub const SELECTOR_DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
/// `totalSupply()`
pub const SELECTOR_TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];

// ============================================
// SOLANA
// ============================================

/// SPL Token program
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Wrapped SOL mint
pub const NATIVE_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

pub const SOLANA_MAINNET_FALLBACK_RPCS: [&str; 5] = [
    "https://solana-rpc.publicnode.com",
    "https://rpc.ankr.com/solana",
    "https://solana.drpc.org",
    "https://solana-mainnet.g.alchemy.com/v2/demo",
    "https://api.mainnet-beta.solana.com",
];

pub const SOLANA_DEVNET_FALLBACK_RPCS: [&str; 5] = [
    "https://solana-devnet-rpc.publicnode.com",
    "https://rpc.ankr.com/solana_devnet",
    "https://solana-devnet.drpc.org",
    "https://solana-devnet.g.alchemy.com/v2/demo",
    "https://api.devnet.solana.com",
];

// ============================================
// CHAIN IDS
// ============================================

pub const CHAIN_ID_ETHEREUM: u64 = 1;
pub const CHAIN_ID_BASE: u64 = 8453;
pub const CHAIN_ID_BASE_SEPOLIA: u64 = 84532;

// ============================================
// PUBLIC RPC ENDPOINTS
// ============================================

/// Default primary RPC for a network
pub fn get_public_rpc(network: NetworkId) -> &'static str {
    match network {
        NetworkId::Base => "https://mainnet.base.org",
        NetworkId::Ethereum => "https://eth.llamarpc.com",
        NetworkId::BaseTestnet => "https://sepolia.base.org",
        NetworkId::Solana => "https://api.mainnet-beta.solana.com",
        NetworkId::SolanaDevnet => "https://api.devnet.solana.com",
    }
}

/// Alchemy subdomain for EVM networks
pub fn get_alchemy_subdomain(network: NetworkId) -> Option<&'static str> {
    match network {
        NetworkId::Base => Some("base-mainnet"),
        NetworkId::Ethereum => Some("eth-mainnet"),
        NetworkId::BaseTestnet => Some("base-sepolia"),
        _ => None,
    }
}

pub fn build_alchemy_url(network: NetworkId, api_key: &str) -> Option<String> {
    get_alchemy_subdomain(network)
        .map(|subdomain| format!("https://{}.g.alchemy.com/v2/{}", subdomain, api_key))
}

/// Hide API keys embedded in endpoint URLs before logging
pub fn mask_url(url: &str) -> String {
    if let Some((head, _)) = url.split_once("/v2/") {
        return format!("{}/v2/***HIDDEN***", head);
    }
    if let Some((head, _)) = url.split_once("api-key=") {
        return format!("{}api-key=***", head);
    }
    if let Some((head, _)) = url.split_once("api_key=") {
        return format!("{}api_key=***", head);
    }
    url.to_string()
}

// ============================================
// ENRICHMENT ENDPOINTS
// ============================================

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Registry document consulted by the first enrichment hop
pub fn get_token_registry_url(network: NetworkId) -> Option<&'static str> {
    match network {
        NetworkId::Solana => Some("https://token.jup.ag/strict"),
        NetworkId::Base => Some("https://tokens.coingecko.com/base/all.json"),
        NetworkId::Ethereum => Some("https://tokens.coingecko.com/ethereum/all.json"),
        NetworkId::BaseTestnet | NetworkId::SolanaDevnet => None,
    }
}

// ============================================
// TOKEN LISTS
// ============================================

/// A published token list
#[derive(Debug, Clone, Copy)]
pub struct TokenListSource {
    pub name: &'static str,
    pub url: &'static str,
}

const SOLANA_LABS_LIST: TokenListSource = TokenListSource {
    name: "Solana Labs Token List",
    url: "https://raw.githubusercontent.com/solana-labs/token-list/main/src/tokens/solana.tokenlist.json",
};

const SUPERCHAIN_LIST: TokenListSource = TokenListSource {
    name: "Superchain Token List",
    url: "https://static.optimism.io/optimism.tokenlist.json",
};

/// Token lists checked for the `verified` flag, in priority order
pub fn get_token_lists(network: NetworkId) -> Vec<TokenListSource> {
    match network {
        NetworkId::Solana => vec![
            TokenListSource {
                name: "Jupiter Strict List",
                url: "https://token.jup.ag/strict",
            },
            SOLANA_LABS_LIST,
        ],
        NetworkId::SolanaDevnet => vec![SOLANA_LABS_LIST],
        NetworkId::Ethereum => vec![
            TokenListSource {
                name: "Uniswap Default List",
                url: "https://tokens.uniswap.org",
            },
            TokenListSource {
                name: "CoinGecko Ethereum List",
                url: "https://tokens.coingecko.com/ethereum/all.json",
            },
        ],
        NetworkId::Base => vec![
            SUPERCHAIN_LIST,
            TokenListSource {
                name: "CoinGecko Base List",
                url: "https://tokens.coingecko.com/base/all.json",
            },
        ],
        NetworkId::BaseTestnet => vec![SUPERCHAIN_LIST],
    }
}
