//! Chain/Asset Registry, asset half (component C). One row per
//! `(chain, canonical symbol)`; a family groups stablecoin variants under
//! that canonical symbol so `assetsResolve` can report whether the caller's
//! input symbol was an exact or family match.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Family,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Family => "family",
        }
    }
}

pub struct AssetRecord {
    pub chain: &'static str,
    pub symbol: &'static str,
    pub family: &'static [&'static str],
    pub caip19: &'static str,
    pub decimals: u32,
}

pub const ASSETS: &[AssetRecord] = &[
    AssetRecord {
        chain: "eip155:1",
        symbol: "USDC",
        family: &["USDC", "USDC.e", "BBQUSDC"],
        caip19: "eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        decimals: 6,
    },
    AssetRecord {
        chain: "eip155:8453",
        symbol: "USDC",
        family: &["USDC", "USDC.e", "BBQUSDC"],
        caip19: "eip155:8453/erc20:0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
        decimals: 6,
    },
    AssetRecord {
        chain: "eip155:42161",
        symbol: "USDC",
        family: &["USDC", "USDC.e", "BBQUSDC"],
        caip19: "eip155:42161/erc20:0xaf88d065e77c8cc2239327c5edb3a432268e5831",
        decimals: 6,
    },
    AssetRecord {
        chain: "eip155:10143",
        symbol: "USDC",
        family: &["USDC", "USDC.e", "BBQUSDC"],
        caip19: "eip155:10143/erc20:0x0000000000000000000000000000000000a0b9",
        decimals: 6,
    },
    AssetRecord {
        chain: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
        symbol: "USDC",
        family: &["USDC", "USDC.e", "BBQUSDC"],
        caip19: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp/token:EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        decimals: 6,
    },
    AssetRecord {
        chain: "eip155:1",
        symbol: "DAI",
        family: &["DAI"],
        caip19: "eip155:1/erc20:0x6b175474e89094c44da98b954eedeac495271d0f",
        decimals: 18,
    },
];

/// Exact-only lookup: used by registry actions (`chainsAssets`).
pub fn lookup_exact(chain: &str, symbol: &str) -> Option<&'static AssetRecord> {
    ASSETS
        .iter()
        .find(|row| row.chain == chain && row.symbol.eq_ignore_ascii_case(symbol))
}

/// Exact-then-family lookup: used by live-data paths (`assetsResolve`).
pub fn resolve(chain: &str, symbol: &str) -> Option<(&'static AssetRecord, MatchKind)> {
    if let Some(row) = lookup_exact(chain, symbol) {
        return Some((row, MatchKind::Exact));
    }
    ASSETS
        .iter()
        .find(|row| row.chain == chain && row.family.iter().any(|f| f.eq_ignore_ascii_case(symbol)))
        .map(|row| (row, MatchKind::Family))
}
