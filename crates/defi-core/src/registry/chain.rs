//! Chain/Asset Registry, chain half (component C). Static `const` tables,
//! hand-written rather than build-time generated — the teacher reaches for
//! `build.rs`/codegen (`crates/contracts/build.rs`) for much larger, ABI-
//! derived tables; these five rows don't warrant that machinery.

pub struct ChainRecord {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub tvl_usd: u64,
}

pub const CHAINS: &[ChainRecord] = &[
    ChainRecord {
        canonical: "eip155:1",
        aliases: &["ethereum", "eth", "1"],
        tvl_usd: 900_000_000_000,
    },
    ChainRecord {
        canonical: "eip155:8453",
        aliases: &["base", "8453"],
        tvl_usd: 5_000_000_000,
    },
    ChainRecord {
        canonical: "eip155:42161",
        aliases: &["arbitrum", "arb", "42161"],
        tvl_usd: 3_000_000_000,
    },
    ChainRecord {
        canonical: "eip155:10143",
        aliases: &["monad", "10143"],
        tvl_usd: 500_000_000,
    },
    ChainRecord {
        canonical: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
        aliases: &["solana", "sol"],
        tvl_usd: 8_000_000_000,
    },
];

/// Resolves a raw chain token (alias, decimal id, or already-canonical
/// CAIP-2 string) to its registry row. Case-insensitive on aliases.
pub fn lookup(input: &str) -> Option<&'static ChainRecord> {
    let needle = input.trim();
    CHAINS.iter().find(|row| {
        row.canonical.eq_ignore_ascii_case(needle)
            || row.aliases.iter().any(|a| a.eq_ignore_ascii_case(needle))
    })
}

/// Top chains by `tvl_usd` descending, truncated to `limit`.
pub fn top_chains(limit: usize) -> Vec<&'static ChainRecord> {
    let mut rows: Vec<&ChainRecord> = CHAINS.iter().collect();
    rows.sort_by(|a, b| b.tvl_usd.cmp(&a.tvl_usd));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_aliases_case_insensitively() {
        assert_eq!(lookup("MoNaD").unwrap().canonical, "eip155:10143");
        assert_eq!(lookup("8453").unwrap().canonical, "eip155:8453");
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn top_chains_ranks_ethereum_first() {
        let top = top_chains(3);
        assert_eq!(top[0].canonical, "eip155:1");
        assert_eq!(top.len(), 3);
    }
}
