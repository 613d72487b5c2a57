//! Registry-fallback market data for `yieldOpportunities` and `lendMarkets`
//! (components C/H): the rows returned when `liveMode=off`, or when the
//! Live-Data Layer falls all the way back to `source=registry`.

pub struct YieldOpportunity {
    pub provider: &'static str,
    pub chain: &'static str,
    pub asset: &'static str,
    pub apy: f64,
    pub tvl_usd: u64,
}

pub const YIELD_OPPORTUNITIES: &[YieldOpportunity] = &[
    YieldOpportunity { provider: "morpho", chain: "eip155:8453", asset: "USDC", apy: 4.20, tvl_usd: 120_000_000 },
    YieldOpportunity { provider: "morpho", chain: "eip155:1", asset: "USDC", apy: 3.95, tvl_usd: 300_000_000 },
    YieldOpportunity {
        provider: "kamino",
        chain: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
        asset: "USDC",
        apy: 6.10,
        tvl_usd: 80_000_000,
    },
    YieldOpportunity { provider: "defillama", chain: "eip155:1", asset: "USDC", apy: 3.10, tvl_usd: 900_000_000 },
];

pub struct LendMarket {
    pub provider: &'static str,
    pub chain: &'static str,
    pub asset: &'static str,
    pub supply_apy: f64,
    pub tvl_usd: u64,
}

pub const LEND_MARKETS: &[LendMarket] = &[
    LendMarket { provider: "aave", chain: "eip155:1", asset: "USDC", supply_apy: 3.0, tvl_usd: 1_000_000_000 },
    LendMarket { provider: "aave", chain: "eip155:8453", asset: "USDC", supply_apy: 2.5, tvl_usd: 200_000_000 },
    LendMarket { provider: "morpho", chain: "eip155:8453", asset: "USDC", supply_apy: 4.0, tvl_usd: 150_000_000 },
];

pub fn yield_opportunities(chain: Option<&str>, asset: Option<&str>, provider: Option<&str>) -> Vec<&'static YieldOpportunity> {
    YIELD_OPPORTUNITIES
        .iter()
        .filter(|row| chain.map_or(true, |c| row.chain == c))
        .filter(|row| asset.map_or(true, |a| row.asset.eq_ignore_ascii_case(a)))
        .filter(|row| provider.map_or(true, |p| row.provider.eq_ignore_ascii_case(p)))
        .collect()
}

pub fn lend_markets(chain: Option<&str>, asset: Option<&str>, provider: Option<&str>) -> Vec<&'static LendMarket> {
    LEND_MARKETS
        .iter()
        .filter(|row| chain.map_or(true, |c| row.chain == c))
        .filter(|row| asset.map_or(true, |a| row.asset.eq_ignore_ascii_case(a)))
        .filter(|row| provider.map_or(true, |p| row.provider.eq_ignore_ascii_case(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_compose() {
        let rows = yield_opportunities(Some("eip155:8453"), Some("USDC"), Some("morpho"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].apy, 4.20);
    }

    #[test]
    fn lend_markets_filters_by_provider() {
        let rows = lend_markets(None, None, Some("aave"));
        assert_eq!(rows.len(), 2);
    }
}
