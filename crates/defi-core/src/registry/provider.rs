//! Provider Registry (component D). Each row synthesizes the quote
//! parameters a provider would report for the fixtures' canonical route
//! (USDC bridge 1→8453, USDC→DAI swap on chain 1) as fixed constants rather
//! than computing them from a shared formula — `fee_bps` is the
//! independently reported comparison figure (drives `lowestFee`/`select`);
//! `quote_rate_ppm` is the provider's own output-per-unit conversion factor,
//! kept separate because it doesn't reduce cleanly from `fee_bps` alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Bridge,
    Swap,
    Lend,
    Yield,
}

pub struct ProviderRecord {
    pub name: &'static str,
    pub categories: &'static [Category],
    pub capabilities: &'static [&'static str],
    /// `(capability, required env var)` pairs.
    pub capability_auth: &'static [(&'static str, &'static str)],
    /// `None` for lend/yield providers, which have no bridge/swap quote shape.
    pub quote_rate_ppm: Option<u64>,
    pub fee_bps: u32,
    pub eta_seconds: u32,
    pub price_impact_bps: u32,
    pub supports_exact_output: bool,
    pub accepts_slippage: bool,
}

pub const PROVIDERS: &[ProviderRecord] = &[
    ProviderRecord {
        name: "lifi",
        categories: &[Category::Bridge],
        capabilities: &["bridge.quote"],
        capability_auth: &[],
        quote_rate_ppm: Some(999_300),
        fee_bps: 7,
        eta_seconds: 420,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "across",
        categories: &[Category::Bridge],
        capabilities: &["bridge.quote"],
        capability_auth: &[],
        quote_rate_ppm: Some(999_600),
        fee_bps: 4,
        eta_seconds: 900,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "bungee",
        categories: &[Category::Bridge],
        capabilities: &["bridge.quote"],
        capability_auth: &[],
        quote_rate_ppm: Some(994_500),
        fee_bps: 55,
        eta_seconds: 150,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "1inch",
        categories: &[Category::Swap],
        capabilities: &["swap.quote"],
        capability_auth: &[("swap.quote", "ONEINCH_API_KEY")],
        quote_rate_ppm: Some(998_901),
        fee_bps: 11,
        eta_seconds: 12,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: true,
    },
    ProviderRecord {
        name: "uniswap",
        categories: &[Category::Swap],
        capabilities: &["swap.quote"],
        capability_auth: &[],
        quote_rate_ppm: Some(998_501),
        fee_bps: 15,
        eta_seconds: 12,
        price_impact_bps: 0,
        supports_exact_output: true,
        accepts_slippage: true,
    },
    ProviderRecord {
        name: "jupiter",
        categories: &[Category::Swap],
        capabilities: &["swap.quote"],
        capability_auth: &[],
        quote_rate_ppm: Some(999_500),
        fee_bps: 5,
        eta_seconds: 8,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: true,
    },
    ProviderRecord {
        name: "aave",
        categories: &[Category::Lend],
        capabilities: &["lend.markets", "lend.rates"],
        capability_auth: &[],
        quote_rate_ppm: None,
        fee_bps: 0,
        eta_seconds: 0,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "morpho",
        categories: &[Category::Lend, Category::Yield],
        capabilities: &["lend.markets", "lend.rates", "yield.opportunities"],
        capability_auth: &[],
        quote_rate_ppm: None,
        fee_bps: 0,
        eta_seconds: 0,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "kamino",
        categories: &[Category::Lend, Category::Yield],
        capabilities: &["lend.markets", "lend.rates", "yield.opportunities"],
        capability_auth: &[],
        quote_rate_ppm: None,
        fee_bps: 0,
        eta_seconds: 0,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
    ProviderRecord {
        name: "defillama",
        categories: &[Category::Yield],
        capabilities: &["yield.opportunities"],
        capability_auth: &[],
        quote_rate_ppm: None,
        fee_bps: 0,
        eta_seconds: 0,
        price_impact_bps: 0,
        supports_exact_output: false,
        accepts_slippage: false,
    },
];

/// The route-default provider when no `provider`/`providers`/`strategy` was
/// supplied, or when a `providers` CSV matches nothing in the registry.
pub const DEFAULT_BRIDGE_PROVIDER: &str = "across";
pub const DEFAULT_SWAP_PROVIDER: &str = "1inch";
/// The sole provider offering `swap.quote` exact-output support.
pub const DEFAULT_EXACT_OUTPUT_PROVIDER: &str = "uniswap";

pub fn lookup(name: &str) -> Option<&'static ProviderRecord> {
    PROVIDERS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static ProviderRecord> {
    PROVIDERS.iter().filter(move |p| p.categories.contains(&category))
}

impl ProviderRecord {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn required_auth_env(&self, capability: &str) -> Option<&'static str> {
        self.capability_auth
            .iter()
            .find(|(cap, _)| *cap == capability)
            .map(|(_, env)| *env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        assert_eq!(lookup("JuPiTeR").unwrap().name, "jupiter");
        assert!(lookup("nonexistent").is_none());
    }

    #[test]
    fn oneinch_requires_api_key_for_swap_quote() {
        let row = lookup("1inch").unwrap();
        assert_eq!(row.required_auth_env("swap.quote"), Some("ONEINCH_API_KEY"));
        assert_eq!(lookup("uniswap").unwrap().required_auth_env("swap.quote"), None);
    }

    #[test]
    fn only_uniswap_supports_exact_output() {
        let swap_providers: Vec<_> = by_category(Category::Swap).collect();
        let exact_output: Vec<_> = swap_providers.iter().filter(|p| p.supports_exact_output).collect();
        assert_eq!(exact_output.len(), 1);
        assert_eq!(exact_output[0].name, "uniswap");
    }
}
