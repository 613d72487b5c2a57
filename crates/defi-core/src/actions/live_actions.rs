//! Live-data market reads: `yieldOpportunities`, `lendMarkets`, `lendRates`.
//! All three route through the Live-Data Layer state machine; the
//! difference between them is only which registry table backs the
//! registry-fallback path and which provider each one treats as "primary"
//! when `liveProvider=auto`.

use serde_json::json;

use crate::dispatch::{Context, HandlerOutcome};
use crate::error::AppResult;
use crate::live::{self, LiveMode, ProviderSelection};
use crate::params::{Field, ParamBag};
use crate::select::FieldAlias;

const CHAIN_FIELD: Field = Field::new("chain", &["chain"]);
const ASSET_FIELD: Field = Field::new("asset", &["asset", "symbol"]);
const PROVIDER_FIELD: Field = Field::new("provider", &["provider"]);
const LIVE_MODE_FIELD: Field = Field::new("liveMode", &["liveMode", "live_mode"]);
const LIVE_PROVIDER_FIELD: Field = Field::new("liveProvider", &["liveProvider", "live_provider"]);

struct LiveQueryParams {
    chain_canonical: Option<String>,
    asset: Option<String>,
    provider: Option<String>,
    live_mode: LiveMode,
    live_provider_raw: Option<String>,
}

fn parse_common(bag: &ParamBag) -> AppResult<LiveQueryParams> {
    let chain_raw = bag.optional_str(&CHAIN_FIELD)?;
    let chain_canonical = match chain_raw {
        Some(raw) => Some(
            crate::registry::chain::lookup(&raw)
                .ok_or_else(|| crate::error::AppError::unsupported(format!("unknown chain '{raw}'")))?
                .canonical
                .to_string(),
        ),
        None => None,
    };
    let asset = bag.optional_str(&ASSET_FIELD)?;
    let provider = bag.optional_str(&PROVIDER_FIELD)?;
    let live_mode_raw = bag.optional_enum(&LIVE_MODE_FIELD, &["off", "auto", "live"])?;
    let live_mode = live_mode_raw.as_deref().and_then(LiveMode::parse).unwrap_or(LiveMode::Off);
    let live_provider_raw = bag.optional_str(&LIVE_PROVIDER_FIELD)?;

    Ok(LiveQueryParams { chain_canonical, asset, provider, live_mode, live_provider_raw })
}

const YIELD_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("provider", &["provider"]),
    FieldAlias::new("chain", &["chain"]),
    FieldAlias::new("asset", &["asset"]),
    FieldAlias::new("apy", &["apy"]),
    FieldAlias::new("tvl_usd", &["tvlUsd", "tvl_usd"]),
];

pub fn yield_opportunities(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let p = parse_common(bag)?;
    let cache_key = format!(
        "yieldOpportunities:{}:{}:{}",
        p.chain_canonical.as_deref().unwrap_or(""),
        p.asset.as_deref().unwrap_or(""),
        p.provider.as_deref().unwrap_or("")
    );
    let natural_primary = p.provider.clone().unwrap_or_else(|| "defillama".to_string());
    let selection = ProviderSelection::parse(p.live_provider_raw.as_deref());

    let chain_for_fallback = p.chain_canonical.clone();
    let asset_for_fallback = p.asset.clone();
    let provider_for_fallback = p.provider.clone();
    let registry_fallback = move || {
        let rows: Vec<_> = crate::registry::market::yield_opportunities(
            chain_for_fallback.as_deref(),
            asset_for_fallback.as_deref(),
            provider_for_fallback.as_deref(),
        )
        .into_iter()
        .map(|row| json!({ "provider": row.provider, "chain": row.chain, "asset": row.asset, "apy": row.apy, "tvl_usd": row.tvl_usd }))
        .collect();
        json!(rows)
    };

    let outcome = live::resolve(
        ctx.policy,
        ctx.transport,
        ctx.cache,
        &cache_key,
        p.live_mode,
        selection,
        &natural_primary,
        registry_fallback,
    )?;

    let payload = json!({
        "source": outcome.source,
        "sourceProvider": outcome.source_provider,
        "fetchedAtUnix": outcome.fetched_at_unix,
        "sourceUrl": outcome.source_url,
        "opportunities": outcome.payload,
    });
    Ok(HandlerOutcome::flat(payload, YIELD_SELECT_TABLE))
}

const MARKET_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("provider", &["provider"]),
    FieldAlias::new("chain", &["chain"]),
    FieldAlias::new("asset", &["asset"]),
    FieldAlias::new("supply_apy", &["supplyApy", "supply_apy"]),
    FieldAlias::new("tvl_usd", &["tvlUsd", "tvl_usd"]),
];

pub fn lend_markets(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let p = parse_common(bag)?;
    let cache_key = format!(
        "lendMarkets:{}:{}:{}",
        p.chain_canonical.as_deref().unwrap_or(""),
        p.asset.as_deref().unwrap_or(""),
        p.provider.as_deref().unwrap_or("")
    );
    let natural_primary = p.provider.clone().unwrap_or_else(|| "defillama".to_string());
    let selection = ProviderSelection::parse(p.live_provider_raw.as_deref());

    let chain_for_fallback = p.chain_canonical.clone();
    let asset_for_fallback = p.asset.clone();
    let provider_for_fallback = p.provider.clone();
    let registry_fallback = move || {
        let rows: Vec<_> = crate::registry::market::lend_markets(
            chain_for_fallback.as_deref(),
            asset_for_fallback.as_deref(),
            provider_for_fallback.as_deref(),
        )
        .into_iter()
        .map(|row| json!({ "provider": row.provider, "chain": row.chain, "asset": row.asset, "supply_apy": row.supply_apy, "tvl_usd": row.tvl_usd }))
        .collect();
        json!(rows)
    };

    let outcome = live::resolve(
        ctx.policy,
        ctx.transport,
        ctx.cache,
        &cache_key,
        p.live_mode,
        selection,
        &natural_primary,
        registry_fallback,
    )?;

    let payload = json!({
        "source": outcome.source,
        "sourceProvider": outcome.source_provider,
        "fetchedAtUnix": outcome.fetched_at_unix,
        "sourceUrl": outcome.source_url,
        "markets": outcome.payload,
    });
    Ok(HandlerOutcome::flat(payload, MARKET_SELECT_TABLE))
}

const RATES_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("provider", &["provider"]),
    FieldAlias::new("chain", &["chain"]),
    FieldAlias::new("asset", &["asset"]),
    FieldAlias::new("supplyApy", &["supplyApy", "supply_apy"]),
];

pub fn lend_rates(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let p = parse_common(bag)?;
    let cache_key = format!(
        "lendRates:{}:{}:{}",
        p.chain_canonical.as_deref().unwrap_or(""),
        p.asset.as_deref().unwrap_or(""),
        p.provider.as_deref().unwrap_or("")
    );
    let natural_primary = p.provider.clone().unwrap_or_else(|| "defillama".to_string());
    let selection = ProviderSelection::parse(p.live_provider_raw.as_deref());

    let chain_for_fallback = p.chain_canonical.clone();
    let asset_for_fallback = p.asset.clone();
    let provider_for_fallback = p.provider.clone();
    let registry_fallback = move || {
        let rows: Vec<_> = crate::registry::market::lend_markets(
            chain_for_fallback.as_deref(),
            asset_for_fallback.as_deref(),
            provider_for_fallback.as_deref(),
        )
        .into_iter()
        .map(|row| json!({ "provider": row.provider, "chain": row.chain, "asset": row.asset, "supplyApy": row.supply_apy }))
        .collect();
        json!(rows)
    };

    let outcome = live::resolve(
        ctx.policy,
        ctx.transport,
        ctx.cache,
        &cache_key,
        p.live_mode,
        selection,
        &natural_primary,
        registry_fallback,
    )?;

    let payload = json!({
        "source": outcome.source,
        "sourceProvider": outcome.source_provider,
        "fetchedAtUnix": outcome.fetched_at_unix,
        "sourceUrl": outcome.source_url,
        "rates": outcome.payload,
    });
    Ok(HandlerOutcome::flat(payload, RATES_SELECT_TABLE))
}
