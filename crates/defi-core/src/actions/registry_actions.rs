//! Chain/Asset/Provider registry reads: `providersList`, `chainsTop`,
//! `chainsAssets`, `normalizeChain`, `normalizeAmount`, `assetsResolve`.

use serde_json::json;

use crate::dispatch::HandlerOutcome;
use crate::error::{AppError, AppResult};
use crate::params::{Field, ParamBag};
use crate::registry::provider::Category;
use crate::select::FieldAlias;

const NAME_FIELD: Field = Field::new("name", &["name"]);
const CATEGORY_FIELD: Field = Field::new("category", &["category"]);
const LIMIT_FIELD: Field = Field::new("limit", &["limit"]);
const CHAIN_FIELD: Field = Field::new("chain", &["chain"]);
const ASSET_FIELD: Field = Field::new("asset", &["asset", "symbol"]);
const DECIMAL_AMOUNT_FIELD: Field = Field::new("decimalAmount", &["decimalAmount", "decimal_amount"]);
const DECIMALS_FIELD: Field = Field::new("decimals", &["decimals"]);

const NORMALIZE_CHAIN_SELECT_TABLE: &[FieldAlias] = &[FieldAlias::new("caip2", &["caip2"])];
const NORMALIZE_AMOUNT_SELECT_TABLE: &[FieldAlias] =
    &[FieldAlias::new("baseAmount", &["baseAmount", "base_amount"])];

const PROVIDER_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("name", &["name"]),
    FieldAlias::new("categories", &["categories"]),
    FieldAlias::new("capabilities", &["capabilities"]),
    FieldAlias::new("feeBps", &["feeBps", "fee_bps"]),
    FieldAlias::new("etaSeconds", &["etaSeconds", "eta_seconds"]),
    FieldAlias::new("exactOutput", &["exactOutput", "exact_output"]),
];

fn category_name(c: Category) -> &'static str {
    match c {
        Category::Bridge => "bridge",
        Category::Swap => "swap",
        Category::Lend => "lend",
        Category::Yield => "yield",
    }
}

pub fn providers_list(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let name = bag.optional_str(&NAME_FIELD)?;
    let category = bag.optional_enum(&CATEGORY_FIELD, &["bridge", "swap", "lend", "yield"])?;

    let rows: Vec<_> = crate::registry::provider::PROVIDERS
        .iter()
        .filter(|p| name.as_deref().map_or(true, |n| p.name.eq_ignore_ascii_case(n)))
        .filter(|p| {
            category.as_deref().map_or(true, |c| {
                p.categories.iter().any(|cat| category_name(*cat).eq_ignore_ascii_case(c))
            })
        })
        .map(|p| {
            json!({
                "name": p.name,
                "categories": p.categories.iter().map(|c| category_name(*c)).collect::<Vec<_>>(),
                "capabilities": p.capabilities,
                "feeBps": p.fee_bps,
                "etaSeconds": p.eta_seconds,
                "exactOutput": p.supports_exact_output,
            })
        })
        .collect();

    Ok(HandlerOutcome::wrapped("providers", json!(rows), PROVIDER_SELECT_TABLE))
}

const CHAIN_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("rank", &["rank"]),
    FieldAlias::new("chain", &["chain"]),
    FieldAlias::new("tvl_usd", &["tvlUsd", "tvl_usd"]),
];

pub fn chains_top(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let limit = bag.optional_u64(&LIMIT_FIELD)?.unwrap_or(10) as usize;
    let rows: Vec<_> = crate::registry::chain::top_chains(limit)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            json!({
                "rank": i + 1,
                "chain": row.aliases[0],
                "tvl_usd": row.tvl_usd,
            })
        })
        .collect();
    Ok(HandlerOutcome::wrapped("chains", json!(rows), CHAIN_SELECT_TABLE))
}

const ASSET_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("symbol", &["symbol"]),
    FieldAlias::new("caip19", &["caip19"]),
    FieldAlias::new("decimals", &["decimals"]),
];

pub fn chains_assets(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = crate::registry::chain::lookup(&chain_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{chain_raw}'")))?;

    let asset_filter = bag.optional_str(&ASSET_FIELD)?;
    let assets: Vec<_> = crate::registry::asset::ASSETS
        .iter()
        .filter(|row| row.chain == chain.canonical)
        .filter(|row| asset_filter.as_deref().map_or(true, |s| row.symbol.eq_ignore_ascii_case(s)))
        .map(|row| json!({ "symbol": row.symbol, "caip19": row.caip19, "decimals": row.decimals }))
        .collect();

    let payload = json!({ "chain": chain.canonical, "assets": assets });
    Ok(HandlerOutcome::flat(payload, ASSET_SELECT_TABLE))
}

pub fn normalize_chain(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = crate::registry::chain::lookup(&chain_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{chain_raw}'")))?;
    Ok(HandlerOutcome::flat(json!({ "caip2": chain.canonical }), NORMALIZE_CHAIN_SELECT_TABLE))
}

/// Truncate-toward-zero decimal-string to base-unit-integer-string
/// conversion, done with string manipulation rather than floating point so
/// arbitrary `decimals` precision never loses accuracy (spec.md §9's
/// `0.5 @ 18 decimals = 5·10^17` boundary case).
pub fn decimal_to_base_units(decimal: &str, decimals: u32) -> Result<String, AppError> {
    let decimal = decimal.trim();
    let negative = decimal.starts_with('-');
    let body = decimal.strip_prefix('-').or_else(|| decimal.strip_prefix('+')).unwrap_or(decimal);
    if negative {
        return Err(AppError::validation("decimalAmount must not be negative"));
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AppError::validation("decimalAmount must be numeric"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation("decimalAmount must be numeric"));
    }

    let decimals = decimals as usize;
    let mut frac = frac_part.to_string();
    if frac.len() > decimals {
        frac.truncate(decimals);
    } else {
        frac.push_str(&"0".repeat(decimals - frac.len()));
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let combined = format!("{int_part}{frac}");
    let trimmed = combined.trim_start_matches('0');
    Ok(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

pub fn normalize_amount(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let decimal_amount = bag.required_str(&DECIMAL_AMOUNT_FIELD)?;
    let decimals = bag.required_u64(&DECIMALS_FIELD)? as u32;
    let base_amount = decimal_to_base_units(&decimal_amount, decimals)?;
    Ok(HandlerOutcome::flat(json!({ "baseAmount": base_amount }), NORMALIZE_AMOUNT_SELECT_TABLE))
}

const RESOLVE_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("symbol", &["symbol"]),
    FieldAlias::new("caip19", &["caip19"]),
    FieldAlias::new("decimals", &["decimals"]),
    FieldAlias::new("match", &["match"]),
];

pub fn assets_resolve(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = crate::registry::chain::lookup(&chain_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{chain_raw}'")))?;
    let symbol = bag.required_str(&ASSET_FIELD)?;

    let (row, kind) = crate::registry::asset::resolve(chain.canonical, &symbol)
        .ok_or_else(|| AppError::unsupported(format!("unknown asset '{symbol}' on chain '{chain_raw}'")))?;

    Ok(HandlerOutcome::flat(
        json!({
            "symbol": row.symbol,
            "caip19": row.caip19,
            "decimals": row.decimals,
            "match": kind.as_str(),
        }),
        RESOLVE_SELECT_TABLE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_at_eighteen_decimals_truncates_to_pinned_value() {
        assert_eq!(decimal_to_base_units("0.5", 18).unwrap(), "500000000000000000");
    }

    #[test]
    fn normalize_amount_matches_literal_scenario() {
        assert_eq!(decimal_to_base_units("1.25", 6).unwrap(), "1250000");
    }

    #[test]
    fn excess_fractional_digits_truncate_toward_zero() {
        assert_eq!(decimal_to_base_units("1.23456789", 4).unwrap(), "12345");
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(decimal_to_base_units("-1.0", 6).is_err());
    }
}
