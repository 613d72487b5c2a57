//! Quote Engine actions: `bridgeQuote`, `swapQuote`, and the lifi-specific
//! variants that front the same bridge-quote synthesis pinned or
//! enumerated over the `lifi` provider.

use serde_json::json;

use crate::dispatch::HandlerOutcome;
use crate::error::{AppError, AppResult};
use crate::params::{Field, ParamBag};
use crate::quote::swap::TradeType;
use crate::quote::{self, Quote, Selection};
use crate::registry::provider::Category;
use crate::select::FieldAlias;

const FROM_FIELD: Field = Field::new("from", &["from"]);
const TO_FIELD: Field = Field::new("to", &["to"]);
const ASSET_FIELD: Field = Field::new("asset", &["asset", "symbol"]);
const AMOUNT_FIELD: Field = Field::new("amount", &["amount", "amountIn", "amount_in"]);
const PROVIDER_FIELD: Field = Field::new("provider", &["provider"]);
const PROVIDERS_FIELD: Field = Field::new("providers", &["providers"]);
const STRATEGY_FIELD: Field = Field::new("strategy", &["strategy"]);
const CHAIN_FIELD: Field = Field::new("chain", &["chain"]);
const FROM_ASSET_FIELD: Field = Field::new("fromAsset", &["fromAsset", "from_asset"]);
const TO_ASSET_FIELD: Field = Field::new("toAsset", &["toAsset", "to_asset"]);
const TYPE_FIELD: Field = Field::new("tradeType", &["type", "tradeType", "trade_type"]);
const AMOUNT_OUT_FIELD: Field = Field::new("amountOut", &["amountOut", "amount_out"]);
const AMOUNT_OUT_DECIMAL_FIELD: Field = Field::new("amountOutDecimal", &["amountOutDecimal", "amount_out_decimal"]);
const SLIPPAGE_FIELD: Field = Field::new("slippagePct", &["slippagePct", "slippage_pct"]);

const QUOTE_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("provider", &["provider"]),
    FieldAlias::new("source", &["source"]),
    FieldAlias::new("tradeType", &["tradeType", "trade_type"]),
    FieldAlias::new("amountIn", &["amountIn", "amount_in"]),
    FieldAlias::new("estimatedAmountOut", &["estimatedAmountOut", "estimated_amount_out"]),
    FieldAlias::new("feeBps", &["feeBps", "fee_bps"]),
    FieldAlias::new("etaSeconds", &["etaSeconds", "eta_seconds"]),
    FieldAlias::new("priceImpactBps", &["priceImpactBps", "price_impact_bps"]),
];

fn quote_json(q: &Quote) -> serde_json::Value {
    json!({
        "provider": q.provider,
        "source": q.source,
        "tradeType": q.trade_type,
        "amountIn": q.amount_in,
        "estimatedAmountOut": q.estimated_amount_out,
        "feeBps": q.fee_bps,
        "etaSeconds": q.eta_seconds,
        "priceImpactBps": q.price_impact_bps,
    })
}

fn selection_from_bag(bag: &ParamBag) -> AppResult<Selection> {
    let provider = bag.optional_str(&PROVIDER_FIELD)?;
    let providers = bag.optional_str(&PROVIDERS_FIELD)?;
    let strategy = bag.optional_str(&STRATEGY_FIELD)?;
    Ok(Selection::from_params(provider, providers, strategy))
}

pub fn bridge_quote(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let from_raw = bag.required_str(&FROM_FIELD)?;
    let to_raw = bag.required_str(&TO_FIELD)?;
    let from_chain = crate::registry::chain::lookup(&from_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{from_raw}'")))?;
    let to_chain = crate::registry::chain::lookup(&to_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{to_raw}'")))?;
    let asset = bag.required_str(&ASSET_FIELD)?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let selection = selection_from_bag(bag)?;
    let q = quote::bridge::quote(&amount, selection)?;

    let mut payload = quote_json(&q);
    payload["fromChain"] = json!(from_chain.canonical);
    payload["toChain"] = json!(to_chain.canonical);
    payload["asset"] = json!(asset);

    Ok(HandlerOutcome::wrapped("quote", payload, QUOTE_SELECT_TABLE))
}

pub fn swap_quote(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = crate::registry::chain::lookup(&chain_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{chain_raw}'")))?;
    let from_asset = bag.required_str(&FROM_ASSET_FIELD)?;
    let to_asset = bag.required_str(&TO_ASSET_FIELD)?;

    let trade_type_raw = bag.optional_enum(&TYPE_FIELD, &["exact-input", "exact-output"])?;
    let trade_type = trade_type_raw
        .as_deref()
        .and_then(TradeType::parse)
        .unwrap_or(TradeType::ExactInput);

    bag.assert_exclusive(&AMOUNT_OUT_FIELD, &AMOUNT_OUT_DECIMAL_FIELD)?;
    let slippage_pct = bag.optional_f64(&SLIPPAGE_FIELD)?;
    let selection = selection_from_bag(bag)?;

    let q = match trade_type {
        TradeType::ExactInput => {
            if bag.has_any(&AMOUNT_OUT_FIELD) || bag.has_any(&AMOUNT_OUT_DECIMAL_FIELD) {
                return Err(AppError::validation(
                    "exact-input swaps may not supply amountOut/amountOutDecimal",
                ));
            }
            let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;
            quote::swap::quote_exact_input(&amount, selection, slippage_pct)?
        }
        TradeType::ExactOutput => {
            if bag.has_any(&AMOUNT_FIELD) {
                return Err(AppError::validation("exact-output swaps may not supply amount"));
            }
            let amount_out = if bag.has_any(&AMOUNT_OUT_FIELD) {
                bag.required_positive_integer_string(&AMOUNT_OUT_FIELD)?
            } else if bag.has_any(&AMOUNT_OUT_DECIMAL_FIELD) {
                let decimal = bag.required_str(&AMOUNT_OUT_DECIMAL_FIELD)?;
                let (to_row, _) = crate::registry::asset::resolve(chain.canonical, &to_asset)
                    .ok_or_else(|| AppError::unsupported(format!("unknown asset '{to_asset}' on chain '{chain_raw}'")))?;
                crate::actions::registry_actions::decimal_to_base_units(&decimal, to_row.decimals)?
            } else {
                return Err(AppError::validation(
                    "exact-output swaps require amountOut or amountOutDecimal",
                ));
            };
            quote::swap::quote_exact_output(&amount_out, selection, slippage_pct)?
        }
    };

    let mut payload = quote_json(&q);
    payload["chain"] = json!(chain.canonical);
    payload["fromAsset"] = json!(from_asset);
    payload["toAsset"] = json!(to_asset);

    Ok(HandlerOutcome::wrapped("quote", payload, QUOTE_SELECT_TABLE))
}

/// `lifiGetQuote` is `bridgeQuote` pinned to the `lifi` provider — lifi's
/// own endpoint never consults `provider`/`providers`/`strategy`.
pub fn lifi_get_quote(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let from_raw = bag.required_str(&FROM_FIELD)?;
    let to_raw = bag.required_str(&TO_FIELD)?;
    let from_chain = crate::registry::chain::lookup(&from_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{from_raw}'")))?;
    let to_chain = crate::registry::chain::lookup(&to_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{to_raw}'")))?;
    let asset = bag.required_str(&ASSET_FIELD)?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let q = quote::bridge::quote(&amount, Selection::Provider("lifi".to_string()))?;

    let mut payload = quote_json(&q);
    payload["fromChain"] = json!(from_chain.canonical);
    payload["toChain"] = json!(to_chain.canonical);
    payload["asset"] = json!(asset);

    Ok(HandlerOutcome::wrapped("quote", payload, QUOTE_SELECT_TABLE))
}

const ROUTE_SELECT_TABLE: &[FieldAlias] = QUOTE_SELECT_TABLE;

/// `lifiGetRoutes` fans the same bridge request out across every registered
/// bridge provider, mirroring lifi's own multi-route comparison endpoint.
pub fn lifi_get_routes(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let from_raw = bag.required_str(&FROM_FIELD)?;
    let to_raw = bag.required_str(&TO_FIELD)?;
    crate::registry::chain::lookup(&from_raw).ok_or_else(|| AppError::unsupported(format!("unknown chain '{from_raw}'")))?;
    crate::registry::chain::lookup(&to_raw).ok_or_else(|| AppError::unsupported(format!("unknown chain '{to_raw}'")))?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let routes: Vec<_> = crate::registry::provider::by_category(Category::Bridge)
        .filter_map(|p| quote::bridge::quote(&amount, Selection::Provider(p.name.to_string())).ok())
        .map(|q| quote_json(&q))
        .collect();

    Ok(HandlerOutcome::wrapped("routes", json!(routes), ROUTE_SELECT_TABLE))
}

/// `lifiRunWorkflow` chains quote synthesis with the same transfer-build
/// shape `buildTransferErc20` produces, so a caller can drive a full
/// quote-then-build sequence from one action.
pub fn lifi_run_workflow(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let from_raw = bag.required_str(&FROM_FIELD)?;
    let to_raw = bag.required_str(&TO_FIELD)?;
    let from_chain = crate::registry::chain::lookup(&from_raw)
        .ok_or_else(|| AppError::unsupported(format!("unknown chain '{from_raw}'")))?;
    crate::registry::chain::lookup(&to_raw).ok_or_else(|| AppError::unsupported(format!("unknown chain '{to_raw}'")))?;
    let asset = bag.required_str(&ASSET_FIELD)?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let q = quote::bridge::quote(&amount, Selection::Provider("lifi".to_string()))?;

    let asset_row = crate::registry::asset::lookup_exact(from_chain.canonical, &asset);
    let payload = json!({
        "steps": [
            { "step": "quote", "quote": quote_json(&q) },
            {
                "step": "build",
                "to": asset_row.map(|row| row.caip19.to_string()).unwrap_or_default(),
                "data": "0x",
            }
        ],
    });

    Ok(HandlerOutcome::wrapped("workflow", payload, &[]))
}
