//! Process metadata actions: `schema`, `version`, `runtimeInfo`.

use serde_json::json;

use crate::dispatch::{Context, HandlerOutcome};
use crate::error::AppResult;
use crate::select::FieldAlias;

const ACTION_NAMES: &[&str] = &[
    "schema",
    "version",
    "runtimeInfo",
    "providersList",
    "chainsTop",
    "chainsAssets",
    "normalizeChain",
    "normalizeAmount",
    "assetsResolve",
    "yieldOpportunities",
    "lendMarkets",
    "lendRates",
    "bridgeQuote",
    "swapQuote",
    "lifiGetQuote",
    "lifiGetRoutes",
    "lifiRunWorkflow",
    "cachePolicy",
    "cacheGet",
    "cachePut",
    "rpcCallCached",
    "policyCheck",
    "buildTransferNative",
    "buildTransferErc20",
    "sendSignedTransaction",
];

const EMPTY_TABLE: &[FieldAlias] = &[];

pub fn schema() -> AppResult<HandlerOutcome> {
    Ok(HandlerOutcome::flat(json!({ "actions": ACTION_NAMES }), EMPTY_TABLE))
}

pub fn version() -> AppResult<HandlerOutcome> {
    Ok(HandlerOutcome::flat(json!({ "version": env!("CARGO_PKG_VERSION") }), EMPTY_TABLE))
}

pub fn runtime_info(ctx: &Context) -> AppResult<HandlerOutcome> {
    let payload = json!({
        "strict": ctx.policy.strict,
        "allowBroadcast": ctx.policy.allow_broadcast,
        "transport": ctx.transport.name(),
        "cacheDir": ctx.policy.cache_dir.to_string_lossy(),
    });
    Ok(HandlerOutcome::flat(payload, EMPTY_TABLE))
}
