//! Cached RPC access and unsigned-transfer building: `rpcCallCached`,
//! `policyCheck`, `buildTransferNative`, `buildTransferErc20`,
//! `sendSignedTransaction`.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::cache::Lookup;
use crate::dispatch::{Context, HandlerOutcome};
use crate::error::{AppError, AppResult};
use crate::params::{Field, ParamBag};
use crate::select::FieldAlias;

const RPC_URL_FIELD: Field = Field::new("rpcUrl", &["rpcUrl", "rpc_url"]);
const METHOD_FIELD: Field = Field::new("method", &["method"]);
const ALLOW_STALE_FALLBACK_FIELD: Field = Field::new("allowStaleFallback", &["allowStaleFallback", "allow_stale_fallback"]);
const ACTION_NAME_FIELD: Field = Field::new("action", &["action"]);
const CHAIN_FIELD: Field = Field::new("chain", &["chain"]);
const TO_FIELD: Field = Field::new("to", &["to"]);
const AMOUNT_FIELD: Field = Field::new("amount", &["amount"]);
const ASSET_FIELD: Field = Field::new("asset", &["asset", "symbol", "tokenAddress"]);
const SIGNED_TX_FIELD: Field = Field::new("signedTxHex", &["signedTxHex", "signed_tx_hex"]);

/// `eth_getBalance` → 15s, `eth_blockNumber` → 5s, `eth_call`/
/// `eth_estimateGas` → 10s, unknown method → a 30s fallback ttl.
fn method_ttl(method: &str) -> u64 {
    match method {
        "eth_getBalance" => 15,
        "eth_blockNumber" => 5,
        "eth_call" | "eth_estimateGas" => 10,
        other => {
            tracing::debug!(method = other, "unrecognized rpc method, using 30s fallback ttl");
            30
        }
    }
}

const RPC_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("source", &["source"]),
    FieldAlias::new("value", &["value"]),
    FieldAlias::new("fetchedAtUnix", &["fetchedAtUnix", "fetched_at_unix"]),
    FieldAlias::new("ttlSeconds", &["ttlSeconds", "ttl_seconds"]),
];

pub fn rpc_call_cached(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let rpc_url = bag.required_str(&RPC_URL_FIELD)?;
    let method = bag.required_str(&METHOD_FIELD)?;
    let rpc_params = bag.raw_value("params").cloned().unwrap_or(Value::Null);
    let allow_stale_fallback = bag.optional_bool(&ALLOW_STALE_FALLBACK_FIELD)?.unwrap_or(false);

    let cache_key = format!("rpcCallCached:{rpc_url}:{method}:{rpc_params}");
    let ttl = method_ttl(&method);
    let now = crate::cache::now_unix();
    let max_stale = ctx.policy.max_stale_seconds();
    let lookup = ctx.cache.get(&cache_key, now, max_stale);

    if let Lookup::Fresh(entry) = lookup.clone() {
        let payload = json!({
            "source": "cache",
            "value": entry.value,
            "fetchedAtUnix": entry.fetched_at_unix,
            "ttlSeconds": entry.ttl_seconds,
        });
        return Ok(HandlerOutcome::flat(payload, RPC_SELECT_TABLE));
    }

    match ctx.transport.get_json(&rpc_url) {
        Ok(value) => {
            let _ = ctx.cache.put(&cache_key, value.clone(), ttl, now);
            let payload = json!({
                "source": "live",
                "value": value,
                "fetchedAtUnix": now,
                "ttlSeconds": ttl,
            });
            Ok(HandlerOutcome::flat(payload, RPC_SELECT_TABLE))
        }
        Err(err) => {
            if allow_stale_fallback {
                if let Lookup::Stale(entry) = lookup {
                    let payload = json!({
                        "source": "stale",
                        "value": entry.value,
                        "fetchedAtUnix": entry.fetched_at_unix,
                        "ttlSeconds": entry.ttl_seconds,
                    });
                    return Ok(HandlerOutcome::flat(payload, RPC_SELECT_TABLE));
                }
            }
            Err(AppError::unavailable(format!(
                "provider=rpc transport={}: {}",
                ctx.transport.name(),
                err
            )))
        }
    }
}

pub fn policy_check(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let action_name = bag.required_str(&ACTION_NAME_FIELD)?;
    let allowed = ctx.policy.action_allowed(&action_name);
    let payload = json!({
        "action": action_name,
        "allowed": allowed,
        "strict": ctx.policy.strict,
        "allowBroadcast": ctx.policy.allow_broadcast,
    });
    Ok(HandlerOutcome::flat(payload, &[]))
}

fn resolve_chain(chain_raw: &str) -> AppResult<&'static crate::registry::chain::ChainRecord> {
    crate::registry::chain::lookup(chain_raw).ok_or_else(|| AppError::unsupported(format!("unknown chain '{chain_raw}'")))
}

pub fn build_transfer_native(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = resolve_chain(&chain_raw)?;
    let to = bag.required_str(&TO_FIELD)?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let payload = json!({
        "chain": chain.canonical,
        "to": to,
        "value": amount,
        "data": "0x",
    });
    Ok(HandlerOutcome::flat(payload, &[]))
}

/// Big-endian, zero-padded-to-32-bytes hex encoding of a base-10 integer
/// string, without the ABI-encoding crate the teacher's `contracts` crate
/// pulls in for full contract bindings — a single static selector doesn't
/// warrant it.
fn pad_to_32_bytes_hex(decimal: &str) -> AppResult<String> {
    let value: u128 = decimal
        .parse()
        .map_err(|_| AppError::validation("amount exceeds supported precision"))?;
    Ok(format!("{value:064x}"))
}

fn pad_address(address: &str) -> String {
    let stripped = address.strip_prefix("0x").unwrap_or(address);
    format!("{stripped:0>64}")
}

pub fn build_transfer_erc20(bag: &ParamBag) -> AppResult<HandlerOutcome> {
    let chain_raw = bag.required_str(&CHAIN_FIELD)?;
    let chain = resolve_chain(&chain_raw)?;
    let asset = bag.required_str(&ASSET_FIELD)?;
    let to = bag.required_str(&TO_FIELD)?;
    let amount = bag.required_positive_integer_string(&AMOUNT_FIELD)?;

    let (row, _) = crate::registry::asset::resolve(chain.canonical, &asset)
        .ok_or_else(|| AppError::unsupported(format!("unknown asset '{asset}' on chain '{chain_raw}'")))?;

    // ERC-20 `transfer(address,uint256)` selector, per Solidity's
    // keccak256-based 4-byte function dispatch.
    let selector = "a9059cbb";
    let data = format!("0x{selector}{}{}", pad_address(&to), pad_to_32_bytes_hex(&amount)?);

    let payload = json!({
        "chain": chain.canonical,
        "to": row.caip19,
        "value": "0",
        "data": data,
    });
    Ok(HandlerOutcome::flat(payload, &[]))
}

pub fn send_signed_transaction(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    if ctx.policy.strict || !ctx.policy.allow_broadcast {
        return Err(AppError::unsupported(
            "sendSignedTransaction requires broadcast permission and non-strict mode",
        ));
    }
    let signed_tx_hex = bag.required_str(&SIGNED_TX_FIELD)?;
    let stripped = signed_tx_hex.strip_prefix("0x").unwrap_or(&signed_tx_hex);
    if stripped.is_empty() || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::validation("signedTxHex must be a non-empty hex string"));
    }

    let mut hasher = Sha256::new();
    hasher.update(stripped.as_bytes());
    let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

    let payload = json!({ "accepted": true, "txHash": tx_hash });
    Ok(HandlerOutcome::wrapped("transaction", payload, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_rpc_method_defaults_to_thirty_second_ttl() {
        assert_eq!(method_ttl("eth_getLogs"), 30);
        assert_eq!(method_ttl("eth_getBalance"), 15);
        assert_eq!(method_ttl("eth_blockNumber"), 5);
    }

    #[test]
    fn erc20_transfer_calldata_has_expected_selector_and_length() {
        let bag = ParamBag::new(json!({
            "chain": "base",
            "asset": "USDC",
            "to": "0x000000000000000000000000000000000000aa",
            "amount": "1000000",
        }));
        let outcome = build_transfer_erc20(&bag).unwrap();
        let data = outcome.payload["data"].as_str().unwrap();
        assert!(data.starts_with("0xa9059cbb"));
        assert_eq!(data.len(), 2 + 8 + 64 + 64);
    }

    #[test]
    fn send_signed_transaction_rejects_non_hex() {
        let bag = ParamBag::new(json!({"signedTxHex": "not-hex"}));
        let dir = tempfile::tempdir().unwrap();
        let cache = crate::cache::CacheStore::new(dir.path());
        let mut policy = crate::policy::Policy::from_env();
        policy.allow_broadcast = true;
        policy.strict = false;
        let transport = crate::fetch::build(crate::policy::Transport::Native);
        let ctx = Context { policy: &policy, transport: transport.as_ref(), cache: &cache };
        let err = send_signed_transaction(&bag, &ctx).unwrap_err();
        assert_eq!(err.code().as_i64(), 2);
    }
}
