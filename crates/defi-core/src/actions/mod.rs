//! Action handlers, grouped the way spec.md's action registry groups them:
//! process metadata, chain/asset/provider registry reads, live-data market
//! reads, quote synthesis, and cache/RPC/transfer-building.

mod cache_actions;
mod live_actions;
mod meta;
mod quote_actions;
mod registry_actions;
mod rpc_actions;

use crate::dispatch::{Action, Context, HandlerOutcome};
use crate::error::AppResult;
use crate::params::ParamBag;

pub fn handle(action: Action, bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    match action {
        Action::Schema => meta::schema(),
        Action::Version => meta::version(),
        Action::RuntimeInfo => meta::runtime_info(ctx),
        Action::ProvidersList => registry_actions::providers_list(bag),
        Action::ChainsTop => registry_actions::chains_top(bag),
        Action::ChainsAssets => registry_actions::chains_assets(bag),
        Action::NormalizeChain => registry_actions::normalize_chain(bag),
        Action::NormalizeAmount => registry_actions::normalize_amount(bag),
        Action::AssetsResolve => registry_actions::assets_resolve(bag),
        Action::YieldOpportunities => live_actions::yield_opportunities(bag, ctx),
        Action::LendMarkets => live_actions::lend_markets(bag, ctx),
        Action::LendRates => live_actions::lend_rates(bag, ctx),
        Action::BridgeQuote => quote_actions::bridge_quote(bag),
        Action::SwapQuote => quote_actions::swap_quote(bag),
        Action::LifiGetQuote => quote_actions::lifi_get_quote(bag),
        Action::LifiGetRoutes => quote_actions::lifi_get_routes(bag),
        Action::LifiRunWorkflow => quote_actions::lifi_run_workflow(bag),
        Action::CachePolicy => cache_actions::cache_policy(ctx),
        Action::CacheGet => cache_actions::cache_get(bag, ctx),
        Action::CachePut => cache_actions::cache_put(bag, ctx),
        Action::RpcCallCached => rpc_actions::rpc_call_cached(bag, ctx),
        Action::PolicyCheck => rpc_actions::policy_check(bag, ctx),
        Action::BuildTransferNative => rpc_actions::build_transfer_native(bag),
        Action::BuildTransferErc20 => rpc_actions::build_transfer_erc20(bag),
        Action::SendSignedTransaction => rpc_actions::send_signed_transaction(bag, ctx),
    }
}
