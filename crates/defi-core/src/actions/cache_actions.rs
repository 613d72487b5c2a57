//! Cache Store actions: `cachePolicy`, `cacheGet`, `cachePut`.
//!
//! `cacheGet`'s hit/stale/miss vocabulary lives in a nested `status` field
//! under the `cache` wrap key rather than flat-merged into the envelope —
//! flat-merging would let a cache row's own `"status"` value clobber the
//! envelope's top-level `status: "ok"`.

use serde_json::{json, Value};

use crate::dispatch::{Context, HandlerOutcome};
use crate::error::{AppError, AppResult};
use crate::params::{Field, ParamBag};
use crate::select::FieldAlias;

const KEY_FIELD: Field = Field::new("key", &["key", "cacheKey", "cache_key"]);
const TTL_FIELD: Field = Field::new("ttlSeconds", &["ttlSeconds", "ttl_seconds"]);

const CACHE_SELECT_TABLE: &[FieldAlias] = &[
    FieldAlias::new("status", &["status"]),
    FieldAlias::new("value", &["value"]),
    FieldAlias::new("fetchedAtUnix", &["fetchedAtUnix", "fetched_at_unix"]),
    FieldAlias::new("ttlSeconds", &["ttlSeconds", "ttl_seconds"]),
];

pub fn cache_policy(ctx: &Context) -> AppResult<HandlerOutcome> {
    let payload = json!({
        "cacheDir": ctx.policy.cache_dir.to_string_lossy(),
        "liveMarketsTtlSeconds": ctx.policy.live_markets_ttl_seconds,
        "liveMarketsAllowStale": ctx.policy.live_markets_allow_stale,
        "maxStaleSeconds": ctx.policy.max_stale_seconds(),
    });
    Ok(HandlerOutcome::flat(payload, &[]))
}

pub fn cache_get(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let key = bag.required_str(&KEY_FIELD)?;
    let now = crate::cache::now_unix();
    let max_stale = ctx.policy.max_stale_seconds();

    let payload = match ctx.cache.get(&key, now, max_stale) {
        crate::cache::Lookup::Fresh(entry) => json!({
            "status": "hit",
            "value": entry.value,
            "fetchedAtUnix": entry.fetched_at_unix,
            "ttlSeconds": entry.ttl_seconds,
        }),
        crate::cache::Lookup::Stale(entry) => json!({
            "status": "stale",
            "value": entry.value,
            "fetchedAtUnix": entry.fetched_at_unix,
            "ttlSeconds": entry.ttl_seconds,
        }),
        crate::cache::Lookup::Miss => json!({ "status": "miss" }),
    };

    Ok(HandlerOutcome::wrapped("cache", payload, CACHE_SELECT_TABLE))
}

pub fn cache_put(bag: &ParamBag, ctx: &Context) -> AppResult<HandlerOutcome> {
    let key = bag.required_str(&KEY_FIELD)?;
    let value: Value = bag
        .raw_value("value")
        .cloned()
        .ok_or_else(|| AppError::validation("missing required field 'value'"))?;
    let ttl_seconds = bag.optional_u64(&TTL_FIELD)?.unwrap_or(0);

    let now = crate::cache::now_unix();
    ctx.cache.put(&key, value, ttl_seconds, now)?;

    let payload = json!({ "status": "stored", "ttlSeconds": ttl_seconds });
    Ok(HandlerOutcome::wrapped("cache", payload, CACHE_SELECT_TABLE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::fetch;
    use crate::policy::Policy;

    fn test_ctx<'a>(cache: &'a CacheStore, policy: &'a Policy, transport: &'a dyn crate::fetch::Transport) -> Context<'a> {
        Context { policy, transport, cache }
    }

    #[test]
    fn put_then_get_reports_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let mut policy = Policy::from_env();
        policy.live_markets_ttl_seconds = 60;
        let transport = fetch::build(crate::policy::Transport::Native);
        let ctx = test_ctx(&cache, &policy, transport.as_ref());

        let put_bag = ParamBag::new(json!({"key": "k1", "value": {"a": 1}, "ttlSeconds": 60}));
        cache_put(&put_bag, &ctx).unwrap();

        let get_bag = ParamBag::new(json!({"key": "k1"}));
        let outcome = cache_get(&get_bag, &ctx).unwrap();
        assert_eq!(outcome.payload["status"], "hit");
    }

    #[test]
    fn zero_ttl_put_reads_back_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let policy = Policy::from_env();
        let transport = fetch::build(crate::policy::Transport::Native);
        let ctx = test_ctx(&cache, &policy, transport.as_ref());

        let put_bag = ParamBag::new(json!({"key": "k2", "value": {"a": 1}, "ttlSeconds": 0}));
        cache_put(&put_bag, &ctx).unwrap();

        let get_bag = ParamBag::new(json!({"key": "k2"}));
        let outcome = cache_get(&get_bag, &ctx).unwrap();
        assert_eq!(outcome.payload["status"], "stale");
    }

    #[test]
    fn missing_key_reports_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let policy = Policy::from_env();
        let transport = fetch::build(crate::policy::Transport::Native);
        let ctx = test_ctx(&cache, &policy, transport.as_ref());

        let get_bag = ParamBag::new(json!({"key": "nope"}));
        let outcome = cache_get(&get_bag, &ctx).unwrap();
        assert_eq!(outcome.payload["status"], "miss");
    }
}
