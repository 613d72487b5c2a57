//! Live-Data Layer (component H). Orchestrates the HTTP Fetcher and Cache
//! Store behind the fresh/cache/stale_cache/registry state machine from
//! spec §4.H. Registry fallback always attributes the data to `defillama`,
//! the aggregator whose shape the compiled-in registry rows mirror.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CacheStore, Lookup};
use crate::error::AppError;
use crate::fetch::{FetchError, Transport};
use crate::policy::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveMode {
    Off,
    Auto,
    Live,
}

impl LiveMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "off" => Some(LiveMode::Off),
            "auto" => Some(LiveMode::Auto),
            "live" => Some(LiveMode::Live),
            _ => None,
        }
    }
}

pub enum ProviderSelection<'a> {
    Auto,
    Pinned(&'a str),
}

impl<'a> ProviderSelection<'a> {
    pub fn parse(raw: Option<&'a str>) -> Self {
        match raw {
            None => ProviderSelection::Auto,
            Some(v) if v.eq_ignore_ascii_case("auto") => ProviderSelection::Auto,
            Some(v) => ProviderSelection::Pinned(v),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedLiveValue {
    source_provider: String,
    payload: Value,
}

pub struct LiveOutcome {
    pub source: &'static str,
    pub source_provider: String,
    pub fetched_at_unix: u64,
    pub source_url: String,
    pub payload: Value,
}

const DEFILLAMA: &str = "defillama";

fn attempt(provider: &str, policy: &Policy, transport: &dyn Transport) -> Result<(Value, String), FetchError> {
    let url = policy
        .pool_url_for(provider)
        .ok_or_else(|| FetchError::MissingUrl { provider: provider.to_string() })?;
    let payload = transport.get_json(url)?;
    Ok((payload, url.to_string()))
}

fn registry_outcome(payload: Value) -> LiveOutcome {
    LiveOutcome {
        source: "registry",
        source_provider: DEFILLAMA.to_string(),
        fetched_at_unix: 0,
        source_url: String::new(),
        payload,
    }
}

fn stale_outcome(entry_value: Value) -> Result<LiveOutcome, AppError> {
    let cached: CachedLiveValue = serde_json::from_value(entry_value)
        .map_err(|_| AppError::unavailable("stale cache entry corrupt"))?;
    Ok(LiveOutcome {
        source: "stale_cache",
        source_provider: cached.source_provider,
        fetched_at_unix: crate::cache::now_unix(),
        source_url: String::new(),
        payload: cached.payload,
    })
}

fn cache_hit_outcome(entry: crate::cache::Entry) -> Result<LiveOutcome, AppError> {
    let cached: CachedLiveValue = serde_json::from_value(entry.value)
        .map_err(|_| AppError::unavailable("cache entry corrupt"))?;
    Ok(LiveOutcome {
        source: "cache",
        source_provider: cached.source_provider,
        fetched_at_unix: entry.fetched_at_unix,
        source_url: String::new(),
        payload: cached.payload,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn resolve(
    policy: &Policy,
    transport: &dyn Transport,
    cache: &CacheStore,
    cache_key: &str,
    live_mode: LiveMode,
    provider_selection: ProviderSelection,
    natural_primary: &str,
    registry_fallback: impl FnOnce() -> Value,
) -> Result<LiveOutcome, AppError> {
    if live_mode == LiveMode::Off {
        return Ok(registry_outcome(registry_fallback()));
    }

    let now = crate::cache::now_unix();
    let max_stale = policy.max_stale_seconds();
    let lookup = cache.get(cache_key, now, max_stale);

    if let Lookup::Fresh(entry) = lookup.clone() {
        return cache_hit_outcome(entry);
    }

    let fetch_result = match &provider_selection {
        ProviderSelection::Pinned(provider) => {
            attempt(provider, policy, transport).map(|(payload, url)| (payload, url, provider.to_string()))
        }
        ProviderSelection::Auto => attempt(natural_primary, policy, transport)
            .map(|(payload, url)| (payload, url, natural_primary.to_string()))
            .or_else(|_| {
                attempt(DEFILLAMA, policy, transport).map(|(payload, url)| (payload, url, DEFILLAMA.to_string()))
            }),
    };

    match fetch_result {
        Ok((payload, url, provider)) => {
            let cached = CachedLiveValue { source_provider: provider.clone(), payload: payload.clone() };
            let _ = cache.put(cache_key, serde_json::to_value(cached).unwrap(), policy.live_markets_ttl_seconds, now);
            Ok(LiveOutcome {
                source: "live",
                source_provider: provider,
                fetched_at_unix: now,
                source_url: url,
                payload,
            })
        }
        Err(err) => match live_mode {
            LiveMode::Off => unreachable!(),
            LiveMode::Auto => Ok(registry_outcome(registry_fallback())),
            LiveMode::Live => {
                if policy.live_markets_allow_stale {
                    if let Lookup::Stale(entry) = lookup {
                        return stale_outcome(entry.value);
                    }
                }
                match &provider_selection {
                    ProviderSelection::Pinned(provider) => Err(AppError::unavailable(format!(
                        "provider={} transport={}: {}",
                        provider,
                        transport.name(),
                        err
                    ))),
                    ProviderSelection::Auto => Ok(registry_outcome(registry_fallback())),
                }
            }
        },
    }
}
