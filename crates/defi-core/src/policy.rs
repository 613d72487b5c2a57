//! Env/Policy (component B). Read once at startup; never mutated.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// In-process HTTP client. Selected by default and by the `"zig"` value,
    /// kept for operational naming parity with the system this replaces.
    Native,
    /// Shells out to the system `curl` binary.
    Curl,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Native => "zig",
            Transport::Curl => "curl",
        }
    }

    fn from_env_value(value: &str) -> Transport {
        match value.trim().to_ascii_lowercase().as_str() {
            "curl" => Transport::Curl,
            "zig" => Transport::Native,
            other => {
                if !other.is_empty() {
                    tracing::warn!(value = other, "unrecognized transport, falling back to native");
                }
                Transport::Native
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Policy {
    pub strict: bool,
    pub allow_broadcast: bool,
    pub allowlist: Option<HashSet<String>>,
    pub cache_dir: std::path::PathBuf,
    pub live_markets_ttl_seconds: u64,
    pub live_markets_allow_stale: bool,
    pub transport: Transport,
    pub defi_llama_pools_url: Option<String>,
    pub defi_morpho_pools_url: Option<String>,
    pub defi_aave_pools_url: Option<String>,
    pub defi_kamino_pools_url: Option<String>,
}

fn read_bool(key: &str) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "TRUE" | "True"),
        Err(_) => false,
    }
}

fn read_url(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn read_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, "malformed integer env var, using default");
            default
        }),
        Err(_) => default,
    }
}

impl Policy {
    pub fn from_env() -> Self {
        let allowlist = std::env::var("ZIG_CORE_ALLOWLIST").ok().map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<HashSet<_>>()
        });

        let cache_dir = std::env::var("ZIG_CORE_CACHE_DIR")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from("./.runtime-cache"));

        let transport = std::env::var("DEFI_LIVE_HTTP_TRANSPORT")
            .map(|v| Transport::from_env_value(&v))
            .unwrap_or(Transport::Native);

        Policy {
            strict: read_bool("ZIG_CORE_STRICT"),
            allow_broadcast: read_bool("ZIG_CORE_ALLOW_BROADCAST"),
            allowlist,
            cache_dir,
            live_markets_ttl_seconds: read_u64("DEFI_LIVE_MARKETS_TTL_SECONDS", 60),
            live_markets_allow_stale: read_bool("DEFI_LIVE_MARKETS_ALLOW_STALE"),
            transport,
            defi_llama_pools_url: read_url("DEFI_LLAMA_POOLS_URL"),
            defi_morpho_pools_url: read_url("DEFI_MORPHO_POOLS_URL"),
            defi_aave_pools_url: read_url("DEFI_AAVE_POOLS_URL"),
            defi_kamino_pools_url: read_url("DEFI_KAMINO_POOLS_URL"),
        }
    }

    pub fn max_stale_seconds(&self) -> u64 {
        self.live_markets_ttl_seconds.saturating_mul(10)
    }

    pub fn action_allowed(&self, action: &str) -> bool {
        match &self.allowlist {
            Some(set) => set.contains(action),
            None => true,
        }
    }

    pub fn pool_url_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "defillama" => self.defi_llama_pools_url.as_deref(),
            "morpho" => self.defi_morpho_pools_url.as_deref(),
            "aave" => self.defi_aave_pools_url.as_deref(),
            "kamino" => self.defi_kamino_pools_url.as_deref(),
            _ => None,
        }
    }
}
