//! DeFi action dispatcher core. A single-binary, single-request,
//! synchronous process: one JSON object in on stdin, one JSON object out
//! on stdout, then exit. See `DESIGN.md` for the per-component grounding.

pub mod actions;
pub mod cache;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod live;
pub mod params;
pub mod policy;
pub mod quote;
pub mod registry;
pub mod select;

use std::io::{Read, Write};

use crate::cache::CacheStore;
use crate::policy::Policy;

/// Runs the Codec component (4.A): read stdin to EOF, dispatch, write the
/// envelope, flush. Returns the process exit code. A malformed JSON
/// payload or stdin I/O error is a protocol-level failure — logged to
/// stderr, never surfaced as an in-band `status="error"` response.
pub fn run() -> i32 {
    let mut raw = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut raw) {
        eprintln!("defi-core: failed to read stdin: {err}");
        return 1;
    }

    let request: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("defi-core: malformed JSON request: {err}");
            return 1;
        }
    };

    let policy = Policy::from_env();
    let transport = fetch::build(policy.transport);
    let cache = CacheStore::new(policy.cache_dir.clone());

    let envelope = dispatch::dispatch(&request, &policy, transport.as_ref(), &cache);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if let Err(err) = serde_json::to_writer(&mut handle, &envelope) {
        eprintln!("defi-core: failed to write response: {err}");
        return 1;
    }
    if let Err(err) = handle.write_all(b"\n").and_then(|_| handle.flush()) {
        eprintln!("defi-core: failed to flush stdout: {err}");
        return 1;
    }

    0
}
