//! Smoke coverage of the paths `tests/offline.rs` can't reach: the
//! Live-Data fetch/cache state machine's forced-live failure and
//! auto-fallback branches, `rpcCallCached`'s stale-fallback path, and
//! the lifi workflow actions. A background `TcpListener` thread stands
//! in for a live provider endpoint instead of pulling in an async mock
//! server crate the rest of the binary has no other use for.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Stdio};
use std::thread;

use serde_json::{json, Value};

fn run(payload: Value, envs: &[(&str, &str)]) -> Value {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_defi-core"));
    cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let mut child = cmd.spawn().expect("spawn defi-core");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(serde_json::to_string(&payload).unwrap().as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("wait on defi-core");
    assert!(
        output.status.success(),
        "non-zero exit: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    serde_json::from_str(stdout.trim()).expect("stdout is one JSON object")
}

/// Serves one HTTP GET request with a fixed JSON body, then exits. Good
/// for exactly one `get_json` call per test.
fn serve_once(body: &'static str) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = TcpStream::shutdown(&stream, std::net::Shutdown::Both);
        }
    });
    (format!("http://{addr}"), handle)
}

fn cache_envs(dir: &tempfile::TempDir) -> Vec<(String, String)> {
    vec![("ZIG_CORE_CACHE_DIR".to_string(), dir.path().to_string_lossy().to_string())]
}

#[test]
fn forced_live_fetch_with_no_provider_url_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut envs = cache_envs(&dir);
    envs.push(("DEFI_LIVE_HTTP_TRANSPORT".to_string(), "curl".to_string()));
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "yieldOpportunities", "params": {
            "chain": "monad", "asset": "USDC", "provider": "morpho",
            "liveMode": "live", "liveProvider": "morpho",
        }}),
        &envs,
    );
    assert_eq!(res["status"], "error");
    assert_eq!(res["code"], 12);
    let message = res["error"].as_str().unwrap();
    assert!(message.contains("provider=morpho"));
    assert!(message.contains("transport=curl"));
}

#[test]
fn auto_mode_falls_back_to_registry_silently_when_provider_unset() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "yieldOpportunities", "params": {
            "chain": "monad", "asset": "USDC", "provider": "morpho",
            "liveMode": "auto", "liveProvider": "auto",
        }}),
        &envs,
    );
    assert_eq!(res["status"], "ok");
    assert_eq!(res["sourceProvider"], "defillama");
}

#[test]
fn forced_live_mode_with_auto_provider_falls_back_to_registry_instead_of_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "yieldOpportunities", "params": {
            "chain": "monad", "asset": "USDC", "provider": "morpho",
            "liveMode": "live", "liveProvider": "auto",
        }}),
        &envs,
    );
    assert_eq!(res["status"], "ok");
    assert_eq!(res["sourceProvider"], "defillama");
}

#[test]
fn live_fetch_reaches_a_real_listener_and_caches_the_result() {
    let (url, handle) = serve_once(r#"{"source_provider":"defillama","payload":[{"provider":"morpho","chain":"eip155:1","asset":"USDC","apy":3.95,"tvl_usd":300000000}]}"#);
    let dir = tempfile::tempdir().unwrap();
    let mut envs = cache_envs(&dir);
    envs.push(("DEFI_LLAMA_POOLS_URL".to_string(), url));
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "yieldOpportunities", "params": {
            "chain": "1", "asset": "USDC",
            "liveMode": "live", "liveProvider": "auto",
        }}),
        &envs,
    );
    assert_eq!(res["status"], "ok");
    assert_eq!(res["source"], "live");
    assert_eq!(res["sourceProvider"], "defillama");

    handle.join().unwrap();
}

#[test]
fn rpc_call_cached_falls_back_to_stale_entry_on_unreachable_host() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    run(
        json!({"action": "cachePut", "params": {
            "key": "rpcCallCached:https://no-such-host.invalid:eth_blockNumber:null",
            "ttlSeconds": 0,
            "value": "0x1",
        }}),
        &envs,
    );

    let no_stale = run(
        json!({"action": "rpcCallCached", "params": {
            "rpcUrl": "https://no-such-host.invalid",
            "method": "eth_blockNumber",
            "allowStaleFallback": false,
        }}),
        &envs,
    );
    assert_eq!(no_stale["status"], "error");
    assert_eq!(no_stale["code"], 12);

    let with_stale = run(
        json!({"action": "rpcCallCached", "params": {
            "rpcUrl": "https://no-such-host.invalid",
            "method": "eth_blockNumber",
            "allowStaleFallback": true,
        }}),
        &envs,
    );
    assert_eq!(with_stale["status"], "ok");
    assert_eq!(with_stale["source"], "stale");
    assert_eq!(with_stale["value"], "0x1");
}

#[test]
fn rpc_call_cached_succeeds_live_against_a_real_listener() {
    let (url, handle) = serve_once(r#"{"result":"0x2a"}"#);
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "rpcCallCached", "params": {"rpcUrl": url, "method": "eth_getBalance"}}),
        &envs,
    );
    assert_eq!(res["status"], "ok");
    assert_eq!(res["source"], "live");
    assert_eq!(res["value"]["result"], "0x2a");

    handle.join().unwrap();
}

#[test]
fn lifi_get_quote_pins_to_lifi_regardless_of_provider_param() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "lifiGetQuote", "params": {
            "from": "1", "to": "8453", "asset": "USDC", "amount": "1000000", "provider": "across",
        }}),
        &envs,
    );
    assert_eq!(res["quote"]["provider"], "lifi");
}

#[test]
fn lifi_get_routes_enumerates_every_bridge_provider() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "lifiGetRoutes", "params": {
            "from": "1", "to": "8453", "asset": "USDC", "amount": "1000000",
        }}),
        &envs,
    );
    let providers: Vec<&str> = res["routes"].as_array().unwrap().iter().map(|r| r["provider"].as_str().unwrap()).collect();
    assert!(providers.contains(&"lifi"));
    assert!(providers.contains(&"across"));
    assert!(providers.contains(&"bungee"));
}

#[test]
fn lifi_run_workflow_chains_quote_and_build_steps() {
    let dir = tempfile::tempdir().unwrap();
    let envs = cache_envs(&dir);
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "lifiRunWorkflow", "params": {
            "from": "1", "to": "8453", "asset": "USDC", "amount": "1000000",
        }}),
        &envs,
    );
    let steps = res["workflow"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["step"], "quote");
    assert_eq!(steps[1]["step"], "build");
}

#[test]
fn send_signed_transaction_succeeds_when_broadcast_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let mut envs = cache_envs(&dir);
    envs.push(("ZIG_CORE_ALLOW_BROADCAST".to_string(), "1".to_string()));
    let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let res = run(
        json!({"action": "sendSignedTransaction", "params": {"signedTxHex": "0x1234"}}),
        &envs,
    );
    assert_eq!(res["status"], "ok");
    assert_eq!(res["transaction"]["accepted"], true);
    assert!(res["transaction"]["txHash"].as_str().unwrap().starts_with("0x"));
}
