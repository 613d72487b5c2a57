//! HTTP Fetcher (component G). A small `Transport` trait with two
//! implementations, selected once at startup by [`crate::policy::Transport`]
//! and held for the lifetime of the process — mirrors the teacher's
//! pluggable artifact-source abstraction in `contracts::source`, just with
//! a blocking client instead of an async one since the whole process is
//! single-shot and synchronous.

use std::io::Read;
use std::process::Command;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("missing_url: no override URL configured for provider {provider}")]
    MissingUrl { provider: String },
    #[error("unreachable: {transport} transport could not reach {url}: {detail}")]
    Unreachable {
        transport: &'static str,
        url: String,
        detail: String,
    },
    #[error("non_json: {transport} transport got a non-JSON response from {url}")]
    NonJson { transport: &'static str, url: String },
}

impl FetchError {
    /// The short classification token used in the `provider=.. transport=..`
    /// context string surfaced on a code-12 response.
    pub fn class(&self) -> &'static str {
        match self {
            FetchError::MissingUrl { .. } => "missing_url",
            FetchError::Unreachable { .. } => "unreachable",
            FetchError::NonJson { .. } => "non_json",
        }
    }
}

pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
    fn name(&self) -> &'static str;
}

const TIMEOUT: Duration = Duration::from_secs(8);

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .expect("static client configuration is always valid");
        ReqwestTransport { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let response = self.client.get(url).send().map_err(|err| FetchError::Unreachable {
            transport: self.name(),
            url: url.to_string(),
            detail: err.to_string(),
        })?;
        let bytes = response.bytes().map_err(|err| FetchError::Unreachable {
            transport: self.name(),
            url: url.to_string(),
            detail: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|_| FetchError::NonJson {
            transport: self.name(),
            url: url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "zig"
    }
}

pub struct CurlTransport;

impl Transport for CurlTransport {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let output = Command::new("curl")
            .args(["-sS", "--max-time", "8", url])
            .output()
            .map_err(|err| FetchError::Unreachable {
                transport: self.name(),
                url: url.to_string(),
                detail: err.to_string(),
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            let mut detail = String::new();
            let _ = (&output.stderr[..]).read_to_string(&mut detail);
            return Err(FetchError::Unreachable {
                transport: self.name(),
                url: url.to_string(),
                detail: if detail.is_empty() {
                    format!("curl exited with {}", output.status)
                } else {
                    detail
                },
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|_| FetchError::NonJson {
            transport: self.name(),
            url: url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "curl"
    }
}

pub fn build(transport: crate::policy::Transport) -> Box<dyn Transport> {
    match transport {
        crate::policy::Transport::Native => Box::new(ReqwestTransport::new()),
        crate::policy::Transport::Curl => Box::new(CurlTransport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_classifies_correctly() {
        let err = FetchError::MissingUrl { provider: "defillama".to_string() };
        assert_eq!(err.class(), "missing_url");
    }

    #[test]
    fn unreachable_host_is_classified_unreachable() {
        let transport = ReqwestTransport::new();
        let err = transport.get_json("http://127.0.0.1:1").unwrap_err();
        assert_eq!(err.class(), "unreachable");
    }
}
