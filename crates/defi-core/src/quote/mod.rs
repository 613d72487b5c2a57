//! Quote Engine (component I). Bridge and swap quote synthesis share the
//! same provider-selection precedence (pinned / CSV preference list /
//! named strategy / route default); only the amount arithmetic and the
//! exact-output axis differ, which is why those live in sibling modules.

pub mod bridge;
pub mod swap;

use crate::error::AppError;
use crate::registry::provider::{Category, ProviderRecord};

#[derive(Debug, Clone)]
pub struct Quote {
    pub provider: String,
    pub source: &'static str,
    pub trade_type: &'static str,
    pub amount_in: String,
    pub estimated_amount_out: String,
    pub fee_bps: u32,
    pub eta_seconds: u32,
    pub price_impact_bps: u32,
}

/// The three ways a caller may steer provider selection, resolved by the
/// dispatcher from `provider` / `providers` / `strategy` params (mutually
/// exclusive is not enforced here — spec.md doesn't require it; the first
/// one present, checked in this order, wins per the precedence rules).
pub enum Selection {
    Provider(String),
    Providers(Vec<String>),
    Strategy(String),
    None,
}

impl Selection {
    pub fn from_params(provider: Option<String>, providers: Option<String>, strategy: Option<String>) -> Selection {
        if let Some(p) = provider {
            return Selection::Provider(p);
        }
        if let Some(csv) = providers {
            let mut seen = std::collections::BTreeSet::new();
            let mut ordered = Vec::new();
            for raw in csv.split(',') {
                let name = raw.trim().to_ascii_lowercase();
                if name.is_empty() {
                    continue;
                }
                if seen.insert(name.clone()) {
                    ordered.push(name);
                }
            }
            return Selection::Providers(ordered);
        }
        if let Some(s) = strategy {
            return Selection::Strategy(s);
        }
        Selection::None
    }
}

/// Resolves the provider + `source` tag for a quote request, given the
/// capability an eligible provider must support and the route's default.
pub fn resolve_provider(
    selection: &Selection,
    category: Category,
    capability: &str,
    default_provider: &'static str,
) -> Result<(&'static ProviderRecord, &'static str), AppError> {
    resolve_provider_inner(selection, category, capability, default_provider, false)
}

/// Like [`resolve_provider`] but additionally requires exact-output
/// capability — used for swap quotes with `tradeType=exact-output`.
pub fn resolve_provider_exact_output(
    selection: &Selection,
    category: Category,
    capability: &str,
    default_provider: &'static str,
) -> Result<(&'static ProviderRecord, &'static str), AppError> {
    resolve_provider_inner(selection, category, capability, default_provider, true)
}

fn resolve_provider_inner(
    selection: &Selection,
    category: Category,
    capability: &str,
    default_provider: &'static str,
    require_exact_output: bool,
) -> Result<(&'static ProviderRecord, &'static str), AppError> {
    let eligible = |p: &ProviderRecord| {
        p.categories.contains(&category)
            && p.has_capability(capability)
            && (!require_exact_output || p.supports_exact_output)
    };

    match selection {
        Selection::Provider(name) => {
            let record = crate::registry::provider::lookup(name)
                .ok_or_else(|| AppError::unsupported(format!("unknown provider '{name}'")))?;
            if require_exact_output && !record.supports_exact_output {
                return Err(AppError::unsupported(format!(
                    "provider '{}' does not support exact-output",
                    record.name
                )));
            }
            if !eligible(record) {
                return Err(AppError::unsupported(format!(
                    "provider '{}' does not support {}",
                    record.name, capability
                )));
            }
            Ok((record, "provider"))
        }
        Selection::Providers(names) => {
            for name in names {
                if let Some(record) = crate::registry::provider::lookup(name) {
                    if eligible(record) {
                        return Ok((record, "providers"));
                    }
                }
            }
            if require_exact_output {
                return Err(AppError::unsupported(
                    "none of the listed providers support exact-output".to_string(),
                ));
            }
            let fallback = crate::registry::provider::lookup(default_provider)
                .expect("default provider is always a registered provider");
            Ok((fallback, "providers"))
        }
        Selection::Strategy(name) => {
            let mut candidates: Vec<&'static ProviderRecord> =
                crate::registry::provider::by_category(category).filter(|p| eligible(p)).collect();
            if candidates.is_empty() {
                return Err(AppError::unsupported(format!("no provider supports {capability}")));
            }
            let chosen = match name.to_ascii_lowercase().as_str() {
                "fastest" => candidates
                    .iter()
                    .copied()
                    .min_by_key(|p| p.eta_seconds)
                    .expect("non-empty"),
                "lowestfee" => candidates.iter().copied().min_by_key(|p| p.fee_bps).expect("non-empty"),
                _ => {
                    candidates.sort_by(|a, b| a.name.cmp(b.name));
                    candidates
                        .into_iter()
                        .max_by_key(|p| p.quote_rate_ppm.unwrap_or(0))
                        .expect("non-empty")
                }
            };
            Ok((chosen, "strategy"))
        }
        Selection::None => {
            let provider_name = if require_exact_output {
                crate::registry::provider::DEFAULT_EXACT_OUTPUT_PROVIDER
            } else {
                default_provider
            };
            let record = crate::registry::provider::lookup(provider_name)
                .expect("default provider is always a registered provider");
            let source = if require_exact_output { "default_exact_output" } else { "provider" };
            Ok((record, source))
        }
    }
}

/// `amount * quote_rate_ppm / 1_000_000`, truncated toward zero. Amounts are
/// base-unit integer strings parsed as `u128` — adequate for every realistic
/// on-chain base-unit amount and avoids floating point entirely.
pub fn apply_rate(amount: &str, quote_rate_ppm: u64) -> Result<String, AppError> {
    let amount: u128 = amount
        .parse()
        .map_err(|_| AppError::validation("amount exceeds supported precision"))?;
    let out = amount
        .checked_mul(quote_rate_ppm as u128)
        .ok_or_else(|| AppError::validation("amount overflows during quote computation"))?
        / 1_000_000u128;
    Ok(out.to_string())
}

/// Inverse of [`apply_rate`]: given a desired output, the input required to
/// produce at least that much, rounded up so the quote never under-delivers.
pub fn apply_rate_inverse(amount_out: &str, quote_rate_ppm: u64) -> Result<String, AppError> {
    let amount_out: u128 = amount_out
        .parse()
        .map_err(|_| AppError::validation("amount exceeds supported precision"))?;
    let numerator = amount_out
        .checked_mul(1_000_000u128)
        .ok_or_else(|| AppError::validation("amount overflows during quote computation"))?;
    let rate = quote_rate_ppm as u128;
    let amount_in = (numerator + rate - 1) / rate;
    Ok(amount_in.to_string())
}
