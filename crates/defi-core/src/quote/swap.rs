//! Swap quote synthesis. Adds the exact-input/exact-output trade-type axis
//! on top of the shared provider-selection precedence.

use crate::error::AppError;
use crate::registry::provider::Category;

use super::{apply_rate, apply_rate_inverse, resolve_provider, resolve_provider_exact_output, Quote, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl TradeType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "exact-input" => Some(TradeType::ExactInput),
            "exact-output" => Some(TradeType::ExactOutput),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TradeType::ExactInput => "exact-input",
            TradeType::ExactOutput => "exact-output",
        }
    }
}

pub fn quote_exact_input(amount_in: &str, selection: Selection, slippage_pct: Option<f64>) -> Result<Quote, AppError> {
    let (provider, source) = resolve_provider(
        &selection,
        Category::Swap,
        "swap.quote",
        crate::registry::provider::DEFAULT_SWAP_PROVIDER,
    )?;
    if let Some(pct) = slippage_pct {
        reject_disallowed_slippage(provider, pct)?;
    }

    let quote_rate_ppm = provider.quote_rate_ppm.expect("swap providers always declare a quote rate");
    let estimated_amount_out = apply_rate(amount_in, quote_rate_ppm)?;

    Ok(Quote {
        provider: provider.name.to_string(),
        source,
        trade_type: TradeType::ExactInput.as_str(),
        amount_in: amount_in.to_string(),
        estimated_amount_out,
        fee_bps: provider.fee_bps,
        eta_seconds: provider.eta_seconds,
        price_impact_bps: provider.price_impact_bps,
    })
}

pub fn quote_exact_output(amount_out: &str, selection: Selection, slippage_pct: Option<f64>) -> Result<Quote, AppError> {
    let (provider, source) = resolve_provider_exact_output(
        &selection,
        Category::Swap,
        "swap.quote",
        crate::registry::provider::DEFAULT_SWAP_PROVIDER,
    )?;
    if let Some(pct) = slippage_pct {
        reject_disallowed_slippage(provider, pct)?;
    }

    let quote_rate_ppm = provider.quote_rate_ppm.expect("swap providers always declare a quote rate");
    let amount_in = apply_rate_inverse(amount_out, quote_rate_ppm)?;

    Ok(Quote {
        provider: provider.name.to_string(),
        source,
        trade_type: TradeType::ExactOutput.as_str(),
        amount_in,
        estimated_amount_out: amount_out.to_string(),
        fee_bps: provider.fee_bps,
        eta_seconds: provider.eta_seconds,
        price_impact_bps: provider.price_impact_bps,
    })
}

fn reject_disallowed_slippage(provider: &crate::registry::provider::ProviderRecord, pct: f64) -> Result<(), AppError> {
    if pct <= 0.0 {
        return Err(AppError::validation("slippagePct must be strictly positive"));
    }
    if !provider.accepts_slippage {
        return Err(AppError::validation(format!("provider '{}' does not accept slippagePct", provider.name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_input_oneinch_matches_fixture() {
        let q = quote_exact_input("1000000", Selection::Provider("1inch".to_string()), None).unwrap();
        assert_eq!(q.estimated_amount_out, "998901");
        assert_eq!(q.trade_type, "exact-input");
    }

    #[test]
    fn exact_output_defaults_to_uniswap() {
        let q = quote_exact_output("998501", Selection::None, None).unwrap();
        assert_eq!(q.provider, "uniswap");
        assert_eq!(q.source, "default_exact_output");
    }

    #[test]
    fn exact_output_pinned_unsupported_provider_mentions_exact_output() {
        let err = quote_exact_output("998501", Selection::Provider("1inch".to_string()), None).unwrap_err();
        assert_eq!(err.code().as_i64(), 13);
        assert!(err.to_string().contains("exact-output"));
    }

    #[test]
    fn zero_slippage_is_rejected() {
        let provider = crate::registry::provider::lookup("uniswap").unwrap();
        let err = reject_disallowed_slippage(provider, 0.0).unwrap_err();
        assert_eq!(err.code().as_i64(), 2);
    }
}
