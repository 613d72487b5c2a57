//! Bridge quote synthesis. Bridges only ever operate exact-input in this
//! system — no bridge provider in the registry declares exact-output
//! support, so unlike swaps there is no trade-type branch here.

use crate::error::AppError;
use crate::registry::provider::Category;

use super::{apply_rate, resolve_provider, Quote, Selection};

pub fn quote(amount: &str, selection: Selection) -> Result<Quote, AppError> {
    let (provider, source) = resolve_provider(
        &selection,
        Category::Bridge,
        "bridge.quote",
        crate::registry::provider::DEFAULT_BRIDGE_PROVIDER,
    )?;

    let quote_rate_ppm = provider.quote_rate_ppm.expect("bridge providers always declare a quote rate");
    let estimated_amount_out = apply_rate(amount, quote_rate_ppm)?;

    Ok(Quote {
        provider: provider.name.to_string(),
        source,
        trade_type: "exact-input",
        amount_in: amount.to_string(),
        estimated_amount_out,
        fee_bps: provider.fee_bps,
        eta_seconds: provider.eta_seconds,
        price_impact_bps: provider.price_impact_bps,
    })
}
