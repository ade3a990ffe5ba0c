//! Checkout Config

use clap::Args;
use folio::TaxRate;
use folio_app::domain::orders::CheckoutConfig;

/// Order and checkout settings.
#[derive(Debug, Args)]
pub struct CheckoutSettings {
    /// ISO 4217 currency stamped on new orders
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = "USD")]
    pub checkout_currency: String,

    /// Flat tax rate as a percentage with up to two decimals (e.g. `8.25`)
    #[arg(
        long,
        env = "CHECKOUT_TAX_RATE_PERCENT",
        default_value = "0",
        value_parser = parse_tax_rate_percent
    )]
    pub checkout_tax_rate_percent: TaxRate,

    /// First segment of generated order numbers
    #[arg(long, env = "ORDER_NUMBER_PREFIX", default_value = "FO")]
    pub order_number_prefix: String,
}

impl CheckoutSettings {
    pub(crate) fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            currency: self.checkout_currency.to_ascii_uppercase(),
            tax_rate: self.checkout_tax_rate_percent,
            order_number_prefix: self.order_number_prefix.clone(),
        }
    }
}

fn parse_tax_rate_percent(value: &str) -> Result<TaxRate, String> {
    let invalid = || format!("`{value}` is not a percentage between 0 and 100");

    let (whole, fraction) = value.trim().split_once('.').unwrap_or((value.trim(), ""));

    if whole.is_empty() || fraction.len() > 2 {
        return Err(invalid());
    }

    let whole: u16 = whole.parse().map_err(|_err| invalid())?;
    let fraction: u16 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<2}").parse().map_err(|_err| invalid())?
    };

    let basis_points = whole
        .checked_mul(100)
        .and_then(|points| points.checked_add(fraction))
        .filter(|points| *points <= 10_000)
        .ok_or_else(invalid)?;

    Ok(TaxRate::from_basis_points(basis_points))
}
