//! Carts Data

use folio::{PricingError, UnitType, pricing};
use jiff::Timestamp;
use serde::Serialize;

use crate::domain::{
    carts::records::{CartItemMeta, CartLineRecord, CartUuid},
    catalog::records::VariantUuid,
    coupons::data::AppliedCoupon,
};

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub variant: VariantUuid,
    pub quantity: u32,
    pub meta: CartItemMeta,
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummaryItem {
    pub variant_uuid: VariantUuid,
    pub service_title: String,
    pub variant_title: String,
    pub unit_type: UnitType,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
    pub turnaround_days: u32,
    pub meta: CartItemMeta,
    pub is_available: bool,
}

impl CartSummaryItem {
    /// Prices a stored line. Unavailable lines keep a zero subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] when the stored quantity no longer fits the variant.
    pub fn price(line: CartLineRecord, now: Timestamp) -> Result<Self, PricingError> {
        let (subtotal, turnaround_days) = if line.is_available {
            let quote = pricing::quote(
                &line.terms,
                line.quantity,
                line.meta.turnaround,
                &line.meta.add_ons,
                now,
            )?;

            (quote.subtotal, quote.turnaround_days)
        } else {
            (0, line.terms.turnaround_days)
        };

        Ok(Self {
            variant_uuid: line.variant_uuid,
            service_title: line.service_title,
            variant_title: line.variant_title,
            unit_type: line.terms.unit_type,
            quantity: line.quantity,
            unit_price: line.terms.price,
            subtotal,
            turnaround_days,
            meta: line.meta,
            is_available: line.is_available,
        })
    }
}

/// Read view of a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub cart_uuid: Option<CartUuid>,
    pub items: Vec<CartSummaryItem>,
    pub item_count: u32,
    pub subtotal: u64,
}

/// Cart totals with an optional coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: u64,
    pub discount: u64,
    pub tax: u64,
    pub total: u64,
    pub coupon: Option<AppliedCoupon>,
}

#[cfg(test)]
mod tests {
    use folio::{TurnaroundTier, VariantTerms};

    use super::*;

    fn line(is_available: bool) -> CartLineRecord {
        CartLineRecord {
            variant_uuid: VariantUuid::new(),
            service_title: "Copyediting".to_string(),
            variant_title: "Per page".to_string(),
            quantity: 10,
            meta: CartItemMeta {
                turnaround: TurnaroundTier::Express,
                add_ons: vec!["style_guide_creation".to_string()],
            },
            terms: VariantTerms {
                price: 300,
                unit_type: UnitType::PerPage,
                turnaround_days: 8,
                min_quantity: 1,
                max_quantity: None,
            },
            is_available,
        }
    }

    #[test]
    fn available_line_is_priced_through_the_engine() {
        let item = CartSummaryItem::price(line(true), Timestamp::UNIX_EPOCH)
            .expect("line should price");

        assert_eq!(item.unit_price, 300);
        assert_eq!(item.subtotal, 3_000 * 2 + 5_000);
        assert_eq!(item.turnaround_days, 2);
    }

    #[test]
    fn unavailable_line_contributes_nothing() {
        let item = CartSummaryItem::price(line(false), Timestamp::UNIX_EPOCH)
            .expect("line should price");

        assert_eq!(item.subtotal, 0);
        assert!(!item.is_available);
    }
}
