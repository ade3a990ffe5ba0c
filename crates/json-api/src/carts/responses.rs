//! Cart Responses

use folio_app::domain::carts::data::{CartSummary, CartSummaryItem, CartTotals};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Absent until the first item is added
    pub uuid: Option<Uuid>,

    pub items: Vec<CartItemResponse>,
    pub item_count: u32,

    /// Sum of available lines in minor units
    pub subtotal: u64,
}

impl From<CartSummary> for CartResponse {
    fn from(summary: CartSummary) -> Self {
        Self {
            uuid: summary.cart_uuid.map(|uuid| uuid.into_uuid()),
            items: summary.items.into_iter().map(Into::into).collect(),
            item_count: summary.item_count,
            subtotal: summary.subtotal,
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub variant_uuid: Uuid,
    pub service_title: String,
    pub variant_title: String,
    pub unit_type: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
    pub turnaround: String,
    pub turnaround_days: u32,
    pub add_ons: Vec<String>,

    /// False once the variant or its service is deactivated
    pub is_available: bool,
}

impl From<CartSummaryItem> for CartItemResponse {
    fn from(item: CartSummaryItem) -> Self {
        Self {
            variant_uuid: item.variant_uuid.into_uuid(),
            service_title: item.service_title,
            variant_title: item.variant_title,
            unit_type: item.unit_type.to_string(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            turnaround: item.meta.turnaround.as_str().to_string(),
            turnaround_days: item.turnaround_days,
            add_ons: item.meta.add_ons,
            is_available: item.is_available,
        }
    }
}

/// Cart Totals Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartTotalsResponse {
    pub subtotal: u64,
    pub discount: u64,
    pub tax: u64,
    pub total: u64,
    pub coupon_code: Option<String>,
}

impl From<CartTotals> for CartTotalsResponse {
    fn from(totals: CartTotals) -> Self {
        Self {
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax: totals.tax,
            total: totals.total,
            coupon_code: totals.coupon.map(|coupon| coupon.code),
        }
    }
}
