//! Orders Data

use folio::{OrderStatus, Totals};
use jiff::Timestamp;
use rand::{rngs::OsRng, seq::SliceRandom};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    auth::UserUuid,
    domain::{
        coupons::records::CouponUuid,
        orders::records::{OrderRecord, OrderUuid},
        payments::records::Gateway,
    },
};

/// Longest accepted billing name, email and free-text field.
pub const BILLING_FIELD_MAX_LEN: usize = 255;

/// Longest accepted order note.
pub const NOTE_MAX_LEN: usize = 1_000;

/// Default and largest page sizes for order listings.
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Length of the random part of an order number.
pub const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A billing field failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid billing {field}")]
pub struct InvalidBillingDetails {
    pub field: &'static str,
}

/// Billing contact captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl BillingDetails {
    /// Checks required fields and lengths.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), InvalidBillingDetails> {
        let too_long = |value: &str| value.chars().count() > BILLING_FIELD_MAX_LEN;

        if self.name.trim().is_empty() || too_long(&self.name) {
            return Err(InvalidBillingDetails { field: "name" });
        }

        if !self.email.contains('@') || too_long(&self.email) {
            return Err(InvalidBillingDetails { field: "email" });
        }

        let optional = [
            ("phone", &self.phone),
            ("company", &self.company),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postal_code", &self.postal_code),
        ];

        for (field, value) in optional {
            if value.as_deref().is_some_and(too_long) {
                return Err(InvalidBillingDetails { field });
            }
        }

        Ok(())
    }
}

/// Checkout input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    pub billing_details: BillingDetails,

    #[serde(default)]
    pub requirements: Option<Value>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    pub payment_method: Gateway,
}

/// Order row as written by checkout.
#[derive(Debug, Clone)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub user_uuid: Option<UserUuid>,
    pub guest_email: Option<String>,
    pub guest_session_key: Option<String>,
    pub totals: Totals,
    pub currency: String,
    pub coupon_uuid: Option<CouponUuid>,
    pub payment_method: Gateway,
    pub billing_details: BillingDetails,
    pub requirements: Option<Value>,
    pub estimated_delivery_at: Option<Timestamp>,
}

/// What checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order_uuid: OrderUuid,
    pub order_number: String,
    pub total_amount: u64,
    pub currency: String,
    pub payment_required: bool,
}

/// Filter for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl OrderFilter {
    /// `(limit, offset)` with the page clamped to at least 1 and the page size
    /// to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.max(1);

        (
            i64::from(per_page),
            i64::from(page - 1) * i64::from(per_page),
        )
    }
}

/// One page of orders.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,

    #[serde(default)]
    pub note: Option<String>,
}

/// Optional creation-time window for statistics. `to` is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Orders in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub paid_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_revenue: u64,
    pub average_order_value: u64,

    /// Paid orders as a percentage of all orders, two decimals.
    pub conversion_rate: Decimal,

    pub status_breakdown: Vec<StatusCount>,
}

/// Raw counts read from storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OrderCounts {
    pub total_orders: u64,
    pub paid_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_revenue: u64,
}

impl OrderStatistics {
    pub(crate) fn from_counts(counts: OrderCounts, status_breakdown: Vec<StatusCount>) -> Self {
        let average_order_value = counts
            .total_revenue
            .checked_div(counts.paid_orders)
            .unwrap_or(0);

        let conversion_rate = if counts.total_orders == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(counts.paid_orders) * Decimal::ONE_HUNDRED
                / Decimal::from(counts.total_orders))
            .round_dp(2)
        };

        Self {
            total_orders: counts.total_orders,
            paid_orders: counts.paid_orders,
            pending_orders: counts.pending_orders,
            completed_orders: counts.completed_orders,
            total_revenue: counts.total_revenue,
            average_order_value,
            conversion_rate,
            status_breakdown,
        }
    }
}

/// `{prefix}-{YYYYMMDD}-{six uppercase alphanumerics}`, dated in UTC.
#[must_use]
pub fn generate_order_number(prefix: &str, now: Timestamp) -> String {
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .filter_map(|_| ORDER_NUMBER_ALPHABET.choose(&mut OsRng).copied())
        .map(char::from)
        .collect();

    format!("{prefix}-{}-{suffix}", now.strftime("%Y%m%d"))
}
