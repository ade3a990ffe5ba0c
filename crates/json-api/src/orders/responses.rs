//! Order Responses

use folio_app::domain::orders::{
    data::{BillingDetails, CheckoutReceipt, OrderPage, OrderStatistics, StatusCount},
    records::{OrderDetails, OrderEventRecord, OrderItemRecord, OrderRecord},
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Billing Details
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct BillingDetailsBody {
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

impl From<BillingDetails> for BillingDetailsBody {
    fn from(details: BillingDetails) -> Self {
        Self {
            name: details.name,
            email: details.email,
            phone: details.phone,
            company: details.company,
            address: details.address,
            city: details.city,
            state: details.state,
            country: details.country,
            postal_code: details.postal_code,
        }
    }
}

impl From<BillingDetailsBody> for BillingDetails {
    fn from(body: BillingDetailsBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
            company: body.company,
            address: body.address,
            city: body.city,
            state: body.state,
            country: body.country,
            postal_code: body.postal_code,
        }
    }
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub total_amount: u64,
    pub currency: String,

    /// Payment is always opened by a separate intent call
    pub payment_required: bool,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        Self {
            order_id: receipt.order_uuid.into_uuid(),
            order_number: receipt.order_number,
            total_amount: receipt.total_amount,
            currency: receipt.currency,
            payment_required: receipt.payment_required,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub order_number: String,
    pub status: String,
    pub user_uuid: Option<Uuid>,
    pub guest_email: Option<String>,
    pub subtotal: u64,
    pub tax_amount: u64,
    pub discount_amount: u64,
    pub total_amount: u64,
    pub currency: String,
    pub coupon_uuid: Option<Uuid>,
    pub payment_method: String,
    pub billing_details: BillingDetailsBody,

    #[salvo(schema(value_type = Option<Object>))]
    pub requirements: Option<Value>,

    pub assigned_editor_uuid: Option<Uuid>,
    pub estimated_delivery_at: Option<String>,
    pub delivered_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_number: order.order_number,
            status: order.status.to_string(),
            user_uuid: order.user_uuid.map(|uuid| uuid.into_uuid()),
            guest_email: order.guest_email,
            subtotal: order.subtotal,
            tax_amount: order.tax_amount,
            discount_amount: order.discount_amount,
            total_amount: order.total_amount,
            currency: order.currency,
            coupon_uuid: order.coupon_uuid.map(|uuid| uuid.into_uuid()),
            payment_method: order.payment_method.to_string(),
            billing_details: order.billing_details.into(),
            requirements: order.requirements,
            assigned_editor_uuid: order.assigned_editor_uuid.map(|uuid| uuid.into_uuid()),
            estimated_delivery_at: order.estimated_delivery_at.map(|at| at.to_string()),
            delivered_at: order.delivered_at.map(|at| at.to_string()),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub variant_uuid: Uuid,
    pub service_title: String,
    pub variant_title: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
    pub turnaround: String,
    pub add_ons: Vec<String>,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            variant_uuid: item.variant_uuid.into_uuid(),
            service_title: item.service_title,
            variant_title: item.variant_title,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            turnaround: item.item_meta.turnaround.as_str().to_string(),
            add_ons: item.item_meta.add_ons,
        }
    }
}

/// Order Event Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderEventResponse {
    pub uuid: Uuid,

    /// `user`, `guest` or `system`
    pub actor: String,
    pub actor_uuid: Option<Uuid>,

    /// Tagged by `type`
    #[salvo(schema(value_type = Object))]
    pub event: Value,

    pub created_at: String,
}

impl From<OrderEventRecord> for OrderEventResponse {
    fn from(record: OrderEventRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            actor: record.actor.as_str().to_string(),
            actor_uuid: record.actor.user_uuid().map(|uuid| uuid.into_uuid()),
            event: serde_json::to_value(record.event).unwrap_or_default(),
            created_at: record.created_at.to_string(),
        }
    }
}

/// Order Details Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderDetailsResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    pub events: Vec<OrderEventResponse>,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        Self {
            order: details.order.into(),
            items: details.items.into_iter().map(Into::into).collect(),
            events: details.events.into_iter().map(Into::into).collect(),
        }
    }
}

/// Order Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPageResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<OrderPage> for OrderPageResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            orders: page.orders.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Status Count
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusCountResponse {
    pub status: String,
    pub count: u64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(count: StatusCount) -> Self {
        Self {
            status: count.status.to_string(),
            count: count.count,
        }
    }
}

/// Order Statistics Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderStatisticsResponse {
    pub total_orders: u64,
    pub paid_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_revenue: u64,
    pub average_order_value: u64,

    /// Percentage with two decimals, e.g. `"66.67"`
    pub conversion_rate: String,

    pub status_breakdown: Vec<StatusCountResponse>,
}

impl From<OrderStatistics> for OrderStatisticsResponse {
    fn from(stats: OrderStatistics) -> Self {
        Self {
            total_orders: stats.total_orders,
            paid_orders: stats.paid_orders,
            pending_orders: stats.pending_orders,
            completed_orders: stats.completed_orders,
            total_revenue: stats.total_revenue,
            average_order_value: stats.average_order_value,
            conversion_rate: stats.conversion_rate.to_string(),
            status_breakdown: stats
                .status_breakdown
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}
