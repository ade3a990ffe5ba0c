//! Catalog Responses

use folio::PriceQuote;
use folio_app::domain::catalog::{
    data::Removal,
    records::{ServiceDetails, ServiceRecord, VariantRecord},
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Service Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ServiceResponse {
    pub uuid: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,

    /// One of `editing`, `formatting`, `design`, `illustration`
    pub service_type: String,

    /// Starting price in minor units
    pub base_price: u64,

    #[salvo(schema(value_type = Object))]
    pub features: Value,

    pub sort_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ServiceRecord> for ServiceResponse {
    fn from(service: ServiceRecord) -> Self {
        Self {
            uuid: service.uuid.into_uuid(),
            slug: service.slug,
            title: service.title,
            description: service.description,
            service_type: service.service_type.to_string(),
            base_price: service.base_price,
            features: service.features,
            sort_order: service.sort_order,
            is_active: service.is_active,
            is_featured: service.is_featured,
            created_at: service.created_at.to_string(),
            updated_at: service.updated_at.to_string(),
        }
    }
}

/// Variant Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VariantResponse {
    pub uuid: Uuid,
    pub service_uuid: Uuid,
    pub service_title: String,
    pub title: String,

    /// Unit price in minor units
    pub price: u64,

    /// One of `fixed`, `per_word`, `per_page`, `per_hour`
    pub unit_type: String,

    pub turnaround_days: u32,
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VariantRecord> for VariantResponse {
    fn from(variant: VariantRecord) -> Self {
        Self {
            uuid: variant.uuid.into_uuid(),
            service_uuid: variant.service_uuid.into_uuid(),
            service_title: variant.service_title,
            title: variant.title,
            price: variant.price,
            unit_type: variant.unit_type.to_string(),
            turnaround_days: variant.turnaround_days,
            min_quantity: variant.min_quantity,
            max_quantity: variant.max_quantity,
            is_active: variant.is_active,
            created_at: variant.created_at.to_string(),
            updated_at: variant.updated_at.to_string(),
        }
    }
}

/// Service Details Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ServiceDetailsResponse {
    pub service: ServiceResponse,

    /// Active variants, cheapest first
    pub variants: Vec<VariantResponse>,
}

impl From<ServiceDetails> for ServiceDetailsResponse {
    fn from(details: ServiceDetails) -> Self {
        Self {
            service: details.service.into(),
            variants: details.variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Price Quote Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PriceQuoteResponse {
    pub base_price: u64,
    pub unit_price: u64,
    pub quantity: u32,
    pub unit_type: String,
    pub turnaround_tier: String,

    /// Decimal multiplier, e.g. `"1.5"`
    pub turnaround_multiplier: String,

    pub turnaround_cost: u64,
    pub add_ons: Vec<AddOnChargeResponse>,
    pub subtotal: u64,
    pub turnaround_days: u32,
    pub estimated_delivery: String,
}

/// Add-on Charge Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddOnChargeResponse {
    pub key: String,
    pub price: u64,
}

impl From<PriceQuote> for PriceQuoteResponse {
    fn from(quote: PriceQuote) -> Self {
        let breakdown = quote.breakdown;

        Self {
            base_price: breakdown.base.total,
            unit_price: breakdown.base.unit_price,
            quantity: breakdown.base.quantity,
            unit_type: breakdown.base.unit_type.to_string(),
            turnaround_tier: breakdown.turnaround.tier.as_str().to_string(),
            turnaround_multiplier: breakdown.turnaround.multiplier.to_string(),
            turnaround_cost: breakdown.turnaround.additional_cost,
            add_ons: breakdown
                .add_ons
                .into_iter()
                .map(|line| AddOnChargeResponse {
                    key: line.add_on.key().to_string(),
                    price: line.price,
                })
                .collect(),
            subtotal: quote.subtotal,
            turnaround_days: quote.turnaround_days,
            estimated_delivery: quote.estimated_delivery.to_string(),
        }
    }
}

/// Removal Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RemovalResponse {
    /// `deleted`, or `retired` when closed orders still reference the row
    pub outcome: String,
}

impl From<Removal> for RemovalResponse {
    fn from(removal: Removal) -> Self {
        let outcome = match removal {
            Removal::Deleted => "deleted",
            Removal::Retired => "retired",
        };

        Self {
            outcome: outcome.to_string(),
        }
    }
}
