//! Catalog Data

use folio::{TurnaroundTier, UnitType, VariantTerms};
use serde_json::Value;

use crate::domain::catalog::records::{ServiceType, ServiceUuid, VariantUuid};

/// New Service Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub uuid: ServiceUuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub service_type: ServiceType,
    pub base_price: u64,
    pub features: Value,
    pub sort_order: i32,
    pub is_featured: bool,
}

/// New Variant Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub uuid: VariantUuid,
    pub title: String,
    pub price: u64,
    pub unit_type: UnitType,
    pub turnaround_days: u32,
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
}

impl NewVariant {
    #[must_use]
    pub const fn terms(&self) -> VariantTerms {
        VariantTerms {
            price: self.price,
            unit_type: self.unit_type,
            turnaround_days: self.turnaround_days,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
        }
    }
}

/// Replacement fields for an existing service. Uuid and creation time stay.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceUpdate {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub service_type: ServiceType,
    pub base_price: u64,
    pub features: Value,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Replacement fields for an existing variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantUpdate {
    pub title: String,
    pub price: u64,
    pub unit_type: UnitType,
    pub turnaround_days: u32,
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
    pub is_active: bool,
}

impl VariantUpdate {
    #[must_use]
    pub const fn terms(&self) -> VariantTerms {
        VariantTerms {
            price: self.price,
            unit_type: self.unit_type,
            turnaround_days: self.turnaround_days,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
        }
    }
}

/// Outcome of deleting a service or variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The row is gone.
    Deleted,

    /// Closed orders still point at it, so it was deactivated instead.
    Retired,
}

/// Service listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub service_type: Option<ServiceType>,
    pub featured_only: bool,
}

/// Price calculator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub variant: VariantUuid,
    pub quantity: u32,
    pub tier: TurnaroundTier,
    pub add_ons: Vec<String>,
}
