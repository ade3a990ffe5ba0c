//! Catalog Records

use std::{fmt, str::FromStr};

use folio::{UnitType, VariantTerms, pricing::UnknownVariant};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::uuids::TypedUuid;

/// Service UUID
pub type ServiceUuid = TypedUuid<ServiceRecord>;

/// Variant UUID
pub type VariantUuid = TypedUuid<VariantRecord>;

/// Kind of work a service covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Editing,
    Formatting,
    Design,
    Illustration,
}

impl ServiceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Formatting => "formatting",
            Self::Design => "design",
            Self::Illustration => "illustration",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "editing" => Ok(Self::Editing),
            "formatting" => Ok(Self::Formatting),
            "design" => Ok(Self::Design),
            "illustration" => Ok(Self::Illustration),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

/// Service Record
#[derive(Debug, Clone)]
pub struct ServiceRecord {
    pub uuid: ServiceUuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub service_type: ServiceType,
    pub base_price: u64,
    pub features: Value,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Variant Record
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub uuid: VariantUuid,
    pub service_uuid: ServiceUuid,
    pub service_title: String,
    pub title: String,
    pub price: u64,
    pub unit_type: UnitType,
    pub turnaround_days: u32,
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VariantRecord {
    /// Pricing-relevant view of this variant.
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

/// A service with its active variants.
#[derive(Debug, Clone)]
pub struct ServiceDetails {
    pub service: ServiceRecord,
    pub variants: Vec<VariantRecord>,
}
