//! Pricing
//!
//! Turns a variant, a quantity, a turnaround tier and a set of add-ons into a
//! price breakdown with a delivery estimate.

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::amounts::{self, AmountError, percentage_from_basis_points};

/// Errors raised while pricing a variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Quantity is below the variant minimum.
    #[error("quantity {quantity} is below the minimum of {minimum}")]
    BelowMinimum {
        /// Requested quantity.
        quantity: u32,
        /// Variant minimum.
        minimum: u32,
    },

    /// Quantity is above the variant maximum.
    #[error("quantity {quantity} is above the maximum of {maximum}")]
    AboveMaximum {
        /// Requested quantity.
        quantity: u32,
        /// Variant maximum.
        maximum: u32,
    },

    /// Variant bounds are inconsistent.
    #[error("minimum quantity {minimum} exceeds maximum quantity {maximum}")]
    InvalidBounds {
        /// Variant minimum.
        minimum: u32,
        /// Variant maximum.
        maximum: u32,
    },

    /// The delivery estimate fell outside the supported time range.
    #[error("delivery estimate is out of range")]
    EstimateOutOfRange,

    /// Amount arithmetic failed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// How a variant's price scales with quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// One price regardless of quantity.
    Fixed,
    /// Priced per word.
    PerWord,
    /// Priced per page.
    PerPage,
    /// Priced per hour.
    PerHour,
}

impl UnitType {
    /// Storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::PerWord => "per_word",
            Self::PerPage => "per_page",
            Self::PerHour => "per_hour",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fixed" => Ok(Self::Fixed),
            "per_word" => Ok(Self::PerWord),
            "per_page" => Ok(Self::PerPage),
            "per_hour" => Ok(Self::PerHour),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

/// Raised when parsing an unknown enum name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Delivery speed chosen for a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnaroundTier {
    /// Regular turnaround.
    #[default]
    Standard,
    /// Roughly half the regular turnaround.
    Rush,
    /// Roughly a quarter of the regular turnaround.
    Express,
}

impl TurnaroundTier {
    /// Storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Rush => "rush",
            Self::Express => "express",
        }
    }

    /// Price multiplier in basis points (`10_000` is 1.0x).
    #[must_use]
    pub const fn multiplier_basis_points(self) -> u32 {
        match self {
            Self::Standard => 10_000,
            Self::Rush => 15_000,
            Self::Express => 20_000,
        }
    }

    /// Price multiplier as a decimal factor.
    #[must_use]
    pub fn multiplier(self) -> Decimal {
        Decimal::new(i64::from(self.multiplier_basis_points()), 4)
    }

    /// Turnaround days for this tier given the variant's regular days.
    #[must_use]
    pub const fn adjusted_days(self, base_days: u32) -> u32 {
        let days = match self {
            Self::Standard => return base_days,
            Self::Rush => base_days.div_ceil(2),
            Self::Express => base_days.div_ceil(4),
        };

        if days == 0 { 1 } else { days }
    }
}

impl FromStr for TurnaroundTier {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(Self::Standard),
            "rush" => Ok(Self::Rush),
            "express" => Ok(Self::Express),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

/// Optional extras that can be bought alongside a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOn {
    /// Priority support channel.
    PrioritySupport,
    /// One extra revision round.
    AdditionalRevision,
    /// Faster review of the delivered work.
    ExpeditedReview,
    /// A style guide produced alongside the edit.
    StyleGuideCreation,
}

impl AddOn {
    /// Every known add-on.
    pub const ALL: [Self; 4] = [
        Self::PrioritySupport,
        Self::AdditionalRevision,
        Self::ExpeditedReview,
        Self::StyleGuideCreation,
    ];

    /// Key used in cart metadata and requests.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PrioritySupport => "priority_support",
            Self::AdditionalRevision => "additional_revision",
            Self::ExpeditedReview => "expedited_review",
            Self::StyleGuideCreation => "style_guide_creation",
        }
    }

    /// Price in minor units.
    #[must_use]
    pub const fn price(self) -> u64 {
        match self {
            Self::PrioritySupport => 25_00,
            Self::AdditionalRevision => 15_00,
            Self::ExpeditedReview => 35_00,
            Self::StyleGuideCreation => 50_00,
        }
    }

    /// Looks up an add-on by key. Unknown keys yield `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|add_on| add_on.key() == key)
    }
}

/// Largest quantity any line may hold, unlimited variants included. Twice
/// this still fits a Postgres `INTEGER`, so merging two legal quantities
/// cannot overflow storage.
pub const MAX_QUANTITY: u32 = 1_000_000_000;

/// The pricing-relevant terms of a service variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantTerms {
    /// Unit price in minor units.
    pub price: u64,
    /// How price scales with quantity.
    pub unit_type: UnitType,
    /// Regular turnaround in days.
    pub turnaround_days: u32,
    /// Smallest orderable quantity.
    pub min_quantity: u32,
    /// Largest orderable quantity, capped at [`MAX_QUANTITY`] when `None`.
    pub max_quantity: Option<u32>,
}

impl VariantTerms {
    /// Checks `quantity` against this variant's bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] describing the violated bound.
    pub fn validate_quantity(&self, quantity: u32) -> Result<(), PricingError> {
        if let Some(maximum) = self.max_quantity
            && self.min_quantity > maximum
        {
            return Err(PricingError::InvalidBounds {
                minimum: self.min_quantity,
                maximum,
            });
        }

        if quantity == 0 {
            return Err(PricingError::ZeroQuantity);
        }

        if quantity < self.min_quantity {
            return Err(PricingError::BelowMinimum {
                quantity,
                minimum: self.min_quantity,
            });
        }

        let maximum = self
            .max_quantity
            .map_or(MAX_QUANTITY, |maximum| maximum.min(MAX_QUANTITY));

        if quantity > maximum {
            return Err(PricingError::AboveMaximum { quantity, maximum });
        }

        Ok(())
    }
}

/// Base price for `quantity` units of a variant, before turnaround and add-ons.
///
/// Fixed variants cost their price regardless of quantity, though the quantity
/// is still validated.
///
/// # Errors
///
/// Returns a [`PricingError`] when the quantity is out of bounds or the price overflows.
pub fn calculate_price(variant: &VariantTerms, quantity: u32) -> Result<u64, PricingError> {
    variant.validate_quantity(quantity)?;

    match variant.unit_type {
        UnitType::Fixed => Ok(variant.price),
        UnitType::PerWord | UnitType::PerPage | UnitType::PerHour => {
            Ok(amounts::checked_mul(variant.price, quantity)?)
        }
    }
}

/// Base line of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLine {
    /// Variant unit price.
    pub unit_price: u64,
    /// Quantity priced.
    pub quantity: u32,
    /// Unit type of the variant.
    pub unit_type: UnitType,
    /// Base price.
    pub total: u64,
}

/// Turnaround line of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnaroundLine {
    /// Chosen tier.
    pub tier: TurnaroundTier,
    /// Multiplier applied to the base price.
    pub multiplier: Decimal,
    /// Surcharge on top of the base price.
    pub additional_cost: u64,
    /// Adjusted turnaround days.
    pub days: u32,
}

/// Add-on line of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnLine {
    /// The add-on.
    pub add_on: AddOn,
    /// Price charged.
    pub price: u64,
}

/// Itemised price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Base line.
    pub base: BaseLine,
    /// Turnaround line.
    pub turnaround: TurnaroundLine,
    /// One line per distinct known add-on.
    pub add_ons: SmallVec<[AddOnLine; 4]>,
}

/// Result of pricing a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Itemised breakdown.
    pub breakdown: PriceBreakdown,
    /// Base times multiplier plus add-ons.
    pub subtotal: u64,
    /// Adjusted turnaround days.
    pub turnaround_days: u32,
    /// `now` plus the adjusted turnaround.
    pub estimated_delivery: Timestamp,
}

/// Prices a line item.
///
/// Unknown add-on keys are priced at zero and left out of the breakdown;
/// duplicate keys are counted once.
///
/// # Errors
///
/// Returns a [`PricingError`] when the quantity is out of bounds or arithmetic overflows.
pub fn quote<S>(
    variant: &VariantTerms,
    quantity: u32,
    tier: TurnaroundTier,
    add_on_keys: &[S],
    now: Timestamp,
) -> Result<PriceQuote, PricingError>
where
    S: AsRef<str>,
{
    let base = calculate_price(variant, quantity)?;

    let multiplied = amounts::percent_of_minor(
        percentage_from_basis_points(tier.multiplier_basis_points()),
        base,
    )?;

    let additional_cost = multiplied.saturating_sub(base);

    let mut add_ons: SmallVec<[AddOnLine; 4]> = SmallVec::new();

    for add_on in add_on_keys
        .iter()
        .filter_map(|key| AddOn::from_key(key.as_ref()))
    {
        if add_ons.iter().all(|line| line.add_on != add_on) {
            add_ons.push(AddOnLine {
                add_on,
                price: add_on.price(),
            });
        }
    }

    let subtotal = amounts::checked_sum(
        std::iter::once(multiplied).chain(add_ons.iter().map(|line| line.price)),
    )?;

    let days = tier.adjusted_days(variant.turnaround_days);

    let estimated_delivery = now
        .checked_add(SignedDuration::from_hours(i64::from(days) * 24))
        .map_err(|_overflow| PricingError::EstimateOutOfRange)?;

    Ok(PriceQuote {
        breakdown: PriceBreakdown {
            base: BaseLine {
                unit_price: variant.price,
                quantity,
                unit_type: variant.unit_type,
                total: base,
            },
            turnaround: TurnaroundLine {
                tier,
                multiplier: tier.multiplier(),
                additional_cost,
                days,
            },
            add_ons,
        },
        subtotal,
        turnaround_days: days,
        estimated_delivery,
    })
}
