//! Folio
//!
//! Folio is the pure domain core of an editing-services storefront: pricing quotes,
//! coupon arithmetic, order totals and the order lifecycle. Nothing in this crate
//! performs I/O; persistence lives in `folio-app`.

pub mod amounts;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod totals;

pub use amounts::AmountError;
pub use coupons::{CouponError, CouponKind, CouponTerms};
pub use orders::{OrderStatus, TransitionError};
pub use pricing::{
    AddOn, MAX_QUANTITY, PriceQuote, PricingError, TurnaroundTier, UnitType, VariantTerms,
};
pub use totals::{TaxRate, Totals};
