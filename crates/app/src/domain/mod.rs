//! Folio Domain Concerns

pub mod carts;
pub mod catalog;
pub mod coupons;
pub mod files;
pub mod orders;
pub mod payments;
