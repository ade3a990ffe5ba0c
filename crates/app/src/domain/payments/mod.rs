//! Payments

pub mod data;
pub mod errors;
pub mod gateways;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;
