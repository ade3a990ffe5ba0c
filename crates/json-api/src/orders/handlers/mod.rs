//! Order Handlers

pub(crate) mod assign;
pub(crate) mod checkout;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod notes;
pub(crate) mod refund;
pub(crate) mod statistics;
pub(crate) mod status;
