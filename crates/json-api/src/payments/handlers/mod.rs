//! Payment Handlers

pub(crate) mod intent;
pub(crate) mod status;
pub(crate) mod webhook;
