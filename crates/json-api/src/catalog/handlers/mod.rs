//! Catalog Handlers

pub(crate) mod activate;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod quote;
pub(crate) mod update;
pub(crate) mod variant_delete;
pub(crate) mod variant_update;
pub(crate) mod variants;
