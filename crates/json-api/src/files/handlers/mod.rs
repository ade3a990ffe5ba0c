//! File Handlers

pub(crate) mod bulk;
pub(crate) mod delete;
pub(crate) mod download;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod order;
pub(crate) mod upload;
pub(crate) mod usage;
pub(crate) mod visibility;
