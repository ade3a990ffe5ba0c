//! Catalog Repositories

mod services;
mod variants;

pub(crate) use services::PgServicesRepository;
pub(crate) use variants::PgVariantsRepository;
