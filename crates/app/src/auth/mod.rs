//! Authentication

mod errors;
mod identity;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use identity::*;
pub use models::*;
pub(crate) use repository::PgAuthRepository;
pub use service::*;
pub use token::*;
